use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::providers::gitlab::{Branch, MergeRequest};
use crate::sweep::title::parse_title;

/// Outcome of one sweep over a project.
#[derive(Debug, Serialize, Deserialize)]
pub struct SweepReport {
    pub project: String,
    pub collected_at: DateTime<Utc>,
    pub dry_run: bool,
    pub total_branches: usize,
    pub stale_branches: Vec<BranchSummary>,
    pub deleted_branches: usize,
    pub total_merge_requests: usize,
    pub stale_merge_requests: Vec<MergeRequestSummary>,
    pub expired_merge_requests: Vec<ExpiredMergeRequest>,
    pub closed_merge_requests: usize,
    /// GitLab username -> Slack user ID
    pub slack_users: IndexMap<String, String>,
    pub unresolved_authors: Vec<String>,
    pub notification_posted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchSummary {
    pub name: String,
    pub last_commit: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeRequestSummary {
    pub iid: u64,
    pub title: String,
    pub issue_key: Option<String>,
    pub author: String,
    pub updated_at: DateTime<Utc>,
    pub web_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpiredMergeRequest {
    #[serde(flatten)]
    pub merge_request: MergeRequestSummary,
    pub reason: ExpiryReason,
}

/// Why a merge request was closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExpiryReason {
    /// Not updated within the expiry threshold
    Inactive,
    /// The linked issue reached the closed status
    IssueClosed { issue_key: String, status: String },
}

impl ExpiryReason {
    pub fn describe(&self) -> String {
        match self {
            ExpiryReason::Inactive => "inactive".to_string(),
            ExpiryReason::IssueClosed { issue_key, status } => format!("{issue_key} {status}"),
        }
    }
}

impl From<&Branch> for BranchSummary {
    fn from(branch: &Branch) -> Self {
        Self {
            name: branch.name.clone(),
            last_commit: branch.commit.committed_date,
        }
    }
}

impl From<&MergeRequest> for MergeRequestSummary {
    fn from(mr: &MergeRequest) -> Self {
        let parsed = parse_title(&mr.title);
        Self {
            iid: mr.iid,
            title: parsed.display,
            issue_key: parsed.issue_key,
            author: mr.author.username.clone(),
            updated_at: mr.updated_at,
            web_url: mr.web_url.clone(),
        }
    }
}

impl SweepReport {
    /// True when neither stale branches nor stale/expired merge requests were found.
    pub fn is_clean(&self) -> bool {
        self.stale_branches.is_empty()
            && self.stale_merge_requests.is_empty()
            && self.expired_merge_requests.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::gitlab::Author;

    #[test]
    fn test_summary_splits_issue_key_from_title() {
        let mr = MergeRequest {
            iid: 3,
            title: "Add SSO [AUTH-12]".to_string(),
            author: Author {
                username: "jane.doe".to_string(),
            },
            updated_at: Utc::now(),
            web_url: "https://gitlab.example.com/mr/3".to_string(),
        };

        let summary = MergeRequestSummary::from(&mr);
        assert_eq!(summary.title, "Add SSO");
        assert_eq!(summary.issue_key.as_deref(), Some("AUTH-12"));
        assert_eq!(summary.author, "jane.doe");
    }

    #[test]
    fn test_expiry_reason_serializes_with_kind_tag() {
        let expired = ExpiredMergeRequest {
            merge_request: MergeRequestSummary {
                iid: 1,
                title: "t".to_string(),
                issue_key: Some("WEB-1".to_string()),
                author: "a".to_string(),
                updated_at: Utc::now(),
                web_url: "u".to_string(),
            },
            reason: ExpiryReason::IssueClosed {
                issue_key: "WEB-1".to_string(),
                status: "Closed".to_string(),
            },
        };

        let value = serde_json::to_value(&expired).unwrap();
        assert_eq!(value["iid"], 1);
        assert_eq!(value["reason"]["kind"], "issue_closed");
        assert_eq!(value["reason"]["status"], "Closed");
        assert_eq!(expired.reason.describe(), "WEB-1 Closed");
    }
}
