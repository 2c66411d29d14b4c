use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A repository branch as returned by `GET /projects/:id/repository/branches`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    /// Branch name (e.g., "feature/login")
    pub name: String,
    /// Whether the branch is protected against deletion
    #[serde(default)]
    pub protected: bool,
    /// Head commit of the branch
    pub commit: BranchCommit,
}

/// The head commit of a [`Branch`]; only the fields the sweep needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchCommit {
    pub committed_date: DateTime<Utc>,
}

/// An open merge request as returned by `GET /projects/:id/merge_requests`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeRequest {
    /// Project-scoped internal ID (the `!123` number)
    pub iid: u64,
    /// Title, optionally ending in an issue reference like `[PROJ-123]`
    pub title: String,
    pub author: Author,
    /// Last time anything on the merge request changed
    pub updated_at: DateTime<Utc>,
    pub web_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub username: String,
}

#[derive(Debug, Serialize)]
pub(super) struct UpdateMergeRequest<'a> {
    pub state_event: &'a str,
}

/// Comma separated branch names, used for log lines.
pub fn branch_names(branches: &[Branch]) -> String {
    branches
        .iter()
        .map(|b| b.name.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

/// Comma separated merge request IIDs, used for log lines.
pub fn merge_request_iids(mrs: &[MergeRequest]) -> String {
    mrs.iter()
        .map(|mr| mr.iid.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
