use serde::{Deserialize, Serialize};

/// A Jira issue, reduced to the status the sweep checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// Issue key (e.g., "WEB-42")
    pub key: String,
    pub fields: IssueFields,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueFields {
    pub status: IssueStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueStatus {
    /// Workflow status name (e.g., "In Progress", "Closed")
    pub name: String,
}

impl Issue {
    pub fn status_name(&self) -> &str {
        &self.fields.status.name
    }

    /// Whether the issue is in `closed_status`, compared case-insensitively.
    pub fn is_in_status(&self, closed_status: &str) -> bool {
        self.status_name().eq_ignore_ascii_case(closed_status)
    }
}
