use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StalemateError};
use crate::providers::gitlab::{Branch, MergeRequest};

/// Age thresholds, in calendar months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Thresholds {
    /// Merge requests not updated for this long are reported as stale
    #[serde(default = "default_stale_mr_months")]
    pub stale_mr_months: u32,

    /// Merge requests not updated for this long are closed
    #[serde(default = "default_expired_mr_months")]
    pub expired_mr_months: u32,

    /// Non-protected branches without commits for this long are deleted
    #[serde(default = "default_stale_branch_months")]
    pub stale_branch_months: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            stale_mr_months: default_stale_mr_months(),
            expired_mr_months: default_expired_mr_months(),
            stale_branch_months: default_stale_branch_months(),
        }
    }
}

fn default_stale_mr_months() -> u32 {
    2
}

fn default_expired_mr_months() -> u32 {
    3
}

fn default_stale_branch_months() -> u32 {
    6
}

impl Thresholds {
    pub fn validate(&self) -> Result<()> {
        if self.stale_mr_months == 0 || self.expired_mr_months == 0 || self.stale_branch_months == 0
        {
            return Err(StalemateError::Config(
                "thresholds must be at least one month".to_string(),
            ));
        }
        if self.stale_mr_months >= self.expired_mr_months {
            return Err(StalemateError::Config(format!(
                "stale threshold ({} months) must be shorter than the expiry threshold ({} months)",
                self.stale_mr_months, self.expired_mr_months
            )));
        }
        Ok(())
    }

    /// Months between a merge request turning stale and being closed.
    pub fn grace_months(&self) -> u32 {
        self.expired_mr_months.saturating_sub(self.stale_mr_months)
    }
}

/// `now` minus `months` calendar months, clamped to the end of shorter months.
pub fn cutoff(now: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    now.checked_sub_months(Months::new(months))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

pub fn stale_branches(branches: &[Branch], now: DateTime<Utc>, months: u32) -> Vec<Branch> {
    let cutoff = cutoff(now, months);
    branches
        .iter()
        .filter(|b| !b.protected && b.commit.committed_date < cutoff)
        .cloned()
        .collect()
}

pub fn older_than(mr: &MergeRequest, now: DateTime<Utc>, months: u32) -> bool {
    mr.updated_at < cutoff(now, months)
}
