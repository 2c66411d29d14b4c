pub mod notify;
pub mod staleness;
pub mod title;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use crate::error::Result;
use crate::output::PhaseProgress;
use crate::providers::gitlab::{branch_names, merge_request_iids, Branch, MergeRequest};
use crate::providers::{GitLabClient, JiraClient, SlackClient};
use crate::report::{BranchSummary, ExpiredMergeRequest, ExpiryReason, SweepReport};

use notify::{build_blocks, distinct_authors, fallback_text, resolve_slack_users, SlackIds};
use staleness::{older_than, stale_branches, Thresholds};
use title::issue_key;

/// Everything a sweep needs besides the API clients.
#[derive(Debug, Clone)]
pub struct SweepOptions {
    pub project_id: String,
    pub channel_id: String,
    /// Domain appended to GitLab usernames to find Slack accounts
    pub email_domain: String,
    /// Jira status that makes a linked merge request expire
    pub closed_status: String,
    pub thresholds: Thresholds,
    pub dry_run: bool,
}

/// Sweeps one GitLab project: deletes stale branches, closes expired merge
/// requests and announces stale and closed ones on Slack.
pub struct Sweeper {
    gitlab: GitLabClient,
    jira: JiraClient,
    slack: SlackClient,
    options: SweepOptions,
}

/// Merge requests split into disjoint stale and expired groups.
struct Classified {
    stale: Vec<MergeRequest>,
    expired: Vec<(MergeRequest, ExpiryReason)>,
}

impl Sweeper {
    pub fn new(
        gitlab: GitLabClient,
        jira: JiraClient,
        slack: SlackClient,
        options: SweepOptions,
    ) -> Self {
        Self {
            gitlab,
            jira,
            slack,
            options,
        }
    }

    /// Runs the sweep with `now` as the reference time for every threshold.
    ///
    /// # Errors
    ///
    /// Returns an error if any GitLab or Jira call fails, or if the final
    /// Slack message cannot be posted. Slack user lookups and channel
    /// invites only log their failures.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<SweepReport> {
        let project = &self.options.project_id;
        let thresholds = &self.options.thresholds;

        if self.options.dry_run {
            info!("dryrun option enabled, GitLab MRs will not be updated and Slack messages will not be posted.");
        }

        let progress = PhaseProgress::start_branches();

        let branches = self.gitlab.list_branches(project).await?;
        let stale = stale_branches(&branches, now, thresholds.stale_branch_months);
        info!("stale branches found: {}", stale.len());
        info!("name of stale non-protected branches: {}", branch_names(&stale));
        let deleted_branches = self.delete_branches(&stale).await?;

        let progress = progress.finish_branches_start_merge_requests(stale.len());

        let mrs = self.gitlab.list_open_merge_requests(project).await?;
        let classified = self.classify(&mrs, now).await?;
        info!("stale MRs found: {}", classified.stale.len());
        info!("internal IDs of stale MRs: {}", merge_request_iids(&classified.stale));
        let expired_mrs: Vec<MergeRequest> =
            classified.expired.iter().map(|(mr, _)| mr.clone()).collect();
        info!("expired MRs found: {}", expired_mrs.len());
        info!("internal ID of expired MRs: {}", merge_request_iids(&expired_mrs));
        let closed_merge_requests = self.close_merge_requests(&expired_mrs).await?;

        let progress = progress
            .finish_merge_requests_start_notify(classified.stale.len(), expired_mrs.len());

        let mut report = SweepReport {
            project: project.clone(),
            collected_at: now,
            dry_run: self.options.dry_run,
            total_branches: branches.len(),
            stale_branches: stale.iter().map(BranchSummary::from).collect(),
            deleted_branches,
            total_merge_requests: mrs.len(),
            stale_merge_requests: classified.stale.iter().map(Into::into).collect(),
            expired_merge_requests: classified
                .expired
                .iter()
                .map(|(mr, reason)| ExpiredMergeRequest {
                    merge_request: mr.into(),
                    reason: reason.clone(),
                })
                .collect(),
            closed_merge_requests,
            slack_users: SlackIds::new(),
            unresolved_authors: Vec::new(),
            notification_posted: false,
        };

        if classified.stale.is_empty() && expired_mrs.is_empty() {
            info!("no stale or expired merge requests found. Exiting.");
            progress.finish_notify(false);
            return Ok(report);
        }

        let authors = distinct_authors(&[classified.stale.as_slice(), expired_mrs.as_slice()]);
        let ids = resolve_slack_users(&self.slack, &authors, &self.options.email_domain).await;
        report.unresolved_authors = authors
            .iter()
            .filter(|a| !ids.contains_key(**a))
            .map(|a| (*a).to_string())
            .collect();

        self.invite_users(&ids).await;
        report.notification_posted = self.post_summary(&classified.stale, &expired_mrs, &ids).await?;
        report.slack_users = ids;

        progress.finish_notify(report.notification_posted);
        Ok(report)
    }

    async fn delete_branches(&self, branches: &[Branch]) -> Result<usize> {
        if self.options.dry_run {
            return Ok(0);
        }

        for branch in branches {
            debug!("Deleting branch {}", branch.name);
            self.gitlab
                .delete_branch(&self.options.project_id, &branch.name)
                .await?;
        }
        info!("deleted {} stale branches", branches.len());
        Ok(branches.len())
    }

    /// Splits merge requests into stale and expired.
    ///
    /// Expired wins: an MR past the expiry threshold or linked to a closed
    /// issue is never also reported as stale.
    async fn classify(&self, mrs: &[MergeRequest], now: DateTime<Utc>) -> Result<Classified> {
        let thresholds = &self.options.thresholds;
        let mut classified = Classified {
            stale: Vec::new(),
            expired: Vec::new(),
        };

        for mr in mrs {
            if older_than(mr, now, thresholds.expired_mr_months) {
                classified.expired.push((mr.clone(), ExpiryReason::Inactive));
                continue;
            }

            if let Some(reason) = self.closed_issue(mr).await? {
                classified.expired.push((mr.clone(), reason));
                continue;
            }

            if older_than(mr, now, thresholds.stale_mr_months) {
                classified.stale.push(mr.clone());
            }
        }

        Ok(classified)
    }

    /// Checks the Jira issue referenced in the MR title, if there is one.
    async fn closed_issue(&self, mr: &MergeRequest) -> Result<Option<ExpiryReason>> {
        let Some(key) = issue_key(&mr.title) else {
            info!("no JIRA issue ID attached to MR: {}. Skipping status check.", mr.iid);
            return Ok(None);
        };

        let Some(issue) = self.jira.get_issue(&key).await? else {
            info!(
                "JIRA issue ID attached to MR does not exist: {}. Skipping status check.",
                mr.iid
            );
            return Ok(None);
        };

        if issue.is_in_status(&self.options.closed_status) {
            return Ok(Some(ExpiryReason::IssueClosed {
                issue_key: key,
                status: issue.status_name().to_string(),
            }));
        }

        Ok(None)
    }

    async fn close_merge_requests(&self, mrs: &[MergeRequest]) -> Result<usize> {
        if self.options.dry_run {
            return Ok(0);
        }

        for mr in mrs {
            debug!("Closing merge request !{}", mr.iid);
            self.gitlab
                .close_merge_request(&self.options.project_id, mr.iid)
                .await?;
        }
        info!("closed {} expired MRs", mrs.len());
        Ok(mrs.len())
    }

    async fn invite_users(&self, ids: &SlackIds) {
        let user_ids: Vec<String> = ids.values().cloned().collect();
        if self.options.dry_run {
            return;
        }

        if let Err(e) = self
            .slack
            .invite_to_channel(&self.options.channel_id, &user_ids)
            .await
        {
            warn!(
                "slack - error inviting user IDs <{}> to channel <{}>: {e}",
                user_ids.join(","),
                self.options.channel_id
            );
            warn!("continuing...");
        }
    }

    /// Posts the summary message. Returns whether a message was sent.
    async fn post_summary(
        &self,
        stale: &[MergeRequest],
        expired: &[MergeRequest],
        ids: &SlackIds,
    ) -> Result<bool> {
        let blocks = build_blocks(stale, expired, ids, &self.options.thresholds, &self.jira);

        if self.options.dry_run {
            for block in &blocks {
                info!("[dryrun] slack block:\n{}", block.text());
            }
            return Ok(false);
        }

        self.slack
            .post_message(
                &self.options.channel_id,
                &blocks,
                &fallback_text(stale.len(), expired.len()),
            )
            .await?;
        info!("posted summary to Slack channel {}", self.options.channel_id);
        Ok(true)
    }
}
