use indexmap::IndexMap;
use log::{info, warn};

use crate::providers::gitlab::MergeRequest;
use crate::providers::slack::Block;
use crate::providers::{JiraClient, SlackClient};

use super::staleness::Thresholds;
use super::title::parse_title;

/// GitLab username -> Slack user ID.
pub type SlackIds = IndexMap<String, String>;

const UNKNOWN_USER: &str = "Unknown";

/// Slack rejects section blocks whose text is longer than this.
const MAX_SECTION_TEXT: usize = 3000;

/// Maps a GitLab username to the e-mail address its Slack account uses.
///
/// Assumes usernames follow the `firstname.lastname` mailbox convention.
pub fn author_email(username: &str, email_domain: &str) -> String {
    format!("{username}@{}", email_domain.trim_start_matches('@'))
}

/// Distinct authors of the given merge requests, in first-seen order.
pub fn distinct_authors<'a>(groups: &[&'a [MergeRequest]]) -> Vec<&'a str> {
    let mut authors: Vec<&str> = Vec::new();
    for mr in groups.iter().copied().flatten() {
        if !authors.contains(&mr.author.username.as_str()) {
            authors.push(&mr.author.username);
        }
    }
    authors
}

/// Looks each author up on Slack by e-mail. Failures are logged and skipped.
pub async fn resolve_slack_users(
    slack: &SlackClient,
    authors: &[&str],
    email_domain: &str,
) -> SlackIds {
    let mut ids = SlackIds::new();
    for username in authors {
        let email = author_email(username, email_domain);
        match slack.lookup_user_by_email(&email).await {
            Ok(user) => {
                ids.insert((*username).to_string(), user.id);
            }
            Err(e) => {
                warn!("slack - error looking up user id associated to email {email}: {e}");
                warn!("continuing...");
            }
        }
    }
    info!("Resolved {}/{} authors to Slack users", ids.len(), authors.len());
    ids
}

fn slack_id<'a>(ids: &'a SlackIds, mr: &MergeRequest) -> &'a str {
    ids.get(&mr.author.username)
        .map_or(UNKNOWN_USER, String::as_str)
}

/// Escapes the characters mrkdwn treats as control sequences.
fn escape_mrkdwn(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn format_line(emoji: &str, mr: &MergeRequest, ids: &SlackIds, jira: &JiraClient) -> String {
    let parsed = parse_title(&mr.title);
    let link = format!(
        "<{}|!{} {}>",
        mr.web_url,
        mr.iid,
        escape_mrkdwn(&parsed.display)
    );
    let issue = parsed
        .issue_key
        .map(|key| format!(" [<{}|{key}>]", jira.browse_url(&key)))
        .unwrap_or_default();

    format!("{emoji} {link}{issue} - <@{}>\n", slack_id(ids, mr))
}

/// Packs lines into as few sections as fit under the section text limit.
fn line_sections(lines: impl IntoIterator<Item = String>) -> Vec<Block> {
    let mut sections = Vec::new();
    let mut current = String::new();
    for line in lines {
        if !current.is_empty() && current.len() + line.len() > MAX_SECTION_TEXT {
            sections.push(Block::markdown_section(std::mem::take(&mut current)));
        }
        current.push_str(&line);
    }
    if !current.is_empty() {
        sections.push(Block::markdown_section(current));
    }
    sections
}

fn plural_months(months: u32) -> String {
    if months == 1 {
        "1 month".to_string()
    } else {
        format!("{months} months")
    }
}

/// Builds the Block Kit message announcing stale and closed merge requests.
pub fn build_blocks(
    stale: &[MergeRequest],
    expired: &[MergeRequest],
    ids: &SlackIds,
    thresholds: &Thresholds,
    jira: &JiraClient,
) -> Vec<Block> {
    let mut blocks = Vec::new();

    if !stale.is_empty() {
        blocks.push(Block::markdown_section(format!(
            "*Stale MRs (more than {} old without any updates):*\nThese MRs will be automatically closed in {} if they aren't updated",
            plural_months(thresholds.stale_mr_months),
            plural_months(thresholds.grace_months()),
        )));
        blocks.extend(line_sections(
            stale
                .iter()
                .map(|mr| format_line(":alarm_clock:", mr, ids, jira)),
        ));
    }

    if !expired.is_empty() {
        blocks.push(Block::markdown_section(
            "*MRs that have been closed (due to staleness or the associated JIRA issue being closed):*",
        ));
        blocks.extend(line_sections(
            expired.iter().map(|mr| format_line(":x:", mr, ids, jira)),
        ));
    }

    blocks
}

/// Plain-text fallback shown in notifications.
pub fn fallback_text(stale: usize, expired: usize) -> String {
    format!("{stale} stale merge request(s), {expired} closed merge request(s)")
}
