use std::fmt::Write;

use comfy_table::{Cell, Color as TableColor};

use crate::report::SweepReport;
use crate::sweep::staleness::Thresholds;

use super::styling::{done, heading, label, mode, notified, pending, problem, project};
use super::tables::{color_coded_age_cell, create_cyan_header, create_table};

const DAYS_PER_MONTH: i64 = 30;

/// Prints a human-readable summary of a sweep to stdout.
///
/// Displays:
/// - Overview: project, counts, whether the run was a dry run
/// - Stale Branches: deleted (or would-be deleted) branches and their age
/// - Stale Merge Requests: MRs that will be closed if nothing changes
/// - Closed Merge Requests: expired MRs and why they were closed
/// - Slack: authors that could not be resolved to a Slack user
pub fn print_summary(report: &SweepReport, thresholds: &Thresholds) {
    println!("{}", render_summary(report, thresholds));
}

fn add_section_header(output: &mut String, emoji: &str, title: &str) {
    let _ = writeln!(output, "{}", heading(emoji, title));
}

fn months_to_days(months: u32) -> i64 {
    i64::from(months) * DAYS_PER_MONTH
}

#[allow(clippy::too_many_lines)]
fn render_summary(report: &SweepReport, thresholds: &Thresholds) -> String {
    let mut output = String::new();
    let now = report.collected_at;

    add_section_header(&mut output, "📊", "Overview");

    let _ = write!(
        output,
        "  {} {}\n  {} {}\n  {} {}\n  {} {}\n  {} {}\n  {} {}\n\n",
        label("Project:"),
        project(&report.project),
        label("Mode:"),
        mode(report.dry_run),
        label("Branches scanned:"),
        pending(report.total_branches),
        label("Open merge requests:"),
        pending(report.total_merge_requests),
        label("Slack notified:"),
        notified(report.notification_posted),
        label("Sweep date:"),
        label(report.collected_at.format("%Y-%m-%d %H:%M UTC"))
    );

    if report.is_clean() {
        let _ = writeln!(
            output,
            "{}",
            done("Nothing to clean up: no stale branches or merge requests.")
        );
        return output;
    }

    if !report.stale_branches.is_empty() {
        let verb = if report.dry_run { "would delete" } else { "deleted" };
        add_section_header(
            &mut output,
            "🌿",
            &format!("Stale Branches ({verb} {})", report.stale_branches.len()),
        );

        let mut table = create_table();
        table.set_header(create_cyan_header(&["Branch", "Last Commit", "Age"]));
        for branch in &report.stale_branches {
            table.add_row(vec![
                Cell::new(&branch.name),
                Cell::new(branch.last_commit.format("%Y-%m-%d")),
                color_coded_age_cell(
                    branch.last_commit,
                    now,
                    months_to_days(thresholds.stale_branch_months),
                ),
            ]);
        }
        let _ = writeln!(output, "{table}\n");
    }

    if !report.stale_merge_requests.is_empty() {
        add_section_header(&mut output, "⏰", "Stale Merge Requests");

        let mut table = create_table();
        table.set_header(create_cyan_header(&["MR", "Title", "Issue", "Author", "Idle"]));
        for mr in &report.stale_merge_requests {
            table.add_row(vec![
                Cell::new(format!("!{}", mr.iid)),
                Cell::new(&mr.title),
                Cell::new(mr.issue_key.as_deref().unwrap_or("-")),
                Cell::new(&mr.author),
                color_coded_age_cell(
                    mr.updated_at,
                    now,
                    months_to_days(thresholds.stale_mr_months),
                ),
            ]);
        }
        let _ = writeln!(output, "{table}\n");
    }

    if !report.expired_merge_requests.is_empty() {
        let verb = if report.dry_run { "would close" } else { "closed" };
        add_section_header(
            &mut output,
            "❌",
            &format!("Expired Merge Requests ({verb} {})", report.expired_merge_requests.len()),
        );

        let mut table = create_table();
        table.set_header(create_cyan_header(&["MR", "Title", "Author", "Reason"]));
        for expired in &report.expired_merge_requests {
            let mr = &expired.merge_request;
            table.add_row(vec![
                Cell::new(format!("!{}", mr.iid)),
                Cell::new(&mr.title),
                Cell::new(&mr.author),
                Cell::new(expired.reason.describe()).fg(TableColor::Red),
            ]);
        }
        let _ = writeln!(output, "{table}\n");
    }

    if !report.unresolved_authors.is_empty() {
        add_section_header(&mut output, "💬", "Slack");
        let _ = writeln!(
            output,
            "  {} {}",
            problem("No Slack user found for:"),
            report.unresolved_authors.join(", ")
        );
    }

    output
}
