use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::styling::{done, heading, pending};

/// Spinner for the three sweep phases: branches, merge requests, Slack.
pub struct PhaseProgress {
    pb: ProgressBar,
}

impl PhaseProgress {
    pub fn start_branches() -> Self {
        eprintln!("{}", heading("⚙️", "Phases"));
        let pb = create_spinner(pending("Phase 1/3: Sweeping branches").to_string());
        Self { pb }
    }

    pub fn finish_branches_start_merge_requests(self, stale_branches: usize) -> Self {
        self.pb.finish_with_message(
            done(format!(
                "Phase 1/3: Found {stale_branches} stale branches ✓"
            ))
            .to_string(),
        );
        let pb = create_spinner(pending("Phase 2/3: Checking merge requests").to_string());
        Self { pb }
    }

    pub fn finish_merge_requests_start_notify(self, stale: usize, expired: usize) -> Self {
        self.pb.finish_with_message(
            done(format!(
                "Phase 2/3: Found {stale} stale and {expired} expired merge requests ✓"
            ))
            .to_string(),
        );
        let pb = create_spinner(pending("Phase 3/3: Notifying Slack").to_string());
        Self { pb }
    }

    pub fn finish_notify(self, posted: bool) {
        let message = if posted {
            "Phase 3/3: Slack notified ✓"
        } else {
            "Phase 3/3: No Slack message posted ✓"
        };
        self.pb.finish_with_message(done(message).to_string());
        eprintln!("\n");
    }
}

fn create_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    if let Ok(style) = ProgressStyle::default_spinner().template("  {msg} {spinner}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
