mod progress;
mod styling;
mod summary;
mod tables;

pub use progress::PhaseProgress;
pub use summary::print_summary;

use styling::{banner_title, label};

/// Prints the stalemate banner to stderr.
///
/// Displays the tool name, version, and description at the start of execution.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        banner_title("🧹 stalemate"),
        label(env!("CARGO_PKG_VERSION")),
        label("Stale merge request and branch sweeper")
    );
}
