use std::fmt::Display;

use console::{style, StyledObject};

/// Field labels and secondary text.
pub fn label(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).dim()
}

/// Counts and phases still in progress.
pub fn pending(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().yellow()
}

pub fn done(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().green()
}

pub fn problem(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().red()
}

pub fn project(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).cyan()
}

pub fn banner_title(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).magenta().bold()
}

/// `<emoji> <underlined title>`, used for summary sections and the phase list.
pub fn heading(emoji: &str, title: &str) -> String {
    format!(
        "{} {}",
        style(emoji).bright(),
        style(title).bright().underlined()
    )
}

/// Whether the sweep changed anything.
pub fn mode(dry_run: bool) -> StyledObject<String> {
    if dry_run {
        pending("dry run (nothing was changed)")
    } else {
        done("live")
    }
}

pub fn notified(posted: bool) -> StyledObject<String> {
    if posted {
        done("yes")
    } else {
        label("no")
    }
}
