use std::sync::OnceLock;

use regex::Regex;

/// A merge request title split into its display part and issue reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTitle {
    pub display: String,
    pub issue_key: Option<String>,
}

fn title_regex() -> &'static Regex {
    static TITLE_RE: OnceLock<Regex> = OnceLock::new();
    TITLE_RE.get_or_init(|| {
        Regex::new(r"(?s)^(.*?)\s*\[([A-Z0-9]+-[0-9]+)\]\s*$").expect("title regex is valid")
    })
}

/// Splits `"Title [PROJ-123]"` into `"Title"` and `Some("PROJ-123")`.
///
/// Only a reference at the very end of the title counts.
pub fn parse_title(title: &str) -> ParsedTitle {
    match title_regex().captures(title) {
        Some(caps) => ParsedTitle {
            display: caps[1].trim().to_string(),
            issue_key: Some(caps[2].to_string()),
        },
        None => ParsedTitle {
            display: title.trim().to_string(),
            issue_key: None,
        },
    }
}

pub fn issue_key(title: &str) -> Option<String> {
    parse_title(title).issue_key
}
