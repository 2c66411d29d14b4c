use serde::{Deserialize, Serialize};

/// Block Kit block; only sections are needed for the sweep report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Section { text: Text },
}

impl Block {
    pub fn markdown_section(text: impl Into<String>) -> Self {
        Block::Section {
            text: Text::mrkdwn(text),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Block::Section { text } => &text.text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Text {
    #[serde(rename = "type")]
    pub text_type: &'static str,
    pub text: String,
}

impl Text {
    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self {
            text_type: "mrkdwn",
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackUser {
    pub id: String,
}

/// Envelope every Web API method replies with.
#[derive(Debug, Deserialize)]
pub(super) struct ApiResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub user: Option<SlackUser>,
}

#[derive(Debug, Serialize)]
pub(super) struct InvitePayload<'a> {
    pub channel: &'a str,
    pub users: String,
}

#[derive(Debug, Serialize)]
pub(super) struct PostMessagePayload<'a> {
    pub channel: &'a str,
    /// Fallback for notifications
    pub text: &'a str,
    pub blocks: &'a [Block],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_block_serializes_as_block_kit() {
        let block = Block::markdown_section("*hello*");
        let value = serde_json::to_value(&block).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "type": "section",
                "text": {"type": "mrkdwn", "text": "*hello*"}
            })
        );
    }
}
