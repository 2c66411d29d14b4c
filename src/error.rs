use std::fmt;

use thiserror::Error;

/// Remote service an API error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    GitLab,
    Jira,
    Slack,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Service::GitLab => write!(f, "gitlab"),
            Service::Jira => write!(f, "jira"),
            Service::Slack => write!(f, "slack"),
        }
    }
}

#[derive(Error, Debug)]
pub enum StalemateError {
    #[error("{service} - invalid request. Status code: {status}. Body: {body}")]
    Api {
        service: Service,
        status: u16,
        body: String,
    },

    #[error("slack - {method} failed: {error}")]
    Slack { method: String, error: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StalemateError>;
