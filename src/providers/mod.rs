pub mod gitlab;
pub mod jira;
pub mod slack;

pub use gitlab::GitLabClient;
pub use jira::JiraClient;
pub use slack::SlackClient;

use reqwest::Response;
use url::Url;

use crate::error::{Result, Service, StalemateError};

/// Parses a service base URL so that relative joins append to its path.
///
/// `https://slack.com/api` and `https://slack.com/api/` both resolve
/// `chat.postMessage` to `https://slack.com/api/chat.postMessage`.
pub(crate) fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| StalemateError::Config(format!("Invalid base URL '{raw}': {e}")))?;

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

/// Builds a reqwest client with the shared user agent.
pub(crate) fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("stalemate/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| StalemateError::Config(format!("Failed to create HTTP client: {e}")))
}

/// Turns any 4xx/5xx response into an [`StalemateError::Api`] carrying the body.
pub(crate) async fn ensure_success(service: Service, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());
        return Err(StalemateError::Api {
            service,
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}
