use log::debug;
use reqwest::{Client, StatusCode};
use url::Url;

use crate::auth::Token;
use crate::error::{Result, Service};
use crate::providers::{ensure_success, http_client, parse_base_url};

use super::types::Issue;

/// Client for the Jira REST API v2.
pub struct JiraClient {
    client: Client,
    base_url: Url,
    token: Token,
}

impl JiraClient {
    pub fn new(base_url: &str, token: Token) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            base_url: parse_base_url(base_url)?,
            token,
        })
    }

    /// Fetches an issue by key, returning `None` when Jira reports 404.
    pub async fn get_issue(&self, key: &str) -> Result<Option<Issue>> {
        let url = self
            .base_url
            .join(&format!("rest/api/2/issue/{}", urlencoding::encode(key)))?;

        debug!("Fetching Jira issue {key}");
        let response = self
            .client
            .get(url)
            .query(&[("fields", "status")])
            .bearer_auth(self.token.as_str())
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let issue = ensure_success(Service::Jira, response)
            .await?
            .json::<Issue>()
            .await?;
        Ok(Some(issue))
    }

    /// Web link to an issue, e.g. `https://jira.example.com/browse/WEB-42`.
    pub fn browse_url(&self, key: &str) -> String {
        format!("{}browse/{key}", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;

    use super::*;
    use crate::error::StalemateError;

    #[tokio::test]
    async fn test_get_issue_returns_status() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/api/2/issue/WEB-42")
            .match_query(Matcher::UrlEncoded("fields".into(), "status".into()))
            .match_header("authorization", "Bearer jira-token")
            .with_status(200)
            .with_body(r#"{"key":"WEB-42","fields":{"status":{"name":"In Review"}}}"#)
            .create_async()
            .await;

        let client = JiraClient::new(&server.url(), Token::from("jira-token")).unwrap();
        let issue = client.get_issue("WEB-42").await.unwrap().unwrap();

        mock.assert_async().await;
        assert_eq!(issue.key, "WEB-42");
        assert_eq!(issue.status_name(), "In Review");
    }

    #[tokio::test]
    async fn test_get_issue_missing_is_none() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/rest/api/2/issue/WEB-404")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"errorMessages":["Issue does not exist"]}"#)
            .create_async()
            .await;

        let client = JiraClient::new(&server.url(), Token::from("t")).unwrap();
        assert!(client.get_issue("WEB-404").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_issue_unauthorized_is_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/rest/api/2/issue/WEB-1")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body("Unauthorized")
            .create_async()
            .await;

        let client = JiraClient::new(&server.url(), Token::from("t")).unwrap();
        let err = client.get_issue("WEB-1").await.unwrap_err();

        assert!(matches!(
            err,
            StalemateError::Api {
                service: Service::Jira,
                status: 401,
                ..
            }
        ));
    }

    #[test]
    fn test_browse_url() {
        let client = JiraClient::new("https://jira.example.com", Token::from("t")).unwrap();
        assert_eq!(
            client.browse_url("WEB-42"),
            "https://jira.example.com/browse/WEB-42"
        );
    }
}
