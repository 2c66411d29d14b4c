use log::debug;
use reqwest::{Client, RequestBuilder};
use url::Url;

use crate::auth::Token;
use crate::error::{Result, Service, StalemateError};
use crate::providers::{ensure_success, http_client, parse_base_url};

use super::types::{ApiResponse, Block, InvitePayload, PostMessagePayload, SlackUser};

/// Client for the Slack Web API.
pub struct SlackClient {
    client: Client,
    api_url: Url,
    token: Token,
}

impl SlackClient {
    pub fn new(api_url: &str, token: Token) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            api_url: parse_base_url(api_url)?,
            token,
        })
    }

    /// Sends a Web API call and unwraps the `{"ok": .., "error": ..}` envelope.
    async fn call(&self, method: &str, request: RequestBuilder) -> Result<ApiResponse> {
        debug!("Calling Slack method {method}");
        let response = request.bearer_auth(self.token.as_str()).send().await?;
        let body: ApiResponse = ensure_success(Service::Slack, response).await?.json().await?;

        if !body.ok {
            return Err(StalemateError::Slack {
                method: method.to_string(),
                error: body.error.unwrap_or_else(|| "unknown_error".to_string()),
            });
        }

        Ok(body)
    }

    fn method_url(&self, method: &str) -> Result<Url> {
        Ok(self.api_url.join(method)?)
    }

    pub async fn lookup_user_by_email(&self, email: &str) -> Result<SlackUser> {
        let method = "users.lookupByEmail";
        let request = self
            .client
            .get(self.method_url(method)?)
            .query(&[("email", email)]);

        self.call(method, request)
            .await?
            .user
            .ok_or_else(|| StalemateError::Slack {
                method: method.to_string(),
                error: "response did not contain a user".to_string(),
            })
    }

    /// Invites users to a channel. Slack rejects the call with
    /// `already_in_channel` only when every user is already a member.
    pub async fn invite_to_channel(&self, channel: &str, user_ids: &[String]) -> Result<()> {
        if user_ids.is_empty() {
            return Ok(());
        }

        let method = "conversations.invite";
        let payload = InvitePayload {
            channel,
            users: user_ids.join(","),
        };
        let request = self.client.post(self.method_url(method)?).json(&payload);

        self.call(method, request).await?;
        Ok(())
    }

    pub async fn post_message(&self, channel: &str, blocks: &[Block], text: &str) -> Result<()> {
        let method = "chat.postMessage";
        let payload = PostMessagePayload {
            channel,
            text,
            blocks,
        };
        let request = self.client.post(self.method_url(method)?).json(&payload);

        self.call(method, request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_lookup_user_by_email() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/users.lookupByEmail")
            .match_query(Matcher::UrlEncoded(
                "email".into(),
                "jane.doe@example.com".into(),
            ))
            .match_header("authorization", "Bearer xoxb-test")
            .with_status(200)
            .with_body(r#"{"ok":true,"user":{"id":"U123","name":"jane.doe"}}"#)
            .create_async()
            .await;

        let client = SlackClient::new(&server.url(), Token::from("xoxb-test")).unwrap();
        let user = client
            .lookup_user_by_email("jane.doe@example.com")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(user.id, "U123");
    }

    #[tokio::test]
    async fn test_lookup_user_not_found_surfaces_slack_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/users.lookupByEmail")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"ok":false,"error":"users_not_found"}"#)
            .create_async()
            .await;

        let client = SlackClient::new(&server.url(), Token::from("t")).unwrap();
        let err = client
            .lookup_user_by_email("ghost@example.com")
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "slack - users.lookupByEmail failed: users_not_found"
        );
    }

    #[tokio::test]
    async fn test_invite_joins_user_ids() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/conversations.invite")
            .match_body(Matcher::Json(json!({"channel": "C1", "users": "U1,U2"})))
            .with_status(200)
            .with_body(r#"{"ok":true}"#)
            .create_async()
            .await;

        let client = SlackClient::new(&server.url(), Token::from("t")).unwrap();
        client
            .invite_to_channel("C1", &["U1".to_string(), "U2".to_string()])
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_invite_without_users_makes_no_call() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/conversations.invite")
            .expect(0)
            .create_async()
            .await;

        let client = SlackClient::new(&server.url(), Token::from("t")).unwrap();
        client.invite_to_channel("C1", &[]).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_post_message_sends_blocks() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat.postMessage")
            .match_body(Matcher::PartialJson(json!({
                "channel": "C1",
                "blocks": [{"type": "section", "text": {"type": "mrkdwn", "text": "hi"}}]
            })))
            .with_status(200)
            .with_body(r#"{"ok":true,"ts":"1700000000.000100"}"#)
            .create_async()
            .await;

        let client = SlackClient::new(&server.url(), Token::from("t")).unwrap();
        client
            .post_message("C1", &[Block::markdown_section("hi")], "hi")
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_post_message_http_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat.postMessage")
            .with_status(500)
            .with_body("oops")
            .create_async()
            .await;

        let client = SlackClient::new(&server.url(), Token::from("t")).unwrap();
        let err = client
            .post_message("C1", &[], "hi")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            StalemateError::Api {
                service: Service::Slack,
                status: 500,
                ..
            }
        ));
    }
}
