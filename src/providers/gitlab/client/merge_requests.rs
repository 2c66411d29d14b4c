use log::info;

use super::GitLabClient;
use crate::error::Result;
use crate::providers::gitlab::types::{merge_request_iids, MergeRequest, UpdateMergeRequest};

impl GitLabClient {
    /// Lists every merge request of the project in the `opened` state.
    pub async fn list_open_merge_requests(&self, project_id: &str) -> Result<Vec<MergeRequest>> {
        let url = self.project_url(project_id)?.join("merge_requests")?;
        let mrs: Vec<MergeRequest> = self.get_all_pages(url, &[("state", "opened")]).await?;

        info!("MRs found: {}", mrs.len());
        info!("internal ID of MRs: {}", merge_request_iids(&mrs));

        Ok(mrs)
    }

    pub async fn close_merge_request(&self, project_id: &str, iid: u64) -> Result<()> {
        let url = self
            .project_url(project_id)?
            .join(&format!("merge_requests/{iid}"))?;

        let body = UpdateMergeRequest {
            state_event: "close",
        };
        self.send(self.client.put(url).json(&body)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use serde_json::json;

    use crate::auth::Token;
    use crate::providers::GitLabClient;

    #[tokio::test]
    async fn test_list_open_merge_requests_filters_by_state() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v4/projects/group%2Fapp/merge_requests")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("state".into(), "opened".into()),
                Matcher::UrlEncoded("page".into(), "1".into()),
            ]))
            .with_status(200)
            .with_body(
                json!([{
                    "iid": 7,
                    "title": "Fix login [WEB-1]",
                    "author": {"username": "jane.doe"},
                    "updated_at": "2024-03-01T10:00:00Z",
                    "web_url": "https://gitlab.example.com/group/app/-/merge_requests/7"
                }])
                .to_string(),
            )
            .create_async()
            .await;

        let client = GitLabClient::new(&server.url(), Token::from("t")).unwrap();
        let mrs = client.list_open_merge_requests("group/app").await.unwrap();

        mock.assert_async().await;
        assert_eq!(mrs.len(), 1);
        assert_eq!(mrs[0].iid, 7);
        assert_eq!(mrs[0].title, "Fix login [WEB-1]");
    }

    #[tokio::test]
    async fn test_close_merge_request_sends_state_event() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/api/v4/projects/42/merge_requests/7")
            .match_body(Matcher::Json(json!({"state_event": "close"})))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let client = GitLabClient::new(&server.url(), Token::from("t")).unwrap();
        client.close_merge_request("42", 7).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_close_merge_request_propagates_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("PUT", "/api/v4/projects/42/merge_requests/7")
            .with_status(403)
            .with_body("forbidden")
            .create_async()
            .await;

        let client = GitLabClient::new(&server.url(), Token::from("t")).unwrap();
        let err = client.close_merge_request("42", 7).await.unwrap_err();

        assert!(err.to_string().contains("Status code: 403"));
    }
}
