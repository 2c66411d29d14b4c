mod branches;
mod merge_requests;

use log::debug;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::auth::Token;
use crate::error::{Result, Service, StalemateError};
use crate::providers::{ensure_success, http_client, parse_base_url};

pub(super) const PAGE_SIZE: usize = 100;

/// Thin client over the GitLab REST v4 API.
pub struct GitLabClient {
    client: Client,
    api_url: Url,
    token: Token,
}

impl GitLabClient {
    pub fn new(base_url: &str, token: Token) -> Result<Self> {
        let api_url = parse_base_url(base_url)?
            .join("api/v4/")
            .map_err(|e| StalemateError::Config(format!("Invalid API base URL: {e}")))?;

        Ok(Self {
            client: http_client()?,
            api_url,
            token,
        })
    }

    fn auth_request(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(self.token.as_str())
    }

    /// Construct project base URL
    fn project_url(&self, project_id: &str) -> Result<Url> {
        Ok(self
            .api_url
            .join(&format!("projects/{}/", urlencoding::encode(project_id)))?)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = self.auth_request(request).send().await?;
        ensure_success(Service::GitLab, response).await
    }

    /// Fetches every page of a list endpoint, following `x-next-page`.
    async fn get_all_pages<T>(&self, url: Url, query: &[(&str, &str)]) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let per_page = PAGE_SIZE.to_string();
        let mut items = Vec::new();
        let mut page = "1".to_string();

        loop {
            debug!("GET {url} page {page}");
            let request = self
                .client
                .get(url.clone())
                .query(query)
                .query(&[("per_page", per_page.as_str()), ("page", page.as_str())]);

            let response = self.send(request).await?;
            let next = next_page(&response);
            let batch: Vec<T> = response.json().await?;
            items.extend(batch);

            match next {
                Some(next) => page = next,
                None => break,
            }
        }

        Ok(items)
    }
}

/// GitLab sends an empty `x-next-page` header on the last page.
fn next_page(response: &Response) -> Option<String> {
    response
        .headers()
        .get("x-next-page")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
}
