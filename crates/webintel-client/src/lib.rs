use std::time::Duration;
use webintel_core::{Error, Result};

pub mod crawl;
pub mod deep;
pub mod extract;
pub mod payload;
pub mod research;
pub mod search;
pub mod sitemap;

pub const DEFAULT_ENDPOINT: &str = "https://api.tavily.com";

fn api_key_from_env() -> Option<String> {
    std::env::var("WEBINTEL_API_KEY")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(|| {
            std::env::var("TAVILY_API_KEY")
                .ok()
                .filter(|v| !v.trim().is_empty())
        })
}

fn endpoint_from_env() -> Option<String> {
    std::env::var("WEBINTEL_API_ENDPOINT")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// One authenticated JSON POST to one API path. The concrete implementation
/// is [`ApiClient`]; the workflow in [`deep`] is generic over this trait so
/// it can be exercised against canned responses.
#[async_trait::async_trait]
pub trait ApiTransport: Send + Sync {
    async fn post_json(
        &self,
        path: &str,
        payload: &serde_json::Value,
        timeout: Duration,
    ) -> Result<serde_json::Value>;
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl ApiClient {
    /// Build a client from `WEBINTEL_API_KEY` (or `TAVILY_API_KEY`). The
    /// credential check happens here, before any request is issued; blank
    /// values count as unset.
    pub fn from_env(client: reqwest::Client) -> Result<Self> {
        let api_key = api_key_from_env().ok_or(Error::MissingCredential)?;
        Ok(Self {
            client,
            api_key,
            endpoint: endpoint_from_env().unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
        })
    }

    pub fn new(client: reqwest::Client, api_key: String, endpoint: String) -> Self {
        Self {
            client,
            api_key,
            endpoint,
        }
    }

    fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.endpoint.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait::async_trait]
impl ApiTransport for ApiClient {
    async fn post_json(
        &self,
        path: &str,
        payload: &serde_json::Value,
        timeout: Duration,
    ) -> Result<serde_json::Value> {
        // Exactly one round trip; retries are a caller decision.
        let resp = self
            .client
            .post(self.url_for(path))
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", self.api_key),
            )
            .header("x-client-source", "webintel-cli")
            .json(payload)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| Error::Transport {
                cause: e.to_string(),
                timed_out: e.is_timeout(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            // The endpoint's own error text is often the only diagnostic
            // available; pass it through verbatim.
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Remote {
                status: status.as_u16(),
                body,
            });
        }

        resp.json::<serde_json::Value>().await.map_err(|e| {
            if e.is_timeout() {
                Error::Transport {
                    cause: e.to_string(),
                    timed_out: true,
                }
            } else {
                Error::BadResponse(e.to_string())
            }
        })
    }
}
