//! reqwest-backed [`Fetch`].

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;

use super::Fetch;
use crate::config::HlsdmConfig;
use crate::error::FetchError;

const DEFAULT_USER_AGENT: &str = concat!("hlsdm/", env!("CARGO_PKG_VERSION"));

/// HTTP(S) fetcher sharing one connection pool across all requests.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: Option<&str>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent.unwrap_or(DEFAULT_USER_AGENT))
            .build()?;
        Ok(HttpFetcher { client })
    }

    pub fn from_config(cfg: &HlsdmConfig) -> Result<Self, FetchError> {
        Self::new(
            Duration::from_secs(cfg.request_timeout_secs.max(1)),
            cfg.user_agent.as_deref(),
        )
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            tracing::debug!(url, status = status.as_u16(), "fetch failed");
            return Err(FetchError::Http(status.as_u16()));
        }
        Ok(resp.bytes().await?)
    }
}
