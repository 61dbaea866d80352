//! Network fetch capability.
//!
//! The core only needs "bytes for a URL" and "text for a URL". Timeouts,
//! redirects and TLS belong to the implementation; every failure is
//! treated the same way by the caller.

mod http;

pub use http::HttpFetcher;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::FetchError;

#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetches the body of `url` as raw bytes.
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError>;

    /// Fetches the body of `url` as UTF-8 text (lossy).
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let body = self.fetch(url).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}
