//! Raw asset fetching for the interception layer.

use std::time::Duration;

use async_trait::async_trait;

use tradebook_core::errors::{Error, Result};

/// Default timeout for intercepted fetches.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A fetched response body, content type included.
#[derive(Clone, Debug)]
pub struct FetchedAsset {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
}

/// Network access used by the gateway strategies.
///
/// Non-2xx statuses are [`Error::Http`]; transport failures are
/// [`Error::Network`].
#[async_trait]
pub trait AssetFetcherTrait: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedAsset>;
}

/// Production fetcher backed by reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestAssetFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestAssetFetcher {
    /// Create a fetcher; relative URLs resolve against `base_url`.
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn resolve(&self, url: &str) -> String {
        if url.contains("://") {
            url.to_string()
        } else {
            format!("{}{}", self.base_url, url)
        }
    }
}

#[async_trait]
impl AssetFetcherTrait for ReqwestAssetFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedAsset> {
        let response = self
            .client
            .get(self.resolve(url))
            .send()
            .await
            .map_err(|e| Error::network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::http(status.as_u16(), message));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::network(e.to_string()))?
            .to_vec();

        Ok(FetchedAsset {
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}
