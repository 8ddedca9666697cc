//! HTTP fetcher contract and the reqwest implementation.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderValue, ETAG, IF_NONE_MATCH};
use reqwest::StatusCode;
use serde_json::Value;

use tradebook_core::errors::{Error, Result};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Outcome of a conditional GET.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// A 2xx response with a JSON body.
    Fresh { etag: Option<String>, body: Value },
    /// 304 - the validator matched, the cached payload is still current.
    NotModified,
}

/// Generic "fetch resource by URL + params" contract consumed by the cache.
///
/// Implementations classify failures into the core taxonomy: a non-2xx,
/// non-304 status becomes [`Error::Http`], a transport-level failure
/// becomes [`Error::Network`].
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    async fn fetch_json(
        &self,
        url: &str,
        params: &[(String, String)],
        if_none_match: Option<&str>,
    ) -> Result<FetchOutcome>;
}

/// Production fetcher backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestFetcher {
    /// Create a fetcher for the given API origin
    /// (e.g. "https://journal.example.com").
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
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn fetch_json(
        &self,
        url: &str,
        params: &[(String, String)],
        if_none_match: Option<&str>,
    ) -> Result<FetchOutcome> {
        let full_url = format!("{}{}", self.base_url, url);
        let mut request = self.client.get(&full_url).query(params);

        if let Some(validator) = if_none_match {
            if let Ok(value) = HeaderValue::from_str(validator) {
                request = request.header(IF_NONE_MATCH, value);
            }
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::network(e.to_string()))?;

        let status = response.status();
        debug!("GET {} -> {}", full_url, status);

        if status == StatusCode::NOT_MODIFIED {
            return Ok(FetchOutcome::NotModified);
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::http(status.as_u16(), message));
        }

        let etag = response
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;

        Ok(FetchOutcome::Fresh { etag, body })
    }
}
