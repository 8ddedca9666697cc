//! Remote mutation transport.
//!
//! The coordinator drives trades to the journal REST API through this
//! contract: `POST /trades`, `PUT /trades/:id`, `DELETE /trades/:id`.
//! Any 2xx is success; everything else is a retryable failure.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;

use tradebook_core::errors::{Error, Result};
use tradebook_core::sync::{PendingSyncItem, SyncOperation};

/// Default timeout for mutation requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Applies a queued mutation remotely.
#[async_trait]
pub trait SyncTransportTrait: Send + Sync {
    async fn apply(&self, item: &PendingSyncItem) -> Result<()>;
}

/// HTTP transport for the journal API.
#[derive(Debug, Clone)]
pub struct HttpSyncTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSyncTransport {
    /// Create a transport for the given API origin
    /// (e.g. "https://journal.example.com/api").
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

    fn trade_id_of(item: &PendingSyncItem) -> Result<&str> {
        item.trade_id().ok_or_else(|| {
            Error::Validation(format!(
                "sync item {} has no trade id in its payload",
                item.id
            ))
        })
    }
}

#[async_trait]
impl SyncTransportTrait for HttpSyncTransport {
    async fn apply(&self, item: &PendingSyncItem) -> Result<()> {
        let request = match item.operation {
            SyncOperation::CreateTrade => self
                .client
                .post(format!("{}/trades", self.base_url))
                .json(&item.payload),
            SyncOperation::UpdateTrade => {
                let trade_id = Self::trade_id_of(item)?;
                self.client
                    .put(format!("{}/trades/{}", self.base_url, trade_id))
                    .json(&item.payload)
            }
            SyncOperation::DeleteTrade => {
                let trade_id = Self::trade_id_of(item)?;
                self.client
                    .delete(format!("{}/trades/{}", self.base_url, trade_id))
            }
        };

        let response = request
            .send()
            .await
            .map_err(|e| Error::network(e.to_string()))?;

        let status = response.status();
        debug!(
            "{} for sync item {} -> {}",
            item.operation.as_db_str(),
            item.id,
            status
        );

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::http(status.as_u16(), message));
        }

        Ok(())
    }
}
