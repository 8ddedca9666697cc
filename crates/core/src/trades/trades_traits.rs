//! Trade repository and service traits.
//!
//! These traits define the contract for trade operations without any
//! database-specific types, allowing for different storage implementations.

use async_trait::async_trait;

use super::trades_model::{NewTrade, Trade, TradeFilters, TradeUpdate};
use crate::errors::Result;

/// Trait defining the contract for trade persistence.
#[async_trait]
pub trait TradeRepositoryTrait: Send + Sync {
    /// Insert or overwrite a trade record.
    async fn save(&self, trade: Trade) -> Result<Trade>;

    /// Apply a partial update to an existing trade.
    ///
    /// Fails with a not-found error if the base record is absent.
    async fn update(&self, update: TradeUpdate) -> Result<Trade>;

    /// Point read. Absence is `Ok(None)`, never an error.
    fn get_by_id(&self, trade_id: &str) -> Result<Option<Trade>>;

    /// All trades for a user, unordered.
    fn list_for_user(&self, user_id: &str) -> Result<Vec<Trade>>;

    /// Delete a trade. Deleting an absent id succeeds.
    async fn delete(&self, trade_id: &str) -> Result<()>;

    /// Flip the `synced` flag after remote acknowledgment.
    async fn mark_synced(&self, trade_id: &str) -> Result<()>;
}

/// Trait defining the contract for the trade service layer.
///
/// The service owns the offline side-effect contract: every mutation invoked
/// while offline transparently enqueues a matching pending-sync item. This
/// is part of the store's contract, not an optional caller responsibility.
#[async_trait]
pub trait TradeServiceTrait: Send + Sync {
    /// Create a trade, enqueueing a CREATE_TRADE sync item when offline.
    async fn save_trade(&self, new_trade: NewTrade) -> Result<Trade>;

    /// Update a trade, enqueueing an UPDATE_TRADE sync item when offline.
    async fn update_trade(&self, update: TradeUpdate) -> Result<Trade>;

    /// Point read.
    fn get_trade(&self, trade_id: &str) -> Result<Option<Trade>>;

    /// Filtered journal list, sorted by entry time descending.
    fn get_trades(&self, user_id: &str, filters: &TradeFilters) -> Result<Vec<Trade>>;

    /// Delete a trade, enqueueing a DELETE_TRADE sync item when offline.
    async fn delete_trade(&self, trade_id: &str) -> Result<()>;
}
