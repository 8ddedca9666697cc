//! Trade service - local CRUD with the offline enqueue contract.

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use serde_json::json;

use super::trades_model::{filter_and_sort, NewTrade, Trade, TradeFilters, TradeUpdate};
use super::trades_traits::{TradeRepositoryTrait, TradeServiceTrait};
use crate::connectivity::ConnectivityMonitor;
use crate::errors::Result;
use crate::sync::{NewPendingSyncItem, PendingSyncRepositoryTrait, SyncOperation};
use crate::utils::Clock;

/// Service for journaled trades.
///
/// Wraps the repository with the offline side-effect contract: mutations
/// issued while offline are applied optimistically to the local store and a
/// matching [`crate::sync::PendingSyncItem`] is enqueued in the same call.
pub struct TradeService {
    repository: Arc<dyn TradeRepositoryTrait>,
    queue: Arc<dyn PendingSyncRepositoryTrait>,
    connectivity: ConnectivityMonitor,
    clock: Arc<dyn Clock>,
}

impl TradeService {
    pub fn new(
        repository: Arc<dyn TradeRepositoryTrait>,
        queue: Arc<dyn PendingSyncRepositoryTrait>,
        connectivity: ConnectivityMonitor,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            queue,
            connectivity,
            clock,
        }
    }

    async fn enqueue_if_offline(
        &self,
        operation: SyncOperation,
        payload: serde_json::Value,
    ) -> Result<()> {
        if self.connectivity.is_online() {
            return Ok(());
        }

        let item = self
            .queue
            .enqueue(NewPendingSyncItem::new(operation, payload))
            .await?;
        debug!(
            "Offline: queued {} as sync item {}",
            operation.as_db_str(),
            item.id
        );
        Ok(())
    }
}

#[async_trait]
impl TradeServiceTrait for TradeService {
    async fn save_trade(&self, new_trade: NewTrade) -> Result<Trade> {
        let trade = Trade::from_new(new_trade, self.clock.now());
        let trade = self.repository.save(trade).await?;

        self.enqueue_if_offline(SyncOperation::CreateTrade, serde_json::to_value(&trade)?)
            .await?;
        Ok(trade)
    }

    async fn update_trade(&self, update: TradeUpdate) -> Result<Trade> {
        let trade = self.repository.update(update).await?;

        self.enqueue_if_offline(SyncOperation::UpdateTrade, serde_json::to_value(&trade)?)
            .await?;
        Ok(trade)
    }

    fn get_trade(&self, trade_id: &str) -> Result<Option<Trade>> {
        self.repository.get_by_id(trade_id)
    }

    fn get_trades(&self, user_id: &str, filters: &TradeFilters) -> Result<Vec<Trade>> {
        let trades = self.repository.list_for_user(user_id)?;
        Ok(filter_and_sort(trades, filters))
    }

    async fn delete_trade(&self, trade_id: &str) -> Result<()> {
        self.repository.delete(trade_id).await?;

        self.enqueue_if_offline(SyncOperation::DeleteTrade, json!({ "id": trade_id }))
            .await?;
        Ok(())
    }
}
