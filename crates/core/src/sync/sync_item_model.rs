//! Pending sync item domain models.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::SYNC_MAX_RETRIES;

/// Remote mutation a queued item represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncOperation {
    CreateTrade,
    UpdateTrade,
    DeleteTrade,
}

impl SyncOperation {
    /// Default queue priority for this operation.
    ///
    /// Creates jump ahead: a record that only exists locally is worth more
    /// than an amendment to one the server already has.
    pub fn default_priority(&self) -> SyncPriority {
        match self {
            Self::CreateTrade => SyncPriority::High,
            Self::UpdateTrade | Self::DeleteTrade => SyncPriority::Medium,
        }
    }

    pub fn as_db_str(&self) -> &'static str {
        match self {
            Self::CreateTrade => "CREATE_TRADE",
            Self::UpdateTrade => "UPDATE_TRADE",
            Self::DeleteTrade => "DELETE_TRADE",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "CREATE_TRADE" => Some(Self::CreateTrade),
            "UPDATE_TRADE" => Some(Self::UpdateTrade),
            "DELETE_TRADE" => Some(Self::DeleteTrade),
            _ => None,
        }
    }
}

/// Drain priority of a queued item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncPriority {
    High,
    #[default]
    Medium,
    Low,
}

impl SyncPriority {
    /// Numeric rank, higher drains first.
    pub fn rank(&self) -> u8 {
        match self {
            Self::High => 2,
            Self::Medium => 1,
            Self::Low => 0,
        }
    }

    pub fn as_db_str(&self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "HIGH" => Some(Self::High),
            "MEDIUM" => Some(Self::Medium),
            "LOW" => Some(Self::Low),
            _ => None,
        }
    }
}

/// Lifecycle status of a queued item.
///
/// An item that exhausts its retries is parked as `Failed` instead of being
/// deleted, so permanently lost work stays inspectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncItemStatus {
    #[default]
    Pending,
    Failed,
}

/// A mutation accepted locally and awaiting remote acknowledgment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSyncItem {
    pub id: i64,
    pub operation: SyncOperation,
    /// Serialized record the remote operation applies.
    pub payload: Value,
    pub queued_at: DateTime<Utc>,
    pub priority: SyncPriority,
    pub retry_count: i32,
    pub max_retries: i32,
    pub last_attempt: Option<DateTime<Utc>>,
    pub status: SyncItemStatus,
}

impl PendingSyncItem {
    /// True once the retry ceiling has been reached.
    pub fn is_exhausted(&self) -> bool {
        self.retry_count >= self.max_retries
    }

    /// Id of the trade the payload refers to, when present.
    pub fn trade_id(&self) -> Option<&str> {
        self.payload.get("id").and_then(Value::as_str)
    }
}

/// Input for enqueueing a new sync item.
#[derive(Debug, Clone)]
pub struct NewPendingSyncItem {
    pub operation: SyncOperation,
    pub payload: Value,
    pub priority: SyncPriority,
    pub max_retries: i32,
}

impl NewPendingSyncItem {
    /// New item with the operation's default priority and retry ceiling.
    pub fn new(operation: SyncOperation, payload: Value) -> Self {
        Self {
            operation,
            priority: operation.default_priority(),
            payload,
            max_retries: SYNC_MAX_RETRIES,
        }
    }

    pub fn with_priority(mut self, priority: SyncPriority) -> Self {
        self.priority = priority;
        self
    }
}

/// Sort items into drain order: priority descending, then queue time
/// ascending, then id ascending as the tie-breaker.
///
/// The coordinator processes the result strictly sequentially; this ordering
/// is the documented queue invariant.
pub fn sort_for_drain(items: &mut [PendingSyncItem]) {
    items.sort_by_key(|item| (Reverse(item.priority.rank()), item.queued_at, item.id));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn item(id: i64, priority: SyncPriority, queued_at: DateTime<Utc>) -> PendingSyncItem {
        PendingSyncItem {
            id,
            operation: SyncOperation::CreateTrade,
            payload: json!({"id": format!("trade-{id}")}),
            queued_at,
            priority,
            retry_count: 0,
            max_retries: SYNC_MAX_RETRIES,
            last_attempt: None,
            status: SyncItemStatus::Pending,
        }
    }

    #[test]
    fn test_drain_order_priority_then_age() {
        let t0 = Utc::now();
        let t1 = t0 + Duration::seconds(1);
        let t2 = t0 + Duration::seconds(2);

        // Enqueued as LOW(t0), HIGH(t1), HIGH(t2).
        let mut items = vec![
            item(1, SyncPriority::Low, t0),
            item(2, SyncPriority::High, t1),
            item(3, SyncPriority::High, t2),
        ];

        sort_for_drain(&mut items);

        let ids: Vec<i64> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_drain_order_ties_break_by_id() {
        let t0 = Utc::now();
        let mut items = vec![
            item(9, SyncPriority::Medium, t0),
            item(4, SyncPriority::Medium, t0),
        ];

        sort_for_drain(&mut items);

        let ids: Vec<i64> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![4, 9]);
    }

    #[test]
    fn test_default_priorities() {
        assert_eq!(
            SyncOperation::CreateTrade.default_priority(),
            SyncPriority::High
        );
        assert_eq!(
            SyncOperation::UpdateTrade.default_priority(),
            SyncPriority::Medium
        );
        assert_eq!(
            SyncOperation::DeleteTrade.default_priority(),
            SyncPriority::Medium
        );
    }

    #[test]
    fn test_trade_id_extraction() {
        let with_id = item(1, SyncPriority::High, Utc::now());
        assert_eq!(with_id.trade_id(), Some("trade-1"));

        let mut without_id = item(2, SyncPriority::High, Utc::now());
        without_id.payload = json!({"instrument": "ES"});
        assert_eq!(without_id.trade_id(), None);
    }

    #[test]
    fn test_operation_round_trips_db_strings() {
        for op in [
            SyncOperation::CreateTrade,
            SyncOperation::UpdateTrade,
            SyncOperation::DeleteTrade,
        ] {
            assert_eq!(SyncOperation::from_db_str(op.as_db_str()), Some(op));
        }
        assert_eq!(SyncOperation::from_db_str("TRUNCATE_TRADE"), None);
    }
}
