//! Database models for the pending sync queue.

use diesel::prelude::*;

use crate::errors::StorageError;
use crate::utils::{format_utc, parse_utc, parse_utc_opt};
use tradebook_core::sync::{
    NewPendingSyncItem, PendingSyncItem, SyncItemStatus, SyncOperation, SyncPriority,
};

/// Database model for a queued mutation.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = crate::schema::pending_sync)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PendingSyncItemDB {
    pub id: i64,
    pub operation: String,
    pub payload: String,
    pub queued_at: String,
    pub priority: String,
    pub retry_count: i32,
    pub max_retries: i32,
    pub last_attempt: Option<String>,
    pub status: String,
}

/// Insertable model - the id comes from the autoincrement column.
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::pending_sync)]
pub struct NewPendingSyncItemDB {
    pub operation: String,
    pub payload: String,
    pub queued_at: String,
    pub priority: String,
    pub retry_count: i32,
    pub max_retries: i32,
    pub status: String,
}

impl NewPendingSyncItemDB {
    pub fn from_domain(
        item: &NewPendingSyncItem,
        queued_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<Self, StorageError> {
        Ok(Self {
            operation: item.operation.as_db_str().to_string(),
            payload: serde_json::to_string(&item.payload)?,
            queued_at: format_utc(queued_at),
            priority: item.priority.as_db_str().to_string(),
            retry_count: 0,
            max_retries: item.max_retries,
            status: STATUS_PENDING.to_string(),
        })
    }
}

pub(crate) const STATUS_PENDING: &str = "PENDING";
pub(crate) const STATUS_FAILED: &str = "FAILED";

impl TryFrom<PendingSyncItemDB> for PendingSyncItem {
    type Error = StorageError;

    fn try_from(db: PendingSyncItemDB) -> Result<Self, Self::Error> {
        let operation = SyncOperation::from_db_str(&db.operation).ok_or_else(|| {
            StorageError::SerializationError(format!("unknown sync operation '{}'", db.operation))
        })?;
        let priority = SyncPriority::from_db_str(&db.priority).ok_or_else(|| {
            StorageError::SerializationError(format!("unknown sync priority '{}'", db.priority))
        })?;
        let status = match db.status.as_str() {
            STATUS_PENDING => SyncItemStatus::Pending,
            STATUS_FAILED => SyncItemStatus::Failed,
            other => {
                return Err(StorageError::SerializationError(format!(
                    "unknown sync status '{other}'"
                )))
            }
        };

        Ok(Self {
            operation,
            priority,
            status,
            payload: serde_json::from_str(&db.payload)?,
            queued_at: parse_utc(&db.queued_at)?,
            retry_count: db.retry_count,
            max_retries: db.max_retries,
            last_attempt: parse_utc_opt(db.last_attempt.as_deref())?,
            id: db.id,
        })
    }
}
