//! Repository for the pending sync queue.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;

use super::model::{NewPendingSyncItemDB, PendingSyncItemDB, STATUS_FAILED, STATUS_PENDING};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::pending_sync;
use tradebook_core::errors::{Error, Result};
use tradebook_core::sync::{
    sort_for_drain, NewPendingSyncItem, PendingSyncItem, PendingSyncRepositoryTrait,
};

pub struct PendingSyncRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl PendingSyncRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }

    fn load_by_status(&self, status: &'static str) -> Result<Vec<PendingSyncItem>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = pending_sync::table
            .filter(pending_sync::status.eq(status))
            .load::<PendingSyncItemDB>(&mut conn)
            .map_err(StorageError::from)?;

        rows.into_iter()
            .map(|row| row.try_into().map_err(Error::from))
            .collect()
    }
}

#[async_trait]
impl PendingSyncRepositoryTrait for PendingSyncRepository {
    async fn enqueue(&self, item: NewPendingSyncItem) -> Result<PendingSyncItem> {
        self.writer
            .exec(move |conn| {
                let db_model = NewPendingSyncItemDB::from_domain(&item, Utc::now())?;

                let inserted: PendingSyncItemDB = diesel::insert_into(pending_sync::table)
                    .values(&db_model)
                    .returning(PendingSyncItemDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;

                inserted.try_into().map_err(Error::from)
            })
            .await
    }

    fn pending(&self) -> Result<Vec<PendingSyncItem>> {
        let mut items = self.load_by_status(STATUS_PENDING)?;
        // The drain-order invariant lives in one place: priority desc,
        // queue time asc.
        sort_for_drain(&mut items);
        Ok(items)
    }

    fn failed(&self) -> Result<Vec<PendingSyncItem>> {
        self.load_by_status(STATUS_FAILED)
    }

    fn pending_count(&self) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;

        let count: i64 = pending_sync::table
            .filter(pending_sync::status.eq(STATUS_PENDING))
            .count()
            .get_result(&mut conn)
            .map_err(StorageError::from)?;

        Ok(count as usize)
    }

    async fn remove(&self, id: i64) -> Result<()> {
        self.writer
            .exec(move |conn| {
                diesel::delete(pending_sync::table.find(id))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                Ok(())
            })
            .await
    }

    async fn increment_retry(&self, id: i64) -> Result<bool> {
        self.writer
            .exec(move |conn| {
                let existing = pending_sync::table
                    .find(id)
                    .first::<PendingSyncItemDB>(conn)
                    .optional()
                    .map_err(StorageError::from)?;

                // An absent item has nothing left to retry.
                let Some(item) = existing else {
                    return Ok(false);
                };

                let retry_count = item.retry_count + 1;
                let now = Utc::now().to_rfc3339();

                if retry_count >= item.max_retries {
                    // Park instead of delete: permanently failed work stays
                    // visible to the UI and support tooling.
                    diesel::update(pending_sync::table.find(id))
                        .set((
                            pending_sync::retry_count.eq(retry_count),
                            pending_sync::last_attempt.eq(&now),
                            pending_sync::status.eq(STATUS_FAILED),
                        ))
                        .execute(conn)
                        .map_err(StorageError::from)?;

                    return Ok(false);
                }

                diesel::update(pending_sync::table.find(id))
                    .set((
                        pending_sync::retry_count.eq(retry_count),
                        pending_sync::last_attempt.eq(&now),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                Ok(true)
            })
            .await
    }

    async fn clear(&self) -> Result<()> {
        self.writer
            .exec(move |conn| {
                diesel::delete(pending_sync::table)
                    .execute(conn)
                    .map_err(StorageError::from)?;

                Ok(())
            })
            .await
    }
}
