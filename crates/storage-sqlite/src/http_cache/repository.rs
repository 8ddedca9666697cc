//! SQLite implementation of the persistent cache tier.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::model::HttpCacheEntryDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::http_cache;
use crate::utils::format_utc;
use tradebook_core::cache::{CacheEntry, CacheStoreTrait};
use tradebook_core::errors::{Error, Result};

/// Persistent tier of the API response cache, keyed by canonical cache key.
///
/// Entries survive restarts; freshness decisions belong to the cache engine,
/// not to this store.
pub struct HttpCacheStore {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl HttpCacheStore {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl CacheStoreTrait for HttpCacheStore {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        let mut conn = get_connection(&self.pool)?;

        let result = http_cache::table
            .find(key)
            .first::<HttpCacheEntryDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;

        result.map(TryInto::try_into).transpose().map_err(Error::from)
    }

    async fn put(&self, entry: CacheEntry) -> Result<()> {
        self.writer
            .exec(move |conn| {
                let db_model: HttpCacheEntryDB = entry.try_into()?;

                diesel::replace_into(http_cache::table)
                    .values(&db_model)
                    .execute(conn)
                    .map_err(StorageError::from)?;

                Ok(())
            })
            .await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let key = key.to_string();
        self.writer
            .exec(move |conn| {
                diesel::delete(http_cache::table.find(&key))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                Ok(())
            })
            .await
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<usize> {
        let pattern = format!("{}%", prefix.replace('%', "\\%").replace('_', "\\_"));
        self.writer
            .exec(move |conn| {
                let removed = diesel::delete(
                    http_cache::table.filter(http_cache::cache_key.like(&pattern).escape('\\')),
                )
                .execute(conn)
                .map_err(StorageError::from)?;

                Ok(removed)
            })
            .await
    }

    async fn clear(&self) -> Result<()> {
        self.writer
            .exec(move |conn| {
                diesel::delete(http_cache::table)
                    .execute(conn)
                    .map_err(StorageError::from)?;

                Ok(())
            })
            .await
    }

    async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let cutoff = format_utc(cutoff);
        self.writer
            .exec(move |conn| {
                // RFC 3339 timestamps written by this crate compare
                // lexicographically.
                let removed = diesel::delete(
                    http_cache::table.filter(http_cache::fetched_at.lt(&cutoff)),
                )
                .execute(conn)
                .map_err(StorageError::from)?;

                Ok(removed)
            })
            .await
    }

    async fn count(&self) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;

        let count: i64 = http_cache::table
            .count()
            .get_result(&mut conn)
            .map_err(StorageError::from)?;

        Ok(count as usize)
    }
}
