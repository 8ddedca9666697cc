//! Database model for cached API responses.

use diesel::prelude::*;

use crate::errors::StorageError;
use crate::utils::{format_utc, parse_utc};
use tradebook_core::cache::CacheEntry;

#[derive(Queryable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::http_cache)]
#[diesel(primary_key(cache_key))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct HttpCacheEntryDB {
    pub cache_key: String,
    pub payload: String,
    pub etag: Option<String>,
    pub fetched_at: String,
    pub ttl_ms: i64,
}

impl TryFrom<CacheEntry> for HttpCacheEntryDB {
    type Error = StorageError;

    fn try_from(entry: CacheEntry) -> Result<Self, Self::Error> {
        Ok(Self {
            cache_key: entry.key,
            payload: serde_json::to_string(&entry.data)?,
            etag: entry.etag,
            fetched_at: format_utc(entry.timestamp),
            ttl_ms: entry.ttl_ms,
        })
    }
}

impl TryFrom<HttpCacheEntryDB> for CacheEntry {
    type Error = StorageError;

    fn try_from(db: HttpCacheEntryDB) -> Result<Self, Self::Error> {
        Ok(Self {
            key: db.cache_key,
            data: serde_json::from_str(&db.payload)?,
            timestamp: parse_utc(&db.fetched_at)?,
            etag: db.etag,
            ttl_ms: db.ttl_ms,
        })
    }
}
