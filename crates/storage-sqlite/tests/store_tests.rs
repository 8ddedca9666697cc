//! Integration tests for the SQLite local store.

use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use tempfile::TempDir;

use tradebook_core::cache::{CacheEntry, CacheStoreTrait};
use tradebook_core::errors::DatabaseError;
use tradebook_core::settings::{SettingsRepositoryTrait, SettingsUpdate};
use tradebook_core::sync::{
    NewPendingSyncItem, PendingSyncRepositoryTrait, SyncItemStatus, SyncOperation, SyncPriority,
};
use tradebook_core::trades::{
    NewTrade, Trade, TradeDirection, TradeOutcome, TradeRepositoryTrait, TradeUpdate,
};
use tradebook_core::users::{NewUserProfile, UserRepositoryTrait};
use tradebook_core::Error;

use tradebook_storage_sqlite::http_cache::HttpCacheStore;
use tradebook_storage_sqlite::pending_sync::PendingSyncRepository;
use tradebook_storage_sqlite::settings::SettingsRepository;
use tradebook_storage_sqlite::trades::TradeRepository;
use tradebook_storage_sqlite::users::UserProfileRepository;
use tradebook_storage_sqlite::{init, DbPool, WriteHandle};

use std::sync::Arc;

struct TestStore {
    pool: Arc<DbPool>,
    writer: WriteHandle,
    // Keeps the database file alive for the duration of the test.
    _dir: TempDir,
}

fn open_store() -> TestStore {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("tradebook.db");
    let (pool, writer) = init(path.to_str().unwrap()).expect("init store");
    TestStore {
        pool,
        writer,
        _dir: dir,
    }
}

fn sample_trade(user_id: &str, instrument: &str) -> Trade {
    Trade::from_new(
        NewTrade {
            user_id: user_id.to_string(),
            instrument: instrument.to_string(),
            direction: TradeDirection::Long,
            quantity: dec!(2),
            entry_price: dec!(187.42),
            exit_price: None,
            entry_time: Utc::now(),
            exit_time: None,
            outcome: None,
            setup: Some("pullback".to_string()),
            notes: None,
        },
        Utc::now(),
    )
}

// ============================================================================
// Trades
// ============================================================================

#[tokio::test]
async fn test_trade_save_and_read_back() {
    let store = open_store();
    let repo = TradeRepository::new(Arc::clone(&store.pool), store.writer.clone());

    let trade = sample_trade("u1", "AAPL");
    repo.save(trade.clone()).await.unwrap();

    let loaded = repo.get_by_id(&trade.id).unwrap().unwrap();
    assert_eq!(loaded.instrument, "AAPL");
    assert_eq!(loaded.quantity, dec!(2));
    assert!(!loaded.synced);
}

#[tokio::test]
async fn test_trade_get_missing_is_none() {
    let store = open_store();
    let repo = TradeRepository::new(Arc::clone(&store.pool), store.writer.clone());

    assert!(repo.get_by_id("nope").unwrap().is_none());
}

#[tokio::test]
async fn test_trade_update_missing_is_not_found() {
    let store = open_store();
    let repo = TradeRepository::new(Arc::clone(&store.pool), store.writer.clone());

    let err = repo
        .update(TradeUpdate {
            id: "missing".to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Database(DatabaseError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_trade_update_stamps_and_clears_synced() {
    let store = open_store();
    let repo = TradeRepository::new(Arc::clone(&store.pool), store.writer.clone());

    let trade = sample_trade("u1", "ES");
    repo.save(trade.clone()).await.unwrap();
    repo.mark_synced(&trade.id).await.unwrap();
    assert!(repo.get_by_id(&trade.id).unwrap().unwrap().synced);

    let updated = repo
        .update(TradeUpdate {
            id: trade.id.clone(),
            exit_price: Some(dec!(190.10)),
            outcome: Some(TradeOutcome::Win),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(updated.exit_price, Some(dec!(190.10)));
    assert!(!updated.synced);
    assert!(updated.last_modified >= trade.last_modified);
}

#[tokio::test]
async fn test_trade_delete_is_idempotent() {
    let store = open_store();
    let repo = TradeRepository::new(Arc::clone(&store.pool), store.writer.clone());

    let trade = sample_trade("u1", "CL");
    repo.save(trade.clone()).await.unwrap();

    repo.delete(&trade.id).await.unwrap();
    // Second delete of the same id still succeeds.
    repo.delete(&trade.id).await.unwrap();

    assert!(repo.get_by_id(&trade.id).unwrap().is_none());
}

#[tokio::test]
async fn test_trade_list_is_scoped_to_user() {
    let store = open_store();
    let repo = TradeRepository::new(Arc::clone(&store.pool), store.writer.clone());

    repo.save(sample_trade("u1", "ES")).await.unwrap();
    repo.save(sample_trade("u1", "NQ")).await.unwrap();
    repo.save(sample_trade("u2", "ES")).await.unwrap();

    assert_eq!(repo.list_for_user("u1").unwrap().len(), 2);
    assert_eq!(repo.list_for_user("u2").unwrap().len(), 1);
    assert!(repo.list_for_user("u3").unwrap().is_empty());
}

// ============================================================================
// Pending sync queue
// ============================================================================

#[tokio::test]
async fn test_queue_drains_priority_desc_then_time_asc() {
    let store = open_store();
    let queue = PendingSyncRepository::new(Arc::clone(&store.pool), store.writer.clone());

    // Enqueued as LOW, HIGH, HIGH - the LOW item is oldest.
    let low = queue
        .enqueue(
            NewPendingSyncItem::new(SyncOperation::DeleteTrade, serde_json::json!({"id": "a"}))
                .with_priority(SyncPriority::Low),
        )
        .await
        .unwrap();
    let high_1 = queue
        .enqueue(NewPendingSyncItem::new(
            SyncOperation::CreateTrade,
            serde_json::json!({"id": "b"}),
        ))
        .await
        .unwrap();
    let high_2 = queue
        .enqueue(NewPendingSyncItem::new(
            SyncOperation::CreateTrade,
            serde_json::json!({"id": "c"}),
        ))
        .await
        .unwrap();

    let pending = queue.pending().unwrap();
    let ids: Vec<i64> = pending.iter().map(|i| i.id).collect();

    assert_eq!(ids, vec![high_1.id, high_2.id, low.id]);
}

#[tokio::test]
async fn test_queue_ids_autoincrement() {
    let store = open_store();
    let queue = PendingSyncRepository::new(Arc::clone(&store.pool), store.writer.clone());

    let first = queue
        .enqueue(NewPendingSyncItem::new(
            SyncOperation::CreateTrade,
            serde_json::json!({"id": "a"}),
        ))
        .await
        .unwrap();
    let second = queue
        .enqueue(NewPendingSyncItem::new(
            SyncOperation::CreateTrade,
            serde_json::json!({"id": "b"}),
        ))
        .await
        .unwrap();

    assert!(second.id > first.id);
    assert_eq!(first.status, SyncItemStatus::Pending);
    assert_eq!(first.retry_count, 0);
}

#[tokio::test]
async fn test_retry_ceiling_parks_item_as_failed() {
    let store = open_store();
    let queue = PendingSyncRepository::new(Arc::clone(&store.pool), store.writer.clone());

    let item = queue
        .enqueue(NewPendingSyncItem::new(
            SyncOperation::UpdateTrade,
            serde_json::json!({"id": "t1"}),
        ))
        .await
        .unwrap();
    assert_eq!(item.max_retries, 3);

    assert!(queue.increment_retry(item.id).await.unwrap());
    assert!(queue.increment_retry(item.id).await.unwrap());
    // Third failure hits the ceiling.
    assert!(!queue.increment_retry(item.id).await.unwrap());

    // Gone from the drain queue...
    assert!(queue.pending().unwrap().is_empty());
    assert_eq!(queue.pending_count().unwrap(), 0);

    // ...but parked as failed, not deleted.
    let failed = queue.failed().unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].id, item.id);
    assert_eq!(failed[0].retry_count, 3);
    assert!(failed[0].last_attempt.is_some());
}

#[tokio::test]
async fn test_queue_remove_and_clear() {
    let store = open_store();
    let queue = PendingSyncRepository::new(Arc::clone(&store.pool), store.writer.clone());

    let item = queue
        .enqueue(NewPendingSyncItem::new(
            SyncOperation::CreateTrade,
            serde_json::json!({"id": "x"}),
        ))
        .await
        .unwrap();

    queue.remove(item.id).await.unwrap();
    // Removing an absent id succeeds.
    queue.remove(item.id).await.unwrap();
    assert!(queue.pending().unwrap().is_empty());

    queue
        .enqueue(NewPendingSyncItem::new(
            SyncOperation::CreateTrade,
            serde_json::json!({"id": "y"}),
        ))
        .await
        .unwrap();
    queue.clear().await.unwrap();
    assert!(queue.pending().unwrap().is_empty());
    assert!(queue.failed().unwrap().is_empty());
}

#[tokio::test]
async fn test_retry_on_absent_item_reports_exhausted() {
    let store = open_store();
    let queue = PendingSyncRepository::new(Arc::clone(&store.pool), store.writer.clone());

    assert!(!queue.increment_retry(999).await.unwrap());
}

// ============================================================================
// User profiles
// ============================================================================

#[tokio::test]
async fn test_user_email_is_unique() {
    let store = open_store();
    let repo = UserProfileRepository::new(Arc::clone(&store.pool), store.writer.clone());

    repo.create(NewUserProfile {
        email: "trader@example.com".to_string(),
        display_name: Some("Trader".to_string()),
    })
    .await
    .unwrap();

    let err = repo
        .create(NewUserProfile {
            email: "trader@example.com".to_string(),
            display_name: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Database(DatabaseError::UniqueViolation(_))
    ));
}

#[tokio::test]
async fn test_user_lookup_by_email() {
    let store = open_store();
    let repo = UserProfileRepository::new(Arc::clone(&store.pool), store.writer.clone());

    let created = repo
        .create(NewUserProfile {
            email: "swing@example.com".to_string(),
            display_name: None,
        })
        .await
        .unwrap();

    let found = repo.get_by_email("swing@example.com").unwrap().unwrap();
    assert_eq!(found.id, created.id);
    assert!(repo.get_by_email("other@example.com").unwrap().is_none());
}

// ============================================================================
// Settings
// ============================================================================

#[tokio::test]
async fn test_settings_defaults_and_update() {
    let store = open_store();
    let repo = SettingsRepository::new(Arc::clone(&store.pool), store.writer.clone());

    // Defaults before anything is written.
    assert_eq!(repo.get_setting("theme").unwrap(), "light");
    assert_eq!(repo.get_setting("sync_enabled").unwrap(), "true");
    assert!(repo.get_setting("no_such_key").is_err());

    repo.update_settings(&SettingsUpdate {
        theme: Some("dark".to_string()),
        notifications_enabled: Some(true),
        ..Default::default()
    })
    .await
    .unwrap();

    let settings = repo.get_settings().unwrap();
    assert_eq!(settings.theme, "dark");
    assert!(settings.notifications_enabled);
    assert_eq!(settings.base_currency, "USD");
}

// ============================================================================
// HTTP cache store
// ============================================================================

#[tokio::test]
async fn test_cache_store_round_trip_and_overwrite() {
    let store = open_store();
    let cache = HttpCacheStore::new(Arc::clone(&store.pool), store.writer.clone());

    let now = Utc::now();
    let entry = CacheEntry::new(
        "/api/trades?userId=u1",
        serde_json::json!({"trades": []}),
        Some("\"v1\"".to_string()),
        60_000,
        now,
    );
    cache.put(entry.clone()).await.unwrap();

    let loaded = cache.get(&entry.key).await.unwrap().unwrap();
    assert_eq!(loaded.etag.as_deref(), Some("\"v1\""));
    assert_eq!(loaded.ttl_ms, 60_000);

    // Overwrite with a newer payload.
    let newer = CacheEntry::new(
        entry.key.clone(),
        serde_json::json!({"trades": [1]}),
        None,
        60_000,
        now + Duration::seconds(5),
    );
    cache.put(newer).await.unwrap();

    let loaded = cache.get(&entry.key).await.unwrap().unwrap();
    assert_eq!(loaded.data, serde_json::json!({"trades": [1]}));
    assert!(loaded.etag.is_none());
    assert_eq!(cache.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_cache_store_prefix_invalidation() {
    let store = open_store();
    let cache = HttpCacheStore::new(Arc::clone(&store.pool), store.writer.clone());

    let now = Utc::now();
    for key in [
        "/api/trades?userId=u1",
        "/api/trades?userId=u2",
        "/api/checklists",
    ] {
        cache
            .put(CacheEntry::new(key, serde_json::json!(1), None, 1000, now))
            .await
            .unwrap();
    }

    let removed = cache.delete_prefix("/api/trades").await.unwrap();
    assert_eq!(removed, 2);
    assert_eq!(cache.count().await.unwrap(), 1);
    assert!(cache.get("/api/checklists").await.unwrap().is_some());
}

#[tokio::test]
async fn test_cache_store_prunes_old_entries() {
    let store = open_store();
    let cache = HttpCacheStore::new(Arc::clone(&store.pool), store.writer.clone());

    let now = Utc::now();
    cache
        .put(CacheEntry::new(
            "/api/old",
            serde_json::json!(1),
            None,
            1000,
            now - Duration::days(10),
        ))
        .await
        .unwrap();
    cache
        .put(CacheEntry::new(
            "/api/new",
            serde_json::json!(2),
            None,
            1000,
            now,
        ))
        .await
        .unwrap();

    let removed = cache
        .prune_older_than(now - Duration::days(7))
        .await
        .unwrap();

    assert_eq!(removed, 1);
    assert!(cache.get("/api/old").await.unwrap().is_none());
    assert!(cache.get("/api/new").await.unwrap().is_some());
}
