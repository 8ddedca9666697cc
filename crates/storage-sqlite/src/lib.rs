//! SQLite storage implementation for Tradebook.
//!
//! This crate is the persistent local store of the offline data layer. It
//! provides all database-related functionality using Diesel ORM with SQLite:
//! - Connection pooling with WAL/busy-timeout pragmas
//! - Embedded migrations
//! - A serial write actor so every mutation runs on one connection
//! - Repository implementations for the trait contracts in `tradebook-core`:
//!   trades, user profiles, the pending-sync queue, the persistent cache
//!   tier, and settings
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies
//! exist. All other crates (`core`, `api-cache`, `sync`, `gateway`) are
//! database-agnostic and work with traits.
//!
//! ```text
//!   api-cache      sync       gateway
//!        │           │           │
//!        └───────────┼───────────┘
//!                    │  (core traits)
//!                    ▼
//!          storage-sqlite (this crate)
//!                    │
//!                    ▼
//!                SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;

mod utils;

// Repository implementations
pub mod http_cache;
pub mod pending_sync;
pub mod settings;
pub mod trades;
pub mod users;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export from tradebook-core for convenience
pub use tradebook_core::errors::{DatabaseError, Error, Result};
