//! Tradebook Core - Domain entities, services, and traits.
//!
//! This crate contains the core logic of the Tradebook offline data layer.
//! It is database-agnostic and defines traits that are implemented by the
//! `storage-sqlite`, `api-cache`, `sync`, and `gateway` crates.

pub mod cache;
pub mod connectivity;
pub mod constants;
pub mod errors;
pub mod events;
pub mod scheduler;
pub mod settings;
pub mod sync;
pub mod trades;
pub mod users;
pub mod utils;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
