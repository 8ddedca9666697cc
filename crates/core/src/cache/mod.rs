//! API response cache domain - entry model, provenance, and the persistent
//! tier contract.

mod cache_model;
mod cache_traits;

pub use cache_model::{CacheEntry, CacheSource, CachedResponse};
pub use cache_traits::CacheStoreTrait;
