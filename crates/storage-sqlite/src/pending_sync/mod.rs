//! Pending sync queue persistence.

mod model;
mod repository;

pub use model::{NewPendingSyncItemDB, PendingSyncItemDB};
pub use repository::PendingSyncRepository;
