//! Trade persistence.

mod model;
mod repository;

pub use model::TradeDB;
pub use repository::TradeRepository;
