//! Trades module - domain models, services, and traits.

mod trades_model;
mod trades_service;
mod trades_traits;


// Re-export the public interface
pub use trades_model::{
    filter_and_sort, NewTrade, Trade, TradeDirection, TradeFilters, TradeOutcome, TradeUpdate,
};
pub use trades_service::TradeService;
pub use trades_traits::{TradeRepositoryTrait, TradeServiceTrait};
