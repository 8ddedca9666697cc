pub mod settings_model;
pub mod settings_traits;

pub use settings_model::*;
pub use settings_traits::SettingsRepositoryTrait;
