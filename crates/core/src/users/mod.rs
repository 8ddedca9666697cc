//! Users module - local profile mirror of the authenticated user.

mod users_model;
mod users_traits;

pub use users_model::{NewUserProfile, UserProfile};
pub use users_traits::UserRepositoryTrait;
