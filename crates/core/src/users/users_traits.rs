//! Repository trait for user profiles.

use async_trait::async_trait;

use super::users_model::{NewUserProfile, UserProfile};
use crate::errors::Result;

/// Repository trait for the local user profile collection.
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    /// Insert a new profile.
    ///
    /// Fails with a unique-violation error when the email is already taken.
    async fn create(&self, new_user: NewUserProfile) -> Result<UserProfile>;

    /// Point read by id.
    fn get_by_id(&self, user_id: &str) -> Result<Option<UserProfile>>;

    /// Indexed lookup by email.
    fn get_by_email(&self, email: &str) -> Result<Option<UserProfile>>;
}
