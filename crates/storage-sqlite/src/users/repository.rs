//! Repository for user profiles.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;

use super::model::UserProfileDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::user_profiles;
use tradebook_core::errors::{Error, Result};
use tradebook_core::users::{NewUserProfile, UserProfile, UserRepositoryTrait};

pub struct UserProfileRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl UserProfileRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl UserRepositoryTrait for UserProfileRepository {
    async fn create(&self, new_user: NewUserProfile) -> Result<UserProfile> {
        self.writer
            .exec(move |conn| {
                let user = UserProfile::from_new(new_user, Utc::now());
                let db_model: UserProfileDB = user.clone().into();

                // The unique email index turns duplicates into a
                // UniqueViolation via the error conversion.
                diesel::insert_into(user_profiles::table)
                    .values(&db_model)
                    .execute(conn)
                    .map_err(StorageError::from)?;

                Ok(user)
            })
            .await
    }

    fn get_by_id(&self, user_id: &str) -> Result<Option<UserProfile>> {
        let mut conn = get_connection(&self.pool)?;

        let result = user_profiles::table
            .find(user_id)
            .first::<UserProfileDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;

        result.map(TryInto::try_into).transpose().map_err(Error::from)
    }

    fn get_by_email(&self, email: &str) -> Result<Option<UserProfile>> {
        let mut conn = get_connection(&self.pool)?;

        let result = user_profiles::table
            .filter(user_profiles::email.eq(email))
            .first::<UserProfileDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;

        result.map(TryInto::try_into).transpose().map_err(Error::from)
    }
}
