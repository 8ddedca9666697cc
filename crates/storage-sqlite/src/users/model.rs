//! Database model for user profiles.

use diesel::prelude::*;

use crate::errors::StorageError;
use crate::utils::{format_utc, parse_utc};
use tradebook_core::users::UserProfile;

#[derive(Queryable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::user_profiles)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserProfileDB {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<UserProfile> for UserProfileDB {
    fn from(user: UserProfile) -> Self {
        Self {
            id: user.id,
            email: user.email,
            display_name: user.display_name,
            created_at: format_utc(user.created_at),
            updated_at: format_utc(user.updated_at),
        }
    }
}

impl TryFrom<UserProfileDB> for UserProfile {
    type Error = StorageError;

    fn try_from(db: UserProfileDB) -> Result<Self, Self::Error> {
        Ok(Self {
            created_at: parse_utc(&db.created_at)?,
            updated_at: parse_utc(&db.updated_at)?,
            id: db.id,
            email: db.email,
            display_name: db.display_name,
        })
    }
}
