//! Repository for application settings.

use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use super::model::AppSettingDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::app_settings::dsl::*;
use tradebook_core::errors::{DatabaseError, Error, Result};
use tradebook_core::settings::{Settings, SettingsRepositoryTrait, SettingsUpdate};

pub struct SettingsRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SettingsRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        SettingsRepository { pool, writer }
    }
}

fn replace_setting(
    conn: &mut SqliteConnection,
    key: &str,
    value: String,
) -> std::result::Result<(), StorageError> {
    diesel::replace_into(app_settings)
        .values(&AppSettingDB {
            setting_key: key.to_string(),
            setting_value: value,
        })
        .execute(conn)?;
    Ok(())
}

#[async_trait]
impl SettingsRepositoryTrait for SettingsRepository {
    fn get_settings(&self) -> Result<Settings> {
        let mut conn = get_connection(&self.pool)?;
        let all_settings: Vec<(String, String)> = app_settings
            .select((setting_key, setting_value))
            .load::<(String, String)>(&mut conn)
            .map_err(StorageError::from)?;

        let mut settings = Settings::default();

        for (key, value) in all_settings {
            match key.as_str() {
                "theme" => settings.theme = value,
                "base_currency" => settings.base_currency = value,
                "instance_id" => settings.instance_id = value,
                "notifications_enabled" => {
                    settings.notifications_enabled = value.parse().unwrap_or(false);
                }
                "sync_enabled" => {
                    settings.sync_enabled = value.parse().unwrap_or(true);
                }
                _ => {} // Ignore unknown settings
            }
        }

        Ok(settings)
    }

    async fn update_settings(&self, new_settings: &SettingsUpdate) -> Result<()> {
        let settings = new_settings.clone();
        self.writer
            .exec(move |conn| {
                if let Some(ref theme_value) = settings.theme {
                    replace_setting(conn, "theme", theme_value.clone())?;
                }
                if let Some(ref base_currency) = settings.base_currency {
                    replace_setting(conn, "base_currency", base_currency.clone())?;
                }
                if let Some(notifications_enabled) = settings.notifications_enabled {
                    replace_setting(
                        conn,
                        "notifications_enabled",
                        notifications_enabled.to_string(),
                    )?;
                }
                if let Some(sync_enabled) = settings.sync_enabled {
                    replace_setting(conn, "sync_enabled", sync_enabled.to_string())?;
                }

                Ok(())
            })
            .await
    }

    fn get_setting(&self, setting_key_param: &str) -> Result<String> {
        let mut conn = get_connection(&self.pool)?;
        let result = app_settings
            .filter(setting_key.eq(setting_key_param))
            .select(setting_value)
            .first(&mut conn);

        match result {
            Ok(value) => Ok(value),
            Err(diesel::result::Error::NotFound) => {
                // Return default values for known settings
                let default_value = match setting_key_param {
                    "theme" => "light",
                    "base_currency" => "USD",
                    "notifications_enabled" => "false",
                    "sync_enabled" => "true",
                    _ => {
                        return Err(Error::Database(DatabaseError::NotFound(format!(
                            "setting {setting_key_param}"
                        ))))
                    }
                };
                Ok(default_value.to_string())
            }
            Err(e) => Err(StorageError::from(e).into()),
        }
    }

    async fn update_setting(
        &self,
        setting_key_param: &str,
        setting_value_param: &str,
    ) -> Result<()> {
        let key = setting_key_param.to_string();
        let value = setting_value_param.to_string();

        self.writer
            .exec(move |conn| {
                replace_setting(conn, &key, value)?;
                Ok(())
            })
            .await
    }
}
