//! Application settings models.

use serde::{Deserialize, Serialize};

/// User-scoped application settings persisted in the local store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub theme: String,
    pub base_currency: String,
    pub notifications_enabled: bool,
    pub sync_enabled: bool,
    /// Stable identifier of this installation.
    pub instance_id: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: "light".to_string(),
            base_currency: "USD".to_string(),
            notifications_enabled: false,
            sync_enabled: true,
            instance_id: String::new(),
        }
    }
}

/// Partial settings update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub theme: Option<String>,
    pub base_currency: Option<String>,
    pub notifications_enabled: Option<bool>,
    pub sync_enabled: Option<bool>,
}
