//! Cross-context message shapes.
//!
//! These are the wire formats exchanged between the application tabs and
//! the interception layer, tagged by a `type` field.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Commands the application sends to the gateway.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GatewayCommand {
    /// Force immediate activation of a freshly installed version.
    SkipWaiting,
    /// Ask for the running version; answered over the reply channel.
    GetVersion,
    /// Opportunistically cache a single trade's API response.
    CacheTrade { trade: Value },
}

/// Direct reply to a command, when one is expected.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandReply {
    pub version: String,
}

/// Messages the gateway broadcasts to every connected tab.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// A new version finished activating; tabs should reload.
    SwActivated { version: String },
    /// A deferred sync finished.
    SyncComplete { sync_type: String },
    /// The user acted on a system notification.
    NotificationClicked { action: String, data: Value },
}
