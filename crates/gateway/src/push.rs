//! Push payload parsing and notification rendering.

use log::{info, warn};
use serde_json::Value;

use tradebook_core::errors::Result;

/// Fallback title when a payload is missing or malformed.
const DEFAULT_TITLE: &str = "Tradebook";
/// Fallback body when a payload is missing or malformed.
const DEFAULT_BODY: &str = "You have new trading activity.";

/// A notification ready to render.
#[derive(Clone, Debug, PartialEq)]
pub struct PushNotification {
    pub title: String,
    pub body: String,
    pub data: Value,
}

impl Default for PushNotification {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            body: DEFAULT_BODY.to_string(),
            data: Value::Null,
        }
    }
}

/// Parse an inbound push payload defensively.
///
/// Any malformed payload (invalid JSON, wrong shape, missing fields) falls
/// back to the default notification instead of failing - a push must never
/// crash the interception layer.
pub fn parse_push_payload(raw: Option<&str>) -> PushNotification {
    let Some(raw) = raw else {
        return PushNotification::default();
    };

    let parsed: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => {
            warn!("Malformed push payload, using defaults: {}", err);
            return PushNotification::default();
        }
    };

    let defaults = PushNotification::default();
    PushNotification {
        title: parsed
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or(&defaults.title)
            .to_string(),
        body: parsed
            .get("body")
            .and_then(Value::as_str)
            .unwrap_or(&defaults.body)
            .to_string(),
        data: parsed.get("data").cloned().unwrap_or(Value::Null),
    }
}

/// Renders system notifications.
pub trait NotifierTrait: Send + Sync {
    fn show(&self, notification: &PushNotification) -> Result<()>;
}

/// Notifier that only logs - for headless environments and tests.
#[derive(Clone, Copy, Default)]
pub struct LogNotifier;

impl NotifierTrait for LogNotifier {
    fn show(&self, notification: &PushNotification) -> Result<()> {
        info!("Notification: {} - {}", notification.title, notification.body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_well_formed_payload() {
        let notification = parse_push_payload(Some(
            r#"{"title": "Trade filled", "body": "ES long filled at 4510.25", "data": {"tradeId": "t1"}}"#,
        ));

        assert_eq!(notification.title, "Trade filled");
        assert_eq!(notification.body, "ES long filled at 4510.25");
        assert_eq!(notification.data, json!({"tradeId": "t1"}));
    }

    #[test]
    fn test_malformed_json_falls_back_to_defaults() {
        let notification = parse_push_payload(Some("{not json"));
        assert_eq!(notification, PushNotification::default());
    }

    #[test]
    fn test_missing_fields_fall_back_individually() {
        let notification = parse_push_payload(Some(r#"{"title": "Only a title"}"#));
        assert_eq!(notification.title, "Only a title");
        assert_eq!(notification.body, DEFAULT_BODY);
        assert_eq!(notification.data, Value::Null);
    }

    #[test]
    fn test_absent_payload_uses_defaults() {
        assert_eq!(parse_push_payload(None), PushNotification::default());
    }

    #[test]
    fn test_non_object_payload_uses_defaults() {
        let notification = parse_push_payload(Some("42"));
        assert_eq!(notification.title, DEFAULT_TITLE);
        assert_eq!(notification.body, DEFAULT_BODY);
    }
}
