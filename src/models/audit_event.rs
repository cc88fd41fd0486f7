use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A recorded security- or action-relevant occurrence: who did what, and when.
///
/// The event date is fixed when the event is saved. Stores expose no update
/// operation, so the only way an event leaves the store is the retention sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    /// Unique identifier assigned by the store
    pub id: Uuid,
    /// Identifier of the acting subject (usually a login)
    pub principal: String,
    /// Kind of event (e.g., "AUTHENTICATION_SUCCESS")
    pub event_type: String,
    /// When the event occurred
    pub event_date: DateTime<Utc>,
    /// Additional key/value data attached to the event
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

/// Input for recording a new audit event
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuditEvent {
    #[validate(length(min = 1, max = 100))]
    pub principal: String,
    #[validate(length(min = 1, max = 255))]
    pub event_type: String,
    /// When the event occurred. Defaults to the time the input is parsed.
    #[serde(default = "Utc::now")]
    pub event_date: DateTime<Utc>,
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

impl CreateAuditEvent {
    /// Build an event input dated now.
    pub fn now(principal: impl Into<String>, event_type: impl Into<String>) -> Self {
        Self {
            principal: principal.into(),
            event_type: event_type.into(),
            event_date: Utc::now(),
            data: BTreeMap::new(),
        }
    }

    /// Attach a data entry.
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

/// Query parameters for listing audit events
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditEventQuery {
    /// Filter by principal
    pub principal: Option<String>,
    /// Filter by event type
    pub event_type: Option<String>,
    /// Start of time range (inclusive)
    pub from: Option<DateTime<Utc>>,
    /// End of time range (exclusive)
    pub to: Option<DateTime<Utc>>,
    /// Maximum number of results to return
    pub limit: Option<i64>,
}

impl AuditEventQuery {
    pub fn for_principal(principal: impl Into<String>) -> Self {
        Self {
            principal: Some(principal.into()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_validation_rejects_empty_principal() {
        let input = CreateAuditEvent::now("", "AUTHENTICATION_SUCCESS");
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_create_validation_rejects_long_principal() {
        let input = CreateAuditEvent::now("x".repeat(101), "AUTHENTICATION_SUCCESS");
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_create_validation_accepts_valid_input() {
        let input = CreateAuditEvent::now("admin", "AUTHENTICATION_SUCCESS")
            .with_data("remoteAddress", "127.0.0.1");
        assert!(input.validate().is_ok());
        assert_eq!(input.data.get("remoteAddress").map(String::as_str), Some("127.0.0.1"));
    }

    #[test]
    fn test_create_input_defaults_event_date_to_now() {
        let before = Utc::now();
        let input: CreateAuditEvent = serde_json::from_value(serde_json::json!({
            "principal": "admin",
            "eventType": "AUTHENTICATION_SUCCESS"
        }))
        .unwrap();
        assert!(input.event_date >= before);
        assert!(input.data.is_empty());
    }

    #[test]
    fn test_audit_event_serializes_camel_case() {
        let event = AuditEvent {
            id: Uuid::nil(),
            principal: "admin".to_string(),
            event_type: "AUTHENTICATION_SUCCESS".to_string(),
            event_date: DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            data: BTreeMap::new(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["eventType"], "AUTHENTICATION_SUCCESS");
        assert!(json.get("eventDate").is_some());
    }
}
