use serde::{Deserialize, Serialize};

/// A single audit log entry representing one validation-gate event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: uuid::Uuid,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub event_type: AuditEventType,
    pub source: AuditSource,
    /// Free-form details.  Values echoed here must be the *sanitized*
    /// rendering, never the raw submission text.
    pub details: serde_json::Value,
}

impl AuditEntry {
    /// Create a new `AuditEntry` with an auto-generated UUID v4 and the
    /// current UTC timestamp.  The caller supplies the event type, source,
    /// and free-form details JSON value.
    pub fn new(
        event_type: AuditEventType,
        source: AuditSource,
        details: serde_json::Value,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            timestamp: chrono::Utc::now(),
            event_type,
            source,
            details,
        }
    }
}

/// The category of audit event being recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    SubmissionReceived,
    SubmissionAccepted,
    SubmissionRejected,
    ThreatDetected,
    ProfileLoaded,
    ProcessStarted,
    ProcessStopped,
}

/// Identifies the component and optional contextual metadata for the event
/// source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditSource {
    pub component: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AuditSource {
    /// Convenience constructor that only requires the component name.  All
    /// optional fields default to `None`.
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            form: None,
            field: None,
        }
    }

    /// Attach the form profile name, consuming and returning `self` for
    /// builder-style usage.
    pub fn with_form(mut self, form: impl Into<String>) -> Self {
        self.form = Some(form.into());
        self
    }

    /// Attach the offending field name.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_serializes_with_snake_case_event_type() {
        let entry = AuditEntry::new(
            AuditEventType::SubmissionRejected,
            AuditSource::new("gate").with_form("customer-form"),
            serde_json::json!({"errors": 1}),
        );
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"submission_rejected\""));
        assert!(json.contains("\"customer-form\""));
        // Unset optional source fields are omitted entirely.
        assert!(!json.contains("\"field\""));
    }

    #[test]
    fn entries_get_distinct_ids() {
        let a = AuditEntry::new(
            AuditEventType::ProcessStarted,
            AuditSource::new("gate"),
            serde_json::Value::Null,
        );
        let b = AuditEntry::new(
            AuditEventType::ProcessStarted,
            AuditSource::new("gate"),
            serde_json::Value::Null,
        );
        assert_ne!(a.id, b.id);
    }
}
