//! Resolution Event Logger
//!
//! Structured resolution events written through `tracing` on the
//! `resolution_events` target, one entry per event.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ResolutionEvent {
    Resolved {
        application: String,
        profiles: String,
        label: Option<String>,
        sources: Vec<String>,
    },
    Rendered {
        format: String,
        keys: usize,
    },
    Failed {
        error_msg: String,
    },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub request_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub event: ResolutionEvent,
}

impl EventLogEntry {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Emits resolution events for one request.
#[derive(Debug, Clone, Copy)]
pub struct EventLogger {
    request_id: Uuid,
}

impl Default for EventLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLogger {
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn entry(&self, mut event: ResolutionEvent) -> EventLogEntry {
        if let ResolutionEvent::Failed { error_msg } = &mut event {
            *error_msg = redact_sensitive_data(error_msg);
        }
        EventLogEntry {
            request_id: self.request_id,
            timestamp: Utc::now(),
            event,
        }
    }

    pub fn log_event(&self, event: ResolutionEvent) {
        let entry = self.entry(event);
        info!(target: "resolution_events", event = %entry.to_json(), "Resolution event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_serializes_with_tag() {
        let logger = EventLogger::new();
        let entry = logger.entry(ResolutionEvent::Rendered {
            format: "yaml".into(),
            keys: 3,
        });
        let value: serde_json::Value = serde_json::from_str(&entry.to_json()).unwrap();
        assert_eq!(value["event"]["type"], "Rendered");
        assert_eq!(value["event"]["keys"], 3);
        assert_eq!(value["request_id"], logger.request_id().to_string());
    }

    #[test]
    fn test_failure_message_redacted() {
        let entry = EventLogger::new().entry(ResolutionEvent::Failed {
            error_msg: "cannot reach https://u:pw@host/repo".into(),
        });
        let ResolutionEvent::Failed { error_msg } = entry.event else {
            panic!("expected failure event");
        };
        assert!(!error_msg.contains(":pw@"));
    }
}
