//! Telemetry and structured logging components for envforge.
//!
//! Handles log redaction, JSON output generation, file rotation, and resolution event logging.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EventLogEntry, EventLogger, ResolutionEvent};
pub use logger::{init_logger, LoggerOptions};
pub use redact::{is_sensitive_key, redact_properties, redact_sensitive_data, REDACTED};
