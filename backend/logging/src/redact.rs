//! Log Redaction Layer
//!
//! Masks property values whose keys look like credentials, and scrubs bearer
//! tokens and passwords embedded in URLs from free text prior to logging.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

pub const REDACTED: &str = "******";

static SENSITIVE_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(password|passwd|secret|token|credentials?|api[-_.]?key|private[-_.]?key)$").unwrap()
});
static URL_PASSWORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(://[^:/@\s]+:)[^@/\s]+@").unwrap());
static BEARER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Bearer\s+[a-zA-Z0-9\-\._~+/]+=*").unwrap());

/// Whether the last segment of a property key names a secret.
pub fn is_sensitive_key(key: &str) -> bool {
    let last = key.rsplit(|c: char| c == '.' || c == '[').next().unwrap_or(key);
    SENSITIVE_KEY_RE.is_match(last.trim_end_matches(']'))
}

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = URL_PASSWORD_RE.replace_all(input, format!("${{1}}{REDACTED}@"));
    BEARER_RE
        .replace_all(&redacted, "[REDACTED_TOKEN]")
        .to_string()
}

/// Copy of `properties` with sensitive values masked.
pub fn redact_properties(properties: &Map<String, Value>) -> Map<String, Value> {
    properties
        .iter()
        .map(|(key, value)| {
            let masked = match value {
                Value::Null => Value::Null,
                _ if is_sensitive_key(key) => Value::String(REDACTED.to_string()),
                Value::String(s) => Value::String(redact_sensitive_data(s)),
                other => other.clone(),
            };
            (key.clone(), masked)
        })
        .collect()
}
