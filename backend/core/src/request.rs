//! Validated resolution requests.

use crate::error::{EngineError, Result};
use crate::types::normalize;

/// One (application, profile, label) request after normalization.
///
/// `application` and `profile` may be comma-separated lists. An absent or
/// blank label means "use the repository's default label".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentRequest {
    pub application: String,
    pub profile: String,
    pub label: Option<String>,
}

impl EnvironmentRequest {
    /// Normalize `(_)` escapes and reject path traversal attempts.
    pub fn new(application: &str, profile: &str, label: Option<&str>) -> Result<Self> {
        check_location("application", application)?;
        check_location("profile", profile)?;
        if let Some(label) = label {
            check_location("label", label)?;
        }
        if application.trim().is_empty() {
            return Err(EngineError::InvalidRequest(
                "application name must not be empty".to_string(),
            ));
        }

        Ok(Self {
            application: normalize(application),
            profile: profile.to_string(),
            label: label
                .filter(|l| !l.trim().is_empty())
                .map(normalize),
        })
    }

    pub fn label_or_empty(&self) -> &str {
        self.label.as_deref().unwrap_or("")
    }
}

fn check_location(field: &str, part: &str) -> Result<()> {
    let decoded = decode_separators(part);
    if decoded.contains("..") || decoded.contains('\\') || decoded.contains('\0') {
        return Err(EngineError::InvalidRequest(format!(
            "invalid {field}: {part:?}"
        )));
    }
    Ok(())
}

/// Decode the percent escapes that can smuggle separators past routing.
fn decode_separators(part: &str) -> String {
    if !part.contains('%') {
        return part.to_string();
    }
    part.to_ascii_lowercase()
        .replace("%2e", ".")
        .replace("%2f", "/")
        .replace("%5c", "\\")
        .replace("%00", "\0")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_name_and_label() {
        let req = EnvironmentRequest::new("team(_)app", "dev", Some("feature(_)x")).unwrap();
        assert_eq!(req.application, "team/app");
        assert_eq!(req.label.as_deref(), Some("feature/x"));
    }

    #[test]
    fn test_blank_label_becomes_none() {
        let req = EnvironmentRequest::new("app", "dev", Some("  ")).unwrap();
        assert!(req.label.is_none());
        assert_eq!(req.label_or_empty(), "");
    }

    #[test]
    fn test_rejects_traversal() {
        for bad in ["../etc", "%2e%2e/secret", "a\\b", "%2E%2E"] {
            let err = EnvironmentRequest::new(bad, "dev", None).unwrap_err();
            assert!(matches!(err, EngineError::InvalidRequest(_)), "{bad}");
        }
        assert!(EnvironmentRequest::new("app", "dev", Some("..")).is_err());
    }

    #[test]
    fn test_rejects_empty_application() {
        assert!(matches!(
            EnvironmentRequest::new("", "dev", None),
            Err(EngineError::InvalidRequest(_))
        ));
    }
}
