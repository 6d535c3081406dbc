//! Runtime configuration schema for envforge.
//!
//! Typed for serde YAML/JSON deserialization with camelCase field names.
//! Every field is optional on disk; see `defaults` for the filled-in values.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvforgeConfig {
    /// Table repositories consulted by composite resolution
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repositories: Vec<RepositoryConfig>,

    /// Rendering and acceptance settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputConfig>,

    /// Logging configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

// ---------------------------------------------------------------------------
// Repositories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryConfig {
    /// Display name; defaults to the data file stem
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// YAML table data file
    pub data_file: PathBuf,

    /// Lower orders take precedence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_label: Option<String>,

    /// Abort resolution on a failed fetch instead of skipping the source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_on_error: Option<bool>,

    /// Always prepend the `default` profile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_incomplete: Option<bool>,
}

impl RepositoryConfig {
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| {
            self.data_file
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("table")
                .to_string()
        })
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strip_document: Option<bool>,

    /// Allow environments with zero property sources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept_empty: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolve_placeholders: Option<bool>,
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    /// "error" | "warn" | "info" | "debug" | "trace"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Directory for rolling log files; console only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// Mask sensitive property values in log output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redact_sensitive: Option<bool>,
}
