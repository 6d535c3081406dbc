use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Default upper bound for one resolution.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Process-level settings taken from the environment before any config file
/// is read. Command-line flags override them.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Explicit config file; the config directory's `config.yaml` otherwise
    pub config_path: Option<PathBuf>,
    /// Resolution deadline in milliseconds
    pub timeout_ms: u64,
    /// JSON console logs
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            log_json: false,
        }
    }
}

impl Config {
    /// Load settings from environment variables with sensible defaults.
    pub fn from_env() -> Self {
        Self {
            config_path: std::env::var("ENVFORGE_CONFIG").ok().map(PathBuf::from),
            timeout_ms: std::env::var("ENVFORGE_TIMEOUT_MS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_MS),
            log_json: std::env::var("ENVFORGE_LOG_JSON")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_path
            .clone()
            .unwrap_or_else(|| envforge_config::config_file_path(&envforge_config::config_dir()))
    }
}
