//! Config file location and loading.

use crate::schema::EnvforgeConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Default config file name within the config directory.
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Resolve the envforge config directory.
/// Priority: `ENVFORGE_CONFIG_DIR` env > `~/.envforge/`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("ENVFORGE_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    match dirs::home_dir() {
        Some(home) => home.join(".envforge"),
        None => PathBuf::from(".envforge"),
    }
}

/// Resolve the full path to the main config file.
pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Read the raw YAML config as a JSON value tree.
///
/// Returns an empty object if the file doesn't exist.
pub async fn load_config_value(path: &Path) -> Result<serde_json::Value> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(serde_json::Value::Object(Default::default()));
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let value: Option<serde_json::Value> = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(value.unwrap_or_else(|| serde_json::Value::Object(Default::default())))
}

/// Load and parse the config from disk without env substitution.
pub async fn load_config(path: &Path) -> Result<EnvforgeConfig> {
    let value = load_config_value(path).await?;
    serde_json::from_value(value)
        .with_context(|| format!("Invalid config at: {}", path.display()))
}

/// Resolve relative repository data files against the config file's directory.
pub fn resolve_relative_paths(mut config: EnvforgeConfig, path: &Path) -> EnvforgeConfig {
    let Some(base) = path.parent() else {
        return config;
    };
    for repo in &mut config.repositories {
        if repo.data_file.is_relative() {
            repo.data_file = base.join(&repo.data_file);
        }
    }
    if let Some(dir) = config.logging.as_mut().and_then(|l| l.dir.as_mut()) {
        if dir.is_relative() {
            *dir = base.join(&*dir);
        }
    }
    config
}
