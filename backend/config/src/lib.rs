//! `envforge-config`: runtime configuration for envforge.
//!
//! Provides:
//! - Typed config schema (repositories, output, logging)
//! - YAML loading from the config directory
//! - `${ENV_VAR}` substitution
//! - Default value application
//! - Validation report

pub mod defaults;
pub mod env;
pub mod io;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{collect_referenced_vars, resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_config, load_config_value, resolve_relative_paths};
pub use schema::{EnvforgeConfig, LoggingConfig, OutputConfig, RepositoryConfig};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{Context, Result};
use std::path::Path;

/// Load, substitute env vars, apply defaults and validate a config file.
///
/// This is the main entry point for loading a config at runtime. The report is
/// returned rather than logged since logging is configured from the result.
pub async fn load_and_prepare(path: &Path) -> Result<(EnvforgeConfig, ValidationReport)> {
    let value = load_config_value(path).await?;
    let value = resolve_env_vars(&value).context("Failed to resolve env vars in config")?;

    let config: EnvforgeConfig = serde_json::from_value(value)
        .with_context(|| format!("Invalid config at: {}", path.display()))?;
    let config = resolve_relative_paths(apply_all_defaults(config), path);

    let report = validate(&config);
    Ok((config, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn prepares_config_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());
        std::fs::write(
            &path,
            "repositories:\n  - dataFile: props.yaml\n    order: 1\noutput:\n  acceptEmpty: false\n",
        )
        .unwrap();

        let (cfg, report) = load_and_prepare(&path).await.unwrap();
        assert!(report.is_valid());
        let repo = &cfg.repositories[0];
        assert_eq!(repo.data_file, dir.path().join("props.yaml"));
        assert_eq!(repo.default_label.as_deref(), Some("master"));
        let output = cfg.output.unwrap();
        assert_eq!(output.accept_empty, Some(false));
        assert_eq!(output.strip_document, Some(true));
    }
}
