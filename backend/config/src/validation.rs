//! Config validation: schema checks with user-friendly error messages.

use crate::schema::EnvforgeConfig;
use std::collections::HashSet;
use thiserror::Error;

const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Emit every finding through `tracing`.
    pub fn log(&self) {
        for warning in &self.warnings {
            tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
        }
        for error in &self.errors {
            tracing::error!(path = %error.path, message = %error.message, "Config error");
        }
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &EnvforgeConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_repositories(config, &mut report);
    validate_logging(config, &mut report);
    report
}

fn validate_repositories(config: &EnvforgeConfig, report: &mut ValidationReport) {
    if config.repositories.is_empty() {
        report.warn("repositories", "No repositories configured; every environment will be empty");
    }

    let mut names = HashSet::new();
    for (i, repo) in config.repositories.iter().enumerate() {
        let path = format!("repositories[{i}]");
        if repo.data_file.as_os_str().is_empty() {
            report.error(format!("{path}.dataFile"), "dataFile cannot be empty");
        } else if !repo.data_file.exists() {
            report.warn(
                format!("{path}.dataFile"),
                format!("Data file {} does not exist", repo.data_file.display()),
            );
        }
        if let Some(label) = &repo.default_label {
            if label.trim().is_empty() || label.trim() == "," {
                report.error(format!("{path}.defaultLabel"), "defaultLabel cannot be blank");
            }
        }
        if !names.insert(repo.display_name()) {
            report.warn(
                format!("{path}.name"),
                format!("Duplicate repository name '{}'", repo.display_name()),
            );
        }
    }
}

fn validate_logging(config: &EnvforgeConfig, report: &mut ValidationReport) {
    let Some(logging) = &config.logging else { return };
    if let Some(level) = &logging.level {
        if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
            report.error(
                "logging.level",
                format!("Unknown log level '{level}'. Use one of: {}", LOG_LEVELS.join(", ")),
            );
        }
    }
}
