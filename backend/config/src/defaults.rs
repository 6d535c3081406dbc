//! Config defaults: fills every unset field after loading.

use crate::schema::{EnvforgeConfig, LoggingConfig, OutputConfig};

/// Label used when a request names none.
pub const DEFAULT_LABEL: &str = "master";

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: EnvforgeConfig) -> EnvforgeConfig {
    let config = apply_repository_defaults(config);
    let config = apply_output_defaults(config);
    apply_logging_defaults(config)
}

fn apply_repository_defaults(mut config: EnvforgeConfig) -> EnvforgeConfig {
    for repo in &mut config.repositories {
        repo.order.get_or_insert(0);
        repo.default_label
            .get_or_insert_with(|| DEFAULT_LABEL.to_string());
        repo.fail_on_error.get_or_insert(true);
        repo.config_incomplete.get_or_insert(false);
    }
    config
}

fn apply_output_defaults(mut config: EnvforgeConfig) -> EnvforgeConfig {
    let output = config.output.get_or_insert_with(OutputConfig::default);
    output.strip_document.get_or_insert(true);
    output.accept_empty.get_or_insert(true);
    output.resolve_placeholders.get_or_insert(true);
    config
}

fn apply_logging_defaults(mut config: EnvforgeConfig) -> EnvforgeConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    if logging.level.is_none() {
        logging.level = Some(DEFAULT_LOG_LEVEL.to_string());
    }
    logging.redact_sensitive.get_or_insert(true);
    config
}
