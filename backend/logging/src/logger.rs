//! Structured Logger
//!
//! Wraps `tracing` to provide console output, optional rolling NDJSON files,
//! and environment-based level control.

use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone)]
pub struct LoggerOptions {
    /// Fallback filter when `RUST_LOG` is unset.
    pub level: String,
    /// Rolling file directory; console only when `None`.
    pub log_dir: Option<PathBuf>,
    /// JSON console output instead of the human format.
    pub json_console: bool,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
            json_console: false,
        }
    }
}

/// Initialize the global structured logger.
///
/// Console output goes to stderr so rendered documents on stdout stay clean.
pub fn init_logger(options: &LoggerOptions) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&options.level));

    // Rolling file appender: writes NDJSON to `<dir>/envforge.log.YYYY-MM-DD`
    let file_layer = options.log_dir.as_ref().map(|dir| {
        let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, "envforge.log");
        fmt::layer()
            .json()
            .with_writer(file_appender)
            .with_ansi(false)
    });

    let (json_console, plain_console) = if options.json_console {
        let layer = fmt::layer().json().with_writer(std::io::stderr);
        (Some(layer), None)
    } else {
        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_ansi(true);
        (None, Some(layer))
    };

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(json_console)
        .with(plain_console)
        .with(file_layer)
        .try_init();
}
