mod check_cmd;
mod config;
mod env_cmd;
mod expand_cmd;
mod resolver;
mod terminal_output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use envforge_config::EnvforgeConfig;
use envforge_core::EnvironmentRequest;
use envforge_render::{OutputFormat, RenderOptions, Renderer};
use logging::{init_logger, LoggerOptions};

use config::Config;
use resolver::Resolver;

#[derive(Parser)]
#[command(name = "envforge")]
#[command(about = "envforge: layered configuration resolution")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $ENVFORGE_CONFIG_DIR/config.yaml or ~/.envforge/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Extra table data file, consulted before configured repositories
    #[arg(long = "data", global = true)]
    data: Vec<PathBuf>,

    /// Deadline for one resolution, in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct RequestArgs {
    /// Application name, or a comma-separated list
    name: String,
    /// Profile, or a comma-separated list
    profiles: String,
    /// Label, or a comma-separated list
    label: Option<String>,
}

impl RequestArgs {
    fn request(&self) -> Result<EnvironmentRequest> {
        Ok(EnvironmentRequest::new(
            &self.name,
            &self.profiles,
            self.label.as_deref(),
        )?)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved environment as JSON
    Env(RequestArgs),
    /// Render the merged environment as a document
    Render {
        #[command(flatten)]
        request: RequestArgs,
        /// properties, json or yaml
        #[arg(long, default_value = "yaml")]
        format: OutputFormat,
        /// Leave ${...} placeholders unresolved
        #[arg(long)]
        no_resolve: bool,
    },
    /// Show the lookup keys a request expands to
    Expand(RequestArgs),
    /// Validate configuration and repositories
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Config::from_env();
    if cli.config.is_some() {
        settings.config_path = cli.config.clone();
    }
    if let Some(ms) = cli.timeout_ms {
        settings.timeout_ms = ms;
    }

    let config_file = settings.config_file();
    let (config, report) = envforge_config::load_and_prepare(&config_file).await?;

    init_logger(&logger_options(&config, &settings));
    report.log();
    info!(config = %config_file.display(), "Starting envforge");

    let redact = config
        .logging
        .as_ref()
        .and_then(|l| l.redact_sensitive)
        .unwrap_or(true);

    match cli.command {
        Commands::Check => check_cmd::run(&config_file, &config, &report).await?,
        Commands::Env(args) => {
            let resolver = Resolver::load(&config, &cli.data, settings.timeout()).await?;
            env_cmd::run_env(&resolver, &args.request()?, redact).await?;
        }
        Commands::Render {
            request,
            format,
            no_resolve,
        } => {
            let resolver = Resolver::load(&config, &cli.data, settings.timeout()).await?;
            let renderer = Renderer::new(render_options(&config, no_resolve));
            env_cmd::run_render(&resolver, &renderer, &request.request()?, format, redact).await?;
        }
        Commands::Expand(args) => {
            let resolver = Resolver::load(&config, &cli.data, settings.timeout()).await?;
            expand_cmd::run(&resolver, &args.request()?)?;
        }
    }

    Ok(())
}

fn logger_options(config: &EnvforgeConfig, settings: &Config) -> LoggerOptions {
    let logging = config.logging.clone().unwrap_or_default();
    LoggerOptions {
        level: logging
            .level
            .unwrap_or_else(|| envforge_config::defaults::DEFAULT_LOG_LEVEL.to_string()),
        log_dir: logging.dir,
        json_console: settings.log_json,
    }
}

fn render_options(config: &EnvforgeConfig, no_resolve: bool) -> RenderOptions {
    let output = config.output.clone().unwrap_or_default();
    let defaults = RenderOptions::default();
    RenderOptions {
        strip_document: output.strip_document.unwrap_or(defaults.strip_document),
        resolve_placeholders: !no_resolve
            && output
                .resolve_placeholders
                .unwrap_or(defaults.resolve_placeholders),
    }
}
