//! `envforge check`: validate configuration and try every repository.

use std::path::Path;

use anyhow::{bail, Result};

use envforge_config::{EnvforgeConfig, ValidationReport};
use envforge_repository::load_table;

use crate::resolver::table_settings;
use crate::terminal_output::{note_error, note_success, note_warn, render_table, Column};

pub async fn run(config_file: &Path, config: &EnvforgeConfig, report: &ValidationReport) -> Result<()> {
    println!("Config file: {}", config_file.display());
    let vars = envforge_config::collect_referenced_vars(
        &envforge_config::load_config_value(config_file).await?,
    );
    if !vars.is_empty() {
        println!("Environment variables: {}", vars.join(", "));
    }
    println!();

    for warning in &report.warnings {
        note_warn(&format!("{}: {}", warning.path, warning.message));
    }
    for error in &report.errors {
        note_error(&format!("{}: {}", error.path, error.message));
    }

    let mut failures = report.errors.len();
    let mut rows = Vec::new();
    for repo in &config.repositories {
        let status = match load_table(&repo.data_file, table_settings(repo)).await {
            Ok(table) => format!("{} rows", table.rows().len()),
            Err(e) => {
                failures += 1;
                format!("error: {e:#}")
            }
        };
        rows.push(vec![
            repo.display_name(),
            repo.order.unwrap_or(0).to_string(),
            repo.default_label.clone().unwrap_or_default(),
            repo.data_file.display().to_string(),
            status,
        ]);
    }

    if !rows.is_empty() {
        let columns = [
            Column::left("Repository"),
            Column::right("Order"),
            Column::left("Label"),
            Column::left("Data file"),
            Column::left("Status"),
        ];
        println!("\n{}", render_table(&columns, &rows));
    }

    if failures > 0 {
        bail!("Configuration check failed with {failures} problem(s)");
    }
    note_success("Configuration is valid");
    Ok(())
}
