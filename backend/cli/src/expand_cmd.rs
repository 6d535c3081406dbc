//! `envforge expand`: show the lookup keys a request fans out to.

use anyhow::Result;

use envforge_core::{EnvironmentRequest, KeyExpander, PropertySource};

use crate::resolver::Resolver;
use crate::terminal_output::{render_table, Column};

/// Rows of (repository, label, profile, application, source name) in fetch order.
pub fn lookup_rows(resolver: &Resolver, request: &EnvironmentRequest) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();
    for (repository, keys) in resolver.composite().lookup_keys(request)? {
        for lookup in keys.lookups() {
            rows.push(row(&repository, lookup.label, lookup.profile, lookup.application));
        }
    }
    Ok(rows)
}

fn row(repository: &str, label: &str, profile: Option<&str>, app: &str) -> Vec<String> {
    vec![
        repository.to_string(),
        label.to_string(),
        profile.unwrap_or("-").to_string(),
        app.to_string(),
        PropertySource::name_for(app, profile),
    ]
}

pub fn run(resolver: &Resolver, request: &EnvironmentRequest) -> Result<()> {
    let rows = lookup_rows(resolver, request)?;
    println!(
        "Requested profiles: {}",
        KeyExpander::requested_profiles(&request.profile).join(", ")
    );
    let columns = [
        Column::left("Repository"),
        Column::left("Label"),
        Column::left("Profile"),
        Column::left("Application"),
        Column::left("Source"),
    ];
    print!("{}", render_table(&columns, &rows));
    Ok(())
}
