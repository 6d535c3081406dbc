//! Loading property tables from YAML data files.
//!
//! A data file may list raw `rows`, nested `sources`, or both:
//!
//! ```yaml
//! rows:
//!   - { application: app, profile: prod, label: master, key: server.port, value: 80 }
//! sources:
//!   - application: app
//!     profile: dev          # omit for a profile-less source
//!     label: master         # omit for the table's default label
//!     properties:
//!       server:
//!         port: 8080
//! ```
//!
//! Nested `properties` are flattened into dotted/indexed keys.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::fs;
use tracing::info;

use envforge_core::flatten;

use crate::table::{PropertyRow, PropertyTable, TableSettings};

/// On-disk shape of a table data file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableFile {
    #[serde(default)]
    pub rows: Vec<PropertyRow>,
    #[serde(default)]
    pub sources: Vec<SourceEntry>,
}

/// A nested document stored for one lookup triple.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceEntry {
    pub application: String,
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    pub properties: Value,
}

impl TableFile {
    /// Expand into rows, sources after raw rows.
    pub fn into_rows(self, default_label: &str) -> Vec<PropertyRow> {
        let mut rows = self.rows;
        for entry in self.sources {
            let label = entry.label.unwrap_or_else(|| default_label.to_string());
            for (key, value) in flatten(&entry.properties) {
                rows.push(PropertyRow {
                    application: entry.application.clone(),
                    profile: entry.profile.clone(),
                    label: label.clone(),
                    key,
                    value,
                });
            }
        }
        rows
    }
}

/// Parse a table data file from YAML text.
pub fn parse_table(
    name: &str,
    yaml: &str,
    settings: TableSettings,
) -> Result<PropertyTable> {
    let file: TableFile = serde_yaml::from_str(yaml)
        .with_context(|| format!("Failed to parse property table YAML for: {name}"))?;
    let rows = file.into_rows(&settings.default_label);
    Ok(PropertyTable::new(name, settings).with_rows(rows))
}

/// Load a property table from disk.
pub async fn load_table(path: &Path, settings: TableSettings) -> Result<PropertyTable> {
    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read property table: {}", path.display()))?;

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("table")
        .to_string();
    let table = parse_table(&name, &raw, settings)
        .with_context(|| format!("Invalid property table at: {}", path.display()))?;

    info!(path = %path.display(), rows = table.rows().len(), "Loaded property table");
    Ok(table)
}
