//! In-memory property table.
//!
//! Rows carry `(application, profile, label, key, value)` exactly like a
//! relational `PROPERTIES` table. A property source is the ordered set of rows
//! matching one lookup triple; rows with no profile only answer the
//! profile-less fallback lookup.

use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use envforge_core::{PropertyMap, PropertySource, PropertySourceProvider, DEFAULT_LABEL};

use crate::error::RepositoryError;

/// One stored property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRow {
    pub application: String,
    #[serde(default)]
    pub profile: Option<String>,
    pub label: String,
    pub key: String,
    pub value: Value,
}

impl PropertyRow {
    pub fn new(
        application: impl Into<String>,
        profile: Option<&str>,
        label: impl Into<String>,
        key: impl Into<String>,
        value: Value,
    ) -> Self {
        Self {
            application: application.into(),
            profile: profile.map(str::to_string),
            label: label.into(),
            key: key.into(),
            value,
        }
    }

    fn matches(&self, application: &str, profile: Option<&str>, label: &str) -> bool {
        self.application == application && self.profile.as_deref() == profile && self.label == label
    }
}

/// Retrieval policy of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSettings {
    /// Propagate retrieval failures instead of skipping the source.
    pub fail_on_error: bool,
    /// Profile-less fallback lookups are not available.
    pub config_incomplete: bool,
    pub default_label: String,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            fail_on_error: true,
            config_incomplete: false,
            default_label: DEFAULT_LABEL.to_string(),
        }
    }
}

/// Property source provider backed by a list of rows.
#[derive(Debug)]
pub struct PropertyTable {
    name: String,
    rows: Vec<PropertyRow>,
    settings: TableSettings,
    available: AtomicBool,
}

impl PropertyTable {
    pub fn new(name: impl Into<String>, settings: TableSettings) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
            settings,
            available: AtomicBool::new(true),
        }
    }

    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_rows(mut self, rows: impl IntoIterator<Item = PropertyRow>) -> Self {
        self.rows.extend(rows);
        self
    }

    pub fn push(&mut self, row: PropertyRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[PropertyRow] {
        &self.rows
    }

    pub fn settings(&self) -> &TableSettings {
        &self.settings
    }

    /// Simulate the backing store going away (or coming back).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Rows matching one lookup triple, in insertion order.
    pub fn select(&self, application: &str, profile: Option<&str>, label: &str) -> PropertyMap {
        self.rows
            .iter()
            .filter(|row| row.matches(application, profile, label))
            .map(|row| (row.key.clone(), row.value.clone()))
            .collect()
    }
}

#[async_trait]
impl PropertySourceProvider for PropertyTable {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(
        &self,
        application: &str,
        profile: Option<&str>,
        label: &str,
    ) -> Result<Option<PropertySource>> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(self.name.clone()).into());
        }
        let source = self.select(application, profile, label);
        debug!(table = %self.name, application, ?profile, label, keys = source.len(), "Queried property table");
        if source.is_empty() {
            return Ok(None);
        }
        Ok(Some(PropertySource::new(
            PropertySource::name_for(application, profile),
            source,
        )))
    }

    fn fail_on_error(&self) -> bool {
        self.settings.fail_on_error
    }

    fn config_incomplete(&self) -> bool {
        self.settings.config_incomplete
    }

    fn default_label(&self) -> &str {
        &self.settings.default_label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table() -> PropertyTable {
        PropertyTable::new("test", TableSettings::default()).with_rows([
            PropertyRow::new("app", Some("prod"), "master", "server.port", json!(80)),
            PropertyRow::new("app", Some("prod"), "master", "server.host", json!("prod.local")),
            PropertyRow::new("app", Some("prod"), "v2", "server.port", json!(8080)),
            PropertyRow::new("app", None, "master", "server.port", json!(1)),
        ])
    }

    #[tokio::test]
    async fn test_fetch_matches_triple() {
        let source = table()
            .fetch("app", Some("prod"), "master")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(source.name, "app-prod");
        let keys: Vec<&str> = source.source.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["server.port", "server.host"]);
        assert_eq!(source.source["server.port"], 80);
    }

    #[tokio::test]
    async fn test_profileless_rows_only_match_null_profile() {
        let table = table();
        let fallback = table.fetch("app", None, "master").await.unwrap().unwrap();
        assert_eq!(fallback.name, "app");
        assert_eq!(fallback.source["server.port"], 1);
        assert!(table.fetch("app", Some("dev"), "master").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unavailable_table_errors() {
        let table = table();
        table.set_available(false);
        let err = table.fetch("app", None, "master").await.unwrap_err();
        assert!(err.to_string().contains("unavailable"));
        table.set_available(true);
        assert!(table.fetch("app", None, "master").await.is_ok());
    }

    #[test]
    fn test_default_settings() {
        let settings = TableSettings::default();
        assert!(settings.fail_on_error);
        assert!(!settings.config_incomplete);
        assert_eq!(settings.default_label, "master");
    }
}
