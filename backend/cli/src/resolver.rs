//! Wiring from configuration to a composite resolver.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tracing::{debug, info};

use envforge_config::{EnvforgeConfig, RepositoryConfig};
use envforge_core::{CompositeResolver, Environment, EnvironmentRequest, SourceAggregator};
use envforge_repository::{load_table, PropertyTable, TableSettings};

/// Ordered repositories resolved together.
pub struct Resolver {
    composite: CompositeResolver,
    timeout: Duration,
}

/// Table settings for a configured repository; unset fields use table defaults.
pub fn table_settings(repo: &RepositoryConfig) -> TableSettings {
    let defaults = TableSettings::default();
    TableSettings {
        fail_on_error: repo.fail_on_error.unwrap_or(defaults.fail_on_error),
        config_incomplete: repo.config_incomplete.unwrap_or(defaults.config_incomplete),
        default_label: repo
            .default_label
            .clone()
            .unwrap_or(defaults.default_label),
    }
}

impl Resolver {
    /// Load every repository named by `config`, plus ad-hoc `data` files.
    ///
    /// Ad-hoc files take precedence over configured repositories, in the
    /// order given.
    pub async fn load(config: &EnvforgeConfig, data: &[PathBuf], timeout: Duration) -> Result<Self> {
        let accept_empty = config
            .output
            .as_ref()
            .and_then(|o| o.accept_empty)
            .unwrap_or(true);
        let mut composite = CompositeResolver::new().with_accept_empty(accept_empty);

        for path in data {
            let table = load_table(path, TableSettings::default()).await?;
            composite = composite.with_member(i32::MIN, aggregator(table));
        }

        for repo in &config.repositories {
            let table = load_table(&repo.data_file, table_settings(repo))
                .await
                .with_context(|| format!("Failed to load repository '{}'", repo.display_name()))?;
            let table = table.renamed(repo.display_name());
            composite = composite.with_member(repo.order.unwrap_or(0), aggregator(table));
        }

        info!(repositories = composite.len(), "Resolver ready");
        Ok(Self { composite, timeout })
    }

    pub fn composite(&self) -> &CompositeResolver {
        &self.composite
    }

    /// Resolve a request within the configured deadline.
    pub async fn resolve(&self, request: &EnvironmentRequest) -> Result<Environment> {
        debug!(?request, timeout_ms = self.timeout.as_millis() as u64, "Resolving");
        let environment = tokio::time::timeout(self.timeout, self.composite.resolve(request))
            .await
            .map_err(|_| anyhow!("Resolution timed out after {} ms", self.timeout.as_millis()))??;
        Ok(environment)
    }
}

// Emptiness is judged on the combined environment, never per member.
fn aggregator(table: PropertyTable) -> SourceAggregator {
    SourceAggregator::new(Arc::new(table))
}
