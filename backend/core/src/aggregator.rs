//! Source aggregation: expands a request into lookup keys and collects the
//! matching property sources from a provider in precedence order.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::error::{EngineError, Result};
use crate::keys::{KeyExpander, LookupKeys};
use crate::request::EnvironmentRequest;
use crate::traits::PropertySourceProvider;
use crate::types::{Environment, PropertySource};

/// Builds an [`Environment`] from one provider.
pub struct SourceAggregator {
    provider: Arc<dyn PropertySourceProvider>,
    expander: KeyExpander,
    accept_empty: bool,
}

impl SourceAggregator {
    pub fn new(provider: Arc<dyn PropertySourceProvider>) -> Self {
        let expander = KeyExpander::for_provider(provider.as_ref());
        Self {
            provider,
            expander,
            accept_empty: true,
        }
    }

    /// When false, a request that matches no source fails with `NotFound`.
    pub fn with_accept_empty(mut self, accept_empty: bool) -> Self {
        self.accept_empty = accept_empty;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn expander(&self) -> &KeyExpander {
        &self.expander
    }

    /// Expand the request without touching the provider.
    pub fn lookup_keys(&self, request: &EnvironmentRequest) -> Result<LookupKeys> {
        self.expander.expand(
            &request.application,
            &request.profile,
            request.label_or_empty(),
        )
    }

    /// Resolve a request into an environment.
    ///
    /// Iteration order is label, then profile, then application; the
    /// profile-less fallback sources for a label follow its profile loop.
    #[instrument(skip(self), fields(provider = %self.provider.name()))]
    pub async fn resolve(&self, request: &EnvironmentRequest) -> Result<Environment> {
        let keys = self.lookup_keys(request)?;
        let mut environment = Environment::new(
            request.application.clone(),
            KeyExpander::requested_profiles(&request.profile),
            request.label.clone(),
        );

        for lookup in keys.lookups() {
            self.add_property_source(
                &mut environment,
                lookup.application,
                lookup.profile,
                lookup.label,
            )
            .await?;
        }

        if !self.accept_empty && environment.is_empty() {
            return Err(EngineError::NotFound(format!(
                "no property sources for name={} profiles={} label={}",
                request.application,
                request.profile,
                request.label_or_empty()
            )));
        }

        info!(
            name = %environment.name,
            sources = environment.property_sources.len(),
            "Resolved environment"
        );
        Ok(environment)
    }

    async fn add_property_source(
        &self,
        environment: &mut Environment,
        application: &str,
        profile: Option<&str>,
        label: &str,
    ) -> Result<()> {
        let name = PropertySource::name_for(application, profile);
        match self.provider.fetch(application, profile, label).await {
            Ok(Some(source)) if !source.is_empty() => {
                debug!(source = %name, label, keys = source.source.len(), "Fetched property source");
                environment.add(PropertySource::new(name, source.source));
            }
            Ok(_) => {
                debug!(source = %name, label, "No property source");
            }
            Err(e) if !self.provider.fail_on_error() => {
                warn!(
                    source = %name,
                    label,
                    error = %e,
                    "Property source retrieval failed, continuing without it"
                );
            }
            Err(e) => {
                return Err(EngineError::Retrieval {
                    source_name: name,
                    message: format!("{e:#}"),
                });
            }
        }
        Ok(())
    }
}
