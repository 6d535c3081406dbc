//! Resolution over several providers at once.
//!
//! Members are consulted in ascending `order`; the sources of a member with a
//! lower order take precedence over every source of a later member.

use tracing::debug;

use crate::aggregator::SourceAggregator;
use crate::error::{EngineError, Result};
use crate::keys::{KeyExpander, LookupKeys};
use crate::request::EnvironmentRequest;
use crate::types::Environment;

struct Member {
    order: i32,
    aggregator: SourceAggregator,
}

/// Concatenates the environments produced by ordered aggregators.
pub struct CompositeResolver {
    members: Vec<Member>,
    accept_empty: bool,
}

impl Default for CompositeResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositeResolver {
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
            accept_empty: true,
        }
    }

    /// Add a member; members with equal order keep insertion order.
    pub fn with_member(mut self, order: i32, aggregator: SourceAggregator) -> Self {
        let at = self.members.partition_point(|m| m.order <= order);
        self.members.insert(at, Member { order, aggregator });
        self
    }

    pub fn with_accept_empty(mut self, accept_empty: bool) -> Self {
        self.accept_empty = accept_empty;
        self
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Lookup keys of every member, in consultation order, keyed by provider name.
    pub fn lookup_keys(&self, request: &EnvironmentRequest) -> Result<Vec<(String, LookupKeys)>> {
        self.members
            .iter()
            .map(|m| {
                let keys = m.aggregator.lookup_keys(request)?;
                Ok((m.aggregator.provider_name().to_string(), keys))
            })
            .collect()
    }

    pub async fn resolve(&self, request: &EnvironmentRequest) -> Result<Environment> {
        let mut environment = Environment::new(
            request.application.clone(),
            KeyExpander::requested_profiles(&request.profile),
            request.label.clone(),
        );

        for member in &self.members {
            let resolved = member.aggregator.resolve(request).await?;
            debug!(
                order = member.order,
                sources = resolved.property_sources.len(),
                "Composite member resolved"
            );
            environment.property_sources.extend(resolved.property_sources);
        }

        if !self.accept_empty && environment.is_empty() {
            return Err(EngineError::NotFound(format!(
                "no property sources for name={} profiles={} label={}",
                request.application,
                request.profile,
                request.label_or_empty()
            )));
        }
        Ok(environment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use anyhow::Result as AnyResult;
    use async_trait::async_trait;
    use serde_json::json;

    use crate::traits::PropertySourceProvider;
    use crate::types::{PropertyMap, PropertySource};

    struct Fixed(&'static str);

    #[async_trait]
    impl PropertySourceProvider for Fixed {
        fn name(&self) -> &str {
            self.0
        }

        async fn fetch(
            &self,
            application: &str,
            profile: Option<&str>,
            _label: &str,
        ) -> AnyResult<Option<PropertySource>> {
            if application != "app" || profile.is_some() {
                return Ok(None);
            }
            let mut map = PropertyMap::new();
            map.insert("from".into(), json!(self.0));
            Ok(Some(PropertySource::new("app", map)))
        }
    }

    fn member(name: &'static str) -> SourceAggregator {
        SourceAggregator::new(Arc::new(Fixed(name)))
    }

    #[tokio::test]
    async fn test_members_resolved_by_order() {
        let composite = CompositeResolver::new()
            .with_member(10, member("late"))
            .with_member(-5, member("early"))
            .with_member(10, member("later"));
        let request = EnvironmentRequest::new("app", "dev", None).unwrap();

        let env = composite.resolve(&request).await.unwrap();

        let origins: Vec<&str> = env
            .property_sources
            .iter()
            .map(|s| s.source["from"].as_str().unwrap())
            .collect();
        assert_eq!(origins, vec!["early", "late", "later"]);
        assert_eq!(composite.len(), 3);

        let names: Vec<String> = composite
            .lookup_keys(&request)
            .unwrap()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["early", "late", "later"]);
    }

    #[tokio::test]
    async fn test_empty_composite_not_found() {
        let composite = CompositeResolver::new().with_accept_empty(false);
        let request = EnvironmentRequest::new("other", "dev", None).unwrap();
        assert!(matches!(
            composite.resolve(&request).await,
            Err(EngineError::NotFound(_))
        ));
    }
}
