use anyhow::Result;
use async_trait::async_trait;

use crate::types::PropertySource;

/// Default label used when neither the request nor the repository names one.
pub const DEFAULT_LABEL: &str = "master";

/// A backing store that can produce a property source for one lookup key.
///
/// Implementations decide how data is stored (database table, files, SCM).
/// The engine only relies on this contract and on the policy flags below.
#[async_trait]
pub trait PropertySourceProvider: Send + Sync {
    /// Human-readable name of this provider (e.g., "table").
    fn name(&self) -> &str;

    /// Fetch the properties stored for `application`, `profile` and `label`.
    ///
    /// `profile == None` asks for the profile-less fallback source. Returns
    /// `Ok(None)` when nothing is stored for the triple.
    async fn fetch(
        &self,
        application: &str,
        profile: Option<&str>,
        label: &str,
    ) -> Result<Option<PropertySource>>;

    /// When false, fetch failures are logged and treated as absent sources.
    fn fail_on_error(&self) -> bool {
        true
    }

    /// True when profile-less fallback queries are unavailable.
    fn config_incomplete(&self) -> bool {
        false
    }

    /// Label substituted when a request carries none.
    fn default_label(&self) -> &str {
        DEFAULT_LABEL
    }
}
