use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ordered key → value mapping. Insertion order is preserved.
pub type PropertyMap = serde_json::Map<String, Value>;

/// Reserved key holding active profile bookkeeping; never part of user config.
pub const ACTIVE_PROFILES_KEY: &str = "spring.profiles";

/// A named, ordered set of properties coming from one backing location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySource {
    /// Provenance, e.g. `"app-prod"` or `"app"` for a profile-less source.
    pub name: String,
    /// Flat keys such as `server.port` or `hosts[2].name`.
    pub source: PropertyMap,
}

impl PropertySource {
    pub fn new(name: impl Into<String>, source: PropertyMap) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }

    /// Name used for a source fetched for `application` and an optional profile.
    pub fn name_for(application: &str, profile: Option<&str>) -> String {
        match profile {
            Some(profile) => format!("{application}-{profile}"),
            None => application.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }
}

/// The result of resolving one (application, profiles, label) request.
///
/// Property sources are ordered by precedence: the first source wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    pub name: String,
    pub profiles: Vec<String>,
    pub label: Option<String>,
    pub version: Option<String>,
    pub state: Option<String>,
    pub property_sources: Vec<PropertySource>,
}

impl Environment {
    pub fn new(name: impl Into<String>, profiles: Vec<String>, label: Option<String>) -> Self {
        Self {
            name: name.into(),
            profiles,
            label,
            version: None,
            state: None,
            property_sources: Vec::new(),
        }
    }

    /// Append a source with lower precedence than every source already present.
    pub fn add(&mut self, source: PropertySource) {
        self.property_sources.push(source);
    }

    pub fn is_empty(&self) -> bool {
        self.property_sources.is_empty()
    }
}

/// Replace the `(_)` path-separator escape with `/`.
///
/// Application names and labels travel inside URL path segments, where a
/// literal slash cannot appear.
pub fn normalize(part: &str) -> String {
    if part.contains("(_)") {
        part.replace("(_)", "/")
    } else {
        part.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_source_naming() {
        assert_eq!(PropertySource::name_for("app", Some("prod")), "app-prod");
        assert_eq!(PropertySource::name_for("app", None), "app");
    }

    #[test]
    fn test_normalize_replaces_escaped_slash() {
        assert_eq!(normalize("feature(_)login"), "feature/login");
        assert_eq!(normalize("master"), "master");
    }

    #[test]
    fn test_environment_serialization() {
        let mut env = Environment::new("app", vec!["prod".into()], Some("master".into()));
        let mut source = PropertyMap::new();
        source.insert("server.port".into(), json!(8080));
        env.add(PropertySource::new("app-prod", source));

        let value = serde_json::to_value(&env).unwrap();
        assert_eq!(value["name"], "app");
        assert_eq!(value["propertySources"][0]["name"], "app-prod");
        assert_eq!(value["propertySources"][0]["source"]["server.port"], 8080);
        assert!(value["version"].is_null());
    }
}
