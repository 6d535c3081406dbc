//! Lookup key expansion.
//!
//! Turns the raw `application`, `profile` and `label` strings of a request into
//! the three ordered candidate lists the aggregator iterates over. Every list
//! comes back deduplicated and free of empty entries.

use std::collections::HashSet;

use crate::error::{EngineError, Result};
use crate::traits::{PropertySourceProvider, DEFAULT_LABEL};

/// Generic application name shared by every client.
pub const DEFAULT_APPLICATION: &str = "application";

/// Profile used when a request names none.
pub const DEFAULT_PROFILE: &str = "default";

/// Expanded candidate values for one request, in iteration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupKeys {
    pub applications: Vec<String>,
    pub profiles: Vec<String>,
    pub labels: Vec<String>,
    /// Whether each label is followed by profile-less lookups.
    pub profileless_fallback: bool,
}

/// One provider lookup of a fetch plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lookup<'a> {
    pub label: &'a str,
    pub profile: Option<&'a str>,
    pub application: &'a str,
}

impl LookupKeys {
    /// Every lookup in fetch order: label, then profile, then application,
    /// with the profile-less lookups of a label after its profile loop.
    pub fn lookups(&self) -> Vec<Lookup<'_>> {
        let mut plan = Vec::new();
        for label in &self.labels {
            for profile in &self.profiles {
                for application in &self.applications {
                    plan.push(Lookup {
                        label: label.as_str(),
                        profile: Some(profile.as_str()),
                        application: application.as_str(),
                    });
                }
            }
            if self.profileless_fallback {
                for application in &self.applications {
                    plan.push(Lookup {
                        label: label.as_str(),
                        profile: None,
                        application: application.as_str(),
                    });
                }
            }
        }
        plan
    }
}

/// Expands request strings into ordered lookup candidates.
#[derive(Debug, Clone)]
pub struct KeyExpander {
    default_label: String,
    config_incomplete: bool,
}

impl Default for KeyExpander {
    fn default() -> Self {
        Self::new(DEFAULT_LABEL)
    }
}

impl KeyExpander {
    pub fn new(default_label: impl Into<String>) -> Self {
        Self {
            default_label: default_label.into(),
            config_incomplete: false,
        }
    }

    pub fn with_config_incomplete(mut self, config_incomplete: bool) -> Self {
        self.config_incomplete = config_incomplete;
        self
    }

    /// Build an expander that follows the policy flags of `provider`.
    pub fn for_provider(provider: &dyn PropertySourceProvider) -> Self {
        Self::new(provider.default_label()).with_config_incomplete(provider.config_incomplete())
    }

    pub fn config_incomplete(&self) -> bool {
        self.config_incomplete
    }

    pub fn expand(&self, application: &str, profile: &str, label: &str) -> Result<LookupKeys> {
        Ok(LookupKeys {
            applications: self.applications(application)?,
            profiles: self.profiles(profile),
            labels: self.labels(label)?,
            profileless_fallback: !self.config_incomplete,
        })
    }

    /// Applications, generic `application` first in the input, then reversed.
    pub fn applications(&self, application: &str) -> Result<Vec<String>> {
        let mut names = split_list(application);
        if names.is_empty() {
            return Err(EngineError::InvalidRequest(
                "application name must not be empty".to_string(),
            ));
        }
        if !names.iter().any(|n| n == DEFAULT_APPLICATION) {
            names.insert(0, DEFAULT_APPLICATION.to_string());
        }
        let mut names = dedupe(names);
        names.reverse();
        Ok(names)
    }

    pub fn profiles(&self, profile: &str) -> Vec<String> {
        let mut profile = if profile.trim().is_empty() {
            DEFAULT_PROFILE.to_string()
        } else {
            profile.to_string()
        };
        if self.config_incomplete && !profile.starts_with(DEFAULT_PROFILE) {
            profile = format!("{DEFAULT_PROFILE},{profile}");
        }
        let mut envs = dedupe(split_list(&profile));
        if envs.is_empty() {
            envs.push(DEFAULT_PROFILE.to_string());
        }
        envs.reverse();
        envs
    }

    /// Labels; only a comma-separated list is reversed.
    pub fn labels(&self, label: &str) -> Result<Vec<String>> {
        let mut labels = split_labels(label);
        if labels.is_empty() {
            labels = split_labels(&self.default_label);
        }
        if labels.is_empty() {
            return Err(EngineError::InvalidRequest(
                "no label requested and no default label configured".to_string(),
            ));
        }
        Ok(labels)
    }

    /// Profiles as the client asked for them, reported back on the environment.
    pub fn requested_profiles(profile: &str) -> Vec<String> {
        let profiles = dedupe(split_list(profile));
        if profiles.is_empty() {
            vec![DEFAULT_PROFILE.to_string()]
        } else {
            profiles
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn split_labels(raw: &str) -> Vec<String> {
    if raw.contains(',') {
        let mut labels = dedupe(split_list(raw));
        labels.reverse();
        labels
    } else {
        split_list(raw)
    }
}

fn dedupe(values: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_applications_prepend_generic_and_reverse() {
        let expander = KeyExpander::default();
        assert_eq!(
            expander.applications("app,app1").unwrap(),
            strings(&["app1", "app", "application"])
        );
        assert_eq!(
            expander.applications("app").unwrap(),
            strings(&["app", "application"])
        );
    }

    #[test]
    fn test_applications_keep_explicit_generic_position() {
        let expander = KeyExpander::default();
        assert_eq!(
            expander.applications("app,application").unwrap(),
            strings(&["application", "app"])
        );
        assert_eq!(
            expander.applications("application").unwrap(),
            strings(&["application"])
        );
    }

    #[test]
    fn test_applications_dedupe_first_occurrence() {
        let expander = KeyExpander::default();
        assert_eq!(
            expander.applications("a,b,a").unwrap(),
            strings(&["b", "a", "application"])
        );
    }

    #[test]
    fn test_empty_application_is_rejected() {
        let expander = KeyExpander::default();
        assert!(matches!(
            expander.applications(""),
            Err(EngineError::InvalidRequest(_))
        ));
        assert!(matches!(
            expander.applications(" , "),
            Err(EngineError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_profiles_default_and_reverse() {
        let expander = KeyExpander::default();
        assert_eq!(expander.profiles(""), strings(&["default"]));
        assert_eq!(expander.profiles("dev,prod"), strings(&["prod", "dev"]));
        assert_eq!(expander.profiles("dev,dev,prod"), strings(&["prod", "dev"]));
    }

    #[test]
    fn test_profiles_config_incomplete_prepends_default() {
        let expander = KeyExpander::default().with_config_incomplete(true);
        assert_eq!(expander.profiles("prod"), strings(&["prod", "default"]));
        assert_eq!(expander.profiles("default,prod"), strings(&["prod", "default"]));
        assert_eq!(expander.profiles(""), strings(&["default"]));
    }

    #[test]
    fn test_labels_single_and_multi() {
        let expander = KeyExpander::new("main");
        assert_eq!(expander.labels("").unwrap(), strings(&["main"]));
        assert_eq!(expander.labels("v1").unwrap(), strings(&["v1"]));
        assert_eq!(expander.labels("v1,v2,v3").unwrap(), strings(&["v3", "v2", "v1"]));
        assert_eq!(expander.labels(",").unwrap(), strings(&["main"]));
    }

    #[test]
    fn test_missing_default_label_is_rejected() {
        let expander = KeyExpander::new("");
        assert!(matches!(
            expander.labels(""),
            Err(EngineError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_expand_end_to_end_fixture() {
        let keys = KeyExpander::new("master").expand("app,app1", "", "").unwrap();
        assert_eq!(keys.applications, strings(&["app1", "app", "application"]));
        assert_eq!(keys.profiles, strings(&["default"]));
        assert_eq!(keys.labels, strings(&["master"]));
    }

    #[test]
    fn test_lookups_follow_fetch_order() {
        let keys = KeyExpander::new("main").expand("app", "dev", "").unwrap();
        let names: Vec<(Option<&str>, &str)> = keys
            .lookups()
            .iter()
            .map(|l| (l.profile, l.application))
            .collect();
        assert_eq!(
            names,
            vec![
                (Some("dev"), "app"),
                (Some("dev"), "application"),
                (None, "app"),
                (None, "application"),
            ]
        );
    }

    #[test]
    fn test_config_incomplete_lookups_skip_profileless() {
        let keys = KeyExpander::new("main")
            .with_config_incomplete(true)
            .expand("app", "dev", "")
            .unwrap();
        assert!(!keys.profileless_fallback);
        let lookups = keys.lookups();
        assert_eq!(lookups.len(), 4);
        assert!(lookups.iter().all(|l| l.profile.is_some()));
    }

    #[test]
    fn test_requested_profiles() {
        assert_eq!(KeyExpander::requested_profiles(""), strings(&["default"]));
        assert_eq!(
            KeyExpander::requested_profiles("dev, prod"),
            strings(&["dev", "prod"])
        );
    }
}
