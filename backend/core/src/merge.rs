//! Override merging of ordered property sources into one flat mapping.
//!
//! Plain keys are overridden key by key. Indexed keys (`list[0]`, `a.b[2].c`)
//! are grouped into families by the text before their first `[`, and a
//! higher-priority source replaces a whole family rather than single elements.

use std::collections::HashMap;

use crate::types::{Environment, PropertyMap, PropertySource, ACTIVE_PROFILES_KEY};

/// Prefix shared by every element of the array family `key` belongs to.
///
/// Returns `None` for plain keys.
pub fn array_family_prefix(key: &str) -> Option<&str> {
    key.find('[').map(|idx| &key[..idx])
}

/// Merge sources given in precedence order (first source wins).
pub fn merge(sources: &[PropertySource]) -> PropertyMap {
    let mut combined = PropertyMap::new();
    let mut families = ArrayFamilies::default();

    for source in sources.iter().rev() {
        let mut current = ArrayFamilies::default();
        for (key, value) in &source.source {
            match array_family_prefix(key) {
                None => {
                    combined.insert(key.clone(), value.clone());
                }
                Some(prefix) => {
                    current.entry(prefix).insert(key.clone(), value.clone());
                }
            }
        }
        families.replace_with(current);
    }

    for (_, family) in families.into_entries() {
        combined.extend(family);
    }

    combined.retain(|key, _| key != ACTIVE_PROFILES_KEY);
    combined
}

/// Flat override-resolved mapping of an environment's sources.
pub fn merge_environment(environment: &Environment) -> PropertyMap {
    merge(&environment.property_sources)
}

/// Indexed keys grouped by family prefix, in first-seen prefix order.
#[derive(Default)]
struct ArrayFamilies {
    positions: HashMap<String, usize>,
    entries: Vec<(String, PropertyMap)>,
}

impl ArrayFamilies {
    fn entry(&mut self, prefix: &str) -> &mut PropertyMap {
        let idx = match self.positions.get(prefix) {
            Some(&idx) => idx,
            None => {
                self.entries.push((prefix.to_string(), PropertyMap::new()));
                self.positions.insert(prefix.to_string(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }

    /// Swap in every family of `other`, keeping the position of known prefixes.
    fn replace_with(&mut self, other: ArrayFamilies) {
        for (prefix, family) in other.entries {
            *self.entry(&prefix) = family;
        }
    }

    fn into_entries(self) -> Vec<(String, PropertyMap)> {
        self.entries
    }
}
