//! Placeholder resolution against an environment's own properties.
//!
//! Supports `${key}` and `${key:default}`. Placeholders are resolved innermost
//! first, so `${db.${env}.url}` works, and resolved values are themselves
//! scanned again (bounded by [`MAX_PASSES`]). Placeholders with no value and
//! no default are left untouched. `\${` escapes a literal `${`.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

use envforge_core::PropertyMap;

/// Upper bound on re-scans, which also stops self-referencing values.
pub const MAX_PASSES: usize = 10;

/// Innermost placeholder: no `$`, `{` or `}` inside.
static PLACEHOLDER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^${}:]+)(?::([^${}]*))?\}").unwrap());

const ESCAPED: &str = "\\${";
/// Private-use code point standing in for an escaped `${` while resolving.
const ESCAPE_SENTINEL: &str = "\u{E000}";

/// Plain-text form of a property value as it appears in rendered output.
pub fn value_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(Cow::Borrowed(s)),
        other => Some(Cow::Owned(other.to_string())),
    }
}

/// Resolve placeholders in `text` using `properties`.
pub fn resolve_placeholders(text: &str, properties: &PropertyMap) -> String {
    if !text.contains("${") {
        return text.to_string();
    }
    resolve_masked(text, properties).replace(ESCAPE_SENTINEL, "${")
}

/// Resolution with escaped `${` spans still masked by the sentinel.
fn resolve_masked(text: &str, properties: &PropertyMap) -> String {
    let mut current = text.replace(ESCAPED, ESCAPE_SENTINEL);
    for _ in 0..MAX_PASSES {
        let next = PLACEHOLDER_PATTERN
            .replace_all(&current, |caps: &Captures| substitute(caps, properties))
            .into_owned();
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn substitute(caps: &Captures, properties: &PropertyMap) -> String {
    let key = caps[1].trim();
    if let Some(text) = properties.get(key).and_then(value_text) {
        return text.into_owned();
    }
    match caps.get(2) {
        Some(default) => default.as_str().to_string(),
        None => caps[0].to_string(),
    }
}

/// Collect every placeholder key referenced in `text`, ignoring escaped
/// `\${...}` spans.
pub fn referenced_keys(text: &str) -> Vec<String> {
    let masked = text.replace(ESCAPED, ESCAPE_SENTINEL);
    let mut keys: Vec<String> = PLACEHOLDER_PATTERN
        .captures_iter(&masked)
        .map(|caps| caps[1].trim().to_string())
        .collect();
    keys.sort();
    keys.dedup();
    keys
}

/// Placeholder keys left over after resolving every value of `properties`
/// against the map itself.
pub fn unresolved_keys(properties: &PropertyMap) -> Vec<String> {
    let mut keys: Vec<String> = properties
        .values()
        .filter_map(value_text)
        .filter(|text| text.contains("${"))
        .flat_map(|text| referenced_keys(&resolve_masked(&text, properties)))
        .collect();
    keys.sort();
    keys.dedup();
    keys
}
