//! Flattening of nested documents into dotted/indexed keys.
//!
//! The inverse of [`crate::structure::StructureBuilder`] for documents whose
//! map keys contain neither `.` nor `[`. Empty maps and lists produce no keys.

use serde_json::Value;

use crate::structure::DOCUMENT_KEY;
use crate::types::PropertyMap;

/// Flatten `document`; a non-map root is wrapped under `document`.
pub fn flatten(document: &Value) -> PropertyMap {
    let mut out = PropertyMap::new();
    match document {
        Value::Object(map) => {
            for (key, value) in map {
                flatten_into(key.clone(), value, &mut out);
            }
        }
        Value::Null => {}
        other => flatten_into(DOCUMENT_KEY.to_string(), other, &mut out),
    }
    out
}

fn flatten_into(path: String, value: &Value, out: &mut PropertyMap) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten_into(format!("{path}.{key}"), child, out);
            }
        }
        Value::Array(items) => {
            for (idx, child) in items.iter().enumerate() {
                flatten_into(format!("{path}[{idx}]"), child, out);
            }
        }
        leaf => {
            out.insert(path, leaf.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_nested() {
        let flat = flatten(&json!({
            "server": {"port": 8080},
            "hosts": ["a", {"name": "b"}],
        }));
        let keys: Vec<&str> = flat.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["server.port", "hosts[0]", "hosts[1].name"]);
        assert_eq!(flat["hosts[1].name"], "b");
    }

    #[test]
    fn test_flatten_wraps_non_map_root() {
        let flat = flatten(&json!(["a", "b"]));
        assert_eq!(flat["document[0]"], "a");
        assert_eq!(flat["document[1]"], "b");
        assert_eq!(flatten(&json!("text"))["document"], "text");
    }
}
