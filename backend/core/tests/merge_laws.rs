//! Property-based tests for the merge and structuring laws.
//!
//! Test coverage:
//! - KeyExpander: outputs are deduplicated and never contain empty entries
//! - merge: idempotence, first-source-wins override, whole-family array replacement
//! - StructureBuilder: flatten → build round-trip for conflict-free documents

use std::collections::HashSet;

use proptest::prelude::*;
use serde_json::{json, Map, Value};

use envforge_core::{flatten, merge, KeyExpander, PropertyMap, PropertySource, StructureBuilder};

/// Identifiers safe to use as map keys in flat key syntax.
fn ident_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,6}".prop_map(String::from)
}

fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        "[a-zA-Z0-9 ]{0,12}".prop_map(Value::from),
    ]
}

/// Nested documents with non-empty containers and no null leaves.
fn document_strategy() -> impl Strategy<Value = Value> {
    let leaf = scalar_strategy();
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..4).prop_map(Value::Array),
            prop::collection::btree_map(ident_strategy(), inner, 1..4)
                .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

fn map_document_strategy() -> impl Strategy<Value = Value> {
    prop::collection::btree_map(ident_strategy(), document_strategy(), 1..5)
        .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>()))
}

fn flat_strategy() -> impl Strategy<Value = PropertyMap> {
    let key = prop_oneof![
        (ident_strategy(), ident_strategy()).prop_map(|(a, b)| format!("{a}.{b}")),
        (ident_strategy(), 0usize..4).prop_map(|(a, i)| format!("{a}[{i}]")),
        ident_strategy(),
    ];
    prop::collection::vec((key, scalar_strategy()), 0..12)
        .prop_map(|pairs| pairs.into_iter().collect())
}

fn list_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![ident_strategy(), Just(String::new()), Just(" ".to_string())],
        0..6,
    )
    .prop_map(|parts| parts.join(","))
}

fn assert_clean(values: &[String]) {
    let unique: HashSet<&String> = values.iter().collect();
    assert_eq!(unique.len(), values.len(), "duplicates in {values:?}");
    assert!(values.iter().all(|v| !v.trim().is_empty()), "empty in {values:?}");
}

proptest! {
    #[test]
    fn prop_expander_outputs_are_clean(
        apps in list_strategy(),
        profiles in list_strategy(),
        labels in list_strategy(),
        incomplete in any::<bool>(),
    ) {
        let expander = KeyExpander::new("master").with_config_incomplete(incomplete);
        if let Ok(keys) = expander.expand(&apps, &profiles, &labels) {
            assert_clean(&keys.applications);
            assert_clean(&keys.profiles);
            assert_clean(&keys.labels);
            prop_assert!(keys.applications.contains(&"application".to_string()));
            prop_assert!(!keys.profiles.is_empty());
            prop_assert!(!keys.labels.is_empty());
        }
    }

    #[test]
    fn prop_merge_is_idempotent(flat in flat_strategy()) {
        let merged = merge(&[PropertySource::new("a", flat)]);
        let again = merge(&[PropertySource::new("merged", merged.clone())]);
        let merged_keys: Vec<&String> = merged.keys().collect();
        let again_keys: Vec<&String> = again.keys().collect();
        prop_assert_eq!(merged_keys, again_keys);
        prop_assert_eq!(merged, again);
    }

    #[test]
    fn prop_first_source_wins(key in ident_strategy(), high in scalar_strategy(), low in scalar_strategy()) {
        let mut s_high = PropertyMap::new();
        s_high.insert(key.clone(), high.clone());
        let mut s_low = PropertyMap::new();
        s_low.insert(key.clone(), low);

        let merged = merge(&[
            PropertySource::new("high", s_high),
            PropertySource::new("low", s_low),
        ]);
        prop_assert_eq!(&merged[&key], &high);
    }

    #[test]
    fn prop_flatten_build_round_trip(doc in map_document_strategy()) {
        let flat = flatten(&doc);
        let rebuilt = StructureBuilder::new().build_value(&flat).unwrap();
        prop_assert_eq!(rebuilt, doc);
    }
}

#[test]
fn array_family_replacement_law() {
    let high: PropertyMap = [("list[0]".to_string(), json!("c"))].into_iter().collect();
    let low: PropertyMap = [
        ("list[0]".to_string(), json!("a")),
        ("list[1]".to_string(), json!("b")),
    ]
    .into_iter()
    .collect();

    let merged = merge(&[PropertySource::new("high", high), PropertySource::new("low", low)]);
    let doc = StructureBuilder::new().build_value(&merged).unwrap();

    assert_eq!(doc, json!({"list": ["c"]}));
}

#[test]
fn conflict_keys_are_not_dropped() {
    let flat: PropertyMap = [
        ("org.x".to_string(), json!("1")),
        ("org.x.y".to_string(), json!("2")),
    ]
    .into_iter()
    .collect();

    let doc = StructureBuilder::new().build_value(&flat).unwrap();

    assert_eq!(doc["org"]["x"], "1");
    assert_eq!(doc["org"]["x.y"], "2");
}
