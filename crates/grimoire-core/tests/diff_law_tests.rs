//! Property tests for the diff engine laws.

use grimoire_core::diff::{apply_patch, diff, escape_key, DELETION_PREFIX};
use proptest::prelude::*;
use serde_json::{Map, Value};

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-50i64..50).prop_map(Value::from),
        "[a-z]{0,3}".prop_map(Value::String),
    ]
}

/// Plain keys plus keys that look like deletion markers or escapes
fn key() -> impl Strategy<Value = String> {
    "(-=|\\\\)?[a-z]{1,2}"
}

fn document_value() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..3).prop_map(Value::Array),
            prop::collection::btree_map(key(), inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

fn document() -> impl Strategy<Value = Value> {
    prop::collection::btree_map(key(), document_value(), 0..5)
        .prop_map(|m| Value::Object(m.into_iter().collect::<Map<String, Value>>()))
}

proptest! {
    #[test]
    fn prop_apply_diff_round_trips(a in document(), b in document()) {
        let patch = diff(&a, &b);
        prop_assert_eq!(apply_patch(&a, &patch), b);
    }

    #[test]
    fn prop_diff_with_self_is_empty(a in document()) {
        prop_assert!(diff(&a, &a).is_empty());
    }

    #[test]
    fn prop_patch_only_names_changed_keys(a in document(), b in document()) {
        let patch = diff(&a, &b);
        for key in patch.keys() {
            if let Some(name) = key.strip_prefix(DELETION_PREFIX) {
                prop_assert!(a.get(name).is_some() && b.get(name).is_none());
            } else {
                let name = b
                    .as_object()
                    .and_then(|m| m.keys().find(|k| &escape_key(k) == key));
                prop_assert!(name.is_some());
                let name = name.map(String::as_str).unwrap_or_default();
                prop_assert_ne!(a.get(name), b.get(name));
            }
        }
    }

    #[test]
    fn prop_diff_is_deterministic(a in document(), b in document()) {
        prop_assert_eq!(diff(&a, &b), diff(&a, &b));
    }
}
