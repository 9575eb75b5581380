//! Structural diff and patch application.

use serde_json::{Map, Value};

/// A minimal structural difference between two documents
pub type Patch = Map<String, Value>;

/// Prefix marking a key removal inside a patch or a pathed update
pub const DELETION_PREFIX: &str = "-=";

/// Prefix escaping a document key that would otherwise read as a marker
pub const ESCAPE_PREFIX: &str = "\\";

/// Whether `key` is a deletion marker (`-=<name>`)
pub fn is_deletion_key(key: &str) -> bool {
    key.starts_with(DELETION_PREFIX)
}

/// Patch spelling of a document key
///
/// Keys starting with `-=` or `\` get one extra leading `\`.
pub fn escape_key(key: &str) -> String {
    if key.starts_with(DELETION_PREFIX) || key.starts_with(ESCAPE_PREFIX) {
        format!("{}{}", ESCAPE_PREFIX, key)
    } else {
        key.to_string()
    }
}

/// Document key of a non-marker patch key
fn unescape_key(key: &str) -> &str {
    key.strip_prefix(ESCAPE_PREFIX).unwrap_or(key)
}

/// Copy `value` for a patch, escaping the keys of every nested object
///
/// Arrays are atomic and copied untouched.
fn escape_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, inner)| (escape_key(key), escape_value(inner)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Compute the patch that turns `origin` into `variant`.
///
/// Both sides are expected to be objects; a non-object side is treated as
/// an empty object.
///
/// - keys whose values are equal are omitted
/// - keys holding objects on both sides recurse; the nested patch for that
///   key only carries its differing sub-keys
/// - every other differing value (scalars, arrays, type changes) is copied
///   from `variant` whole
/// - keys missing from `variant` become `"-=<key>": null`
/// - document keys that start with `-=` or `\` are escaped with a leading
///   `\`, so a patch key is only a marker when it was made one
pub fn diff(origin: &Value, variant: &Value) -> Patch {
    let empty = Map::new();
    let a = origin.as_object().unwrap_or(&empty);
    let b = variant.as_object().unwrap_or(&empty);
    diff_maps(a, b)
}

fn diff_maps(a: &Map<String, Value>, b: &Map<String, Value>) -> Patch {
    let mut patch = Patch::new();

    for (key, new_value) in b {
        match (a.get(key), new_value) {
            (Some(old_value), _) if old_value == new_value => {}
            (Some(Value::Object(old_obj)), Value::Object(new_obj)) => {
                // differing objects always yield a non-empty inner patch
                let inner = diff_maps(old_obj, new_obj);
                patch.insert(escape_key(key), Value::Object(inner));
            }
            _ => {
                patch.insert(escape_key(key), escape_value(new_value));
            }
        }
    }

    for key in a.keys() {
        if !b.contains_key(key) {
            patch.insert(format!("{}{}", DELETION_PREFIX, key), Value::Null);
        }
    }

    patch
}

/// Apply `patch` onto a copy of `doc` and return the result.
///
/// A nested patch object merges into an existing object value; when the
/// target value is not an object the patch object replaces it with its
/// deletion markers stripped. Escaped keys lose one leading `\`.
pub fn apply_patch(doc: &Value, patch: &Patch) -> Value {
    let mut out = match doc {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    merge_into(&mut out, patch);
    Value::Object(out)
}

/// Merge `patch` into `target` in place.
pub(crate) fn merge_into(target: &mut Map<String, Value>, patch: &Patch) {
    for (key, value) in patch {
        if let Some(name) = key.strip_prefix(DELETION_PREFIX) {
            target.remove(name);
            continue;
        }
        let name = unescape_key(key);
        match (target.get_mut(name), value) {
            (Some(Value::Object(existing)), Value::Object(inner)) => {
                merge_into(existing, inner);
            }
            (_, Value::Object(inner)) => {
                let mut fresh = Map::new();
                merge_into(&mut fresh, inner);
                target.insert(name.to_string(), Value::Object(fresh));
            }
            _ => {
                target.insert(name.to_string(), value.clone());
            }
        }
    }
}
