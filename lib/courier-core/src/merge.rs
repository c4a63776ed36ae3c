//! In-place structural merge of decoded bodies into caller-owned values.
//!
//! Rules, applied recursively from the root:
//!
//! - mapping into mapping: merge key by key, in place;
//! - sequences are replaced wholesale, never merged element-wise;
//! - any other leaf is overwritten;
//! - a `null` slot accepts anything, and `null` may clear a mapping;
//! - a mapping on one side and a non-mapping on the other, or a key of
//!   `incoming` absent from `current`, is a configuration error.
//!
//! The whole of `incoming` is checked before anything is written, so a
//! failed merge leaves `current` untouched.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Missing {
    Reject,
    Insert,
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn mismatch(path: &str, reason: &str) -> Error {
    let at = if path.is_empty() { "<root>" } else { path };
    Error::configuration(format!("structures must match: {reason} at '{at}'"))
}

fn check(current: &Value, incoming: &Value, path: &str, missing: Missing) -> Result<()> {
    match (current, incoming) {
        (Value::Object(current), Value::Object(incoming)) => {
            for (key, value) in incoming {
                match current.get(key) {
                    Some(slot) => check(slot, value, &join(path, key), missing)?,
                    None if missing == Missing::Insert => {}
                    None => return Err(mismatch(&join(path, key), "field is missing")),
                }
            }
            Ok(())
        }
        (Value::Null, _) | (Value::Object(_), Value::Null) => Ok(()),
        (Value::Object(_), _) | (_, Value::Object(_)) => {
            Err(mismatch(path, "nested shape differs"))
        }
        _ => Ok(()),
    }
}

fn apply(current: &mut Value, incoming: Value) {
    match (current, incoming) {
        (Value::Object(current), Value::Object(incoming)) => {
            for (key, value) in incoming {
                match current.get_mut(&key) {
                    Some(slot) => apply(slot, value),
                    None => {
                        current.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Merge `incoming` into `current` in place.
///
/// Nested mappings of `current` are updated in place; sequences and other
/// leaves are replaced. Merging twice with the same `incoming` gives the same
/// result as merging once.
///
/// # Errors
///
/// Returns [`Error::Configuration`] if `incoming` has a field `current` does
/// not have, or a nested shape that differs. `current` is unchanged then.
///
/// ```
/// use courier_core::merge;
/// use serde_json::json;
///
/// let mut wizard = json!({"name": "Luna", "pets": ["owl"], "wand": {"core": null}});
/// merge(&mut wizard, json!({"pets": ["cat"], "wand": {"core": "phoenix"}})).expect("merge");
/// assert_eq!(wizard, json!({"name": "Luna", "pets": ["cat"], "wand": {"core": "phoenix"}}));
///
/// assert!(merge(&mut wizard, json!({"house": "Ravenclaw"})).is_err());
/// ```
pub fn merge(current: &mut Value, incoming: Value) -> Result<()> {
    check(current, &incoming, "", Missing::Reject)?;
    apply(current, incoming);
    Ok(())
}

fn covered(updated: &Value, incoming: &Value, path: &str) -> Result<()> {
    match (updated, incoming) {
        (_, Value::Null) => Ok(()),
        (Value::Object(updated), Value::Object(incoming)) => {
            for (key, value) in incoming {
                let field = join(path, key);
                match updated.get(key) {
                    Some(slot) => covered(slot, value, &field)?,
                    None if value.is_null() => {}
                    None => return Err(mismatch(&field, "field is not part of the record")),
                }
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Merge `incoming` into a typed record in place.
///
/// Unlike [`merge`], fields the record can hold but currently leaves unset
/// (`Option` fields skipped on serialization, for instance) are filled in.
/// The record type is the structure: a field it has no room for is rejected.
///
/// # Errors
///
/// Returns [`Error::Configuration`] if `incoming` does not fit the record
/// type. `current` is unchanged then.
pub fn merge_record<T>(current: &mut T, incoming: Value) -> Result<()>
where
    T: Serialize + DeserializeOwned,
{
    let mut snapshot = serde_json::to_value(&*current)
        .map_err(|err| Error::configuration(format!("cannot snapshot merge target: {err}")))?;
    check(&snapshot, &incoming, "", Missing::Insert)?;
    apply(&mut snapshot, incoming.clone());

    let updated: T = crate::schema::from_value(snapshot)
        .map_err(|err| Error::configuration(format!("structures must match: {err}")))?;
    let reserialized = serde_json::to_value(&updated)
        .map_err(|err| Error::configuration(format!("cannot snapshot merge target: {err}")))?;
    covered(&reserialized, &incoming, "")?;

    *current = updated;
    Ok(())
}
