//! The in-memory value tree this crate decodes into and encodes from.

use chrono::{DateTime, SecondsFormat, Utc};

/// A decoded document value.
///
/// Mirrors JSON's scalar/array/object shape but keeps `Null` and `Undefined`
/// distinct (the source format has two separate tokens for them) and adds a
/// native `Date` variant instead of representing instants as strings.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Undefined,
    Bool(bool),
    Number(f64),
    String(String),
    Date(DateTime<Utc>),
    Array(Vec<Value>),
    /// Key-value pairs in insertion order. Not `IndexMap`-backed: most
    /// documents have few enough keys per object that linear lookup is
    /// simpler and avoids an extra dependency.
    Object(Vec<(String, Value)>),
}

impl Value {
    /// Look up a key in an `Object` value. Returns `None` for any other
    /// variant, or if the key is absent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// `true` for `Array` values whose elements are all plain `Object`s.
    /// Used by the encoder to decide when to emit a repeated-key block.
    pub fn is_array_of_plain_objects(&self) -> bool {
        match self {
            Value::Array(items) if !items.is_empty() => {
                items.iter().all(|v| matches!(v, Value::Object(_)))
            }
            _ => false,
        }
    }
}

/// Deep-copy `value`, replacing every `Date` with its ISO-8601 string form.
///
/// Everything else is copied unchanged. This is the only transformation the
/// adapter performs; it does not otherwise normalize or validate the tree.
pub fn to_plain(value: &Value) -> Value {
    match value {
        Value::Date(instant) => Value::String(instant.to_rfc3339_opts(SecondsFormat::Millis, true)),
        Value::Array(items) => Value::Array(items.iter().map(to_plain).collect()),
        Value::Object(entries) => {
            Value::Object(entries.iter().map(|(k, v)| (k.clone(), to_plain(v))).collect())
        }
        other => other.clone(),
    }
}
