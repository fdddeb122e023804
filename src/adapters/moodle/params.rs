//! Web-service parameter flattening
//!
//! Moodle's REST server reads structured arguments from PHP-style array keys:
//! `{"foo": [{"a": 1}]}` travels as `foo[0][a]=1`. [`ParamValue`] is the
//! nested value an operation is called with, and [`flatten`] turns it into the
//! flat key/scalar map that goes on the wire.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Leaf value of a parameter tree
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(v) => write!(f, "{v}"),
            Scalar::Float(v) => write!(f, "{v}"),
            // PHP reads booleans from form data as integers
            Scalar::Bool(v) => write!(f, "{}", u8::from(*v)),
            Scalar::Text(v) => f.write_str(v),
        }
    }
}

/// A nested web-service argument
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Scalar(Scalar),
    Sequence(Vec<ParamValue>),
    Mapping(BTreeMap<String, ParamValue>),
}

impl ParamValue {
    /// An empty mapping, for operations that take no arguments
    pub fn empty() -> Self {
        ParamValue::Mapping(BTreeMap::new())
    }
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ParamValue::Scalar(Scalar::Text(String::new())),
            Value::Bool(b) => ParamValue::Scalar(Scalar::Bool(b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ParamValue::Scalar(Scalar::Int(i)),
                None => ParamValue::Scalar(Scalar::Float(n.as_f64().unwrap_or_default())),
            },
            Value::String(s) => ParamValue::Scalar(Scalar::Text(s)),
            Value::Array(items) => {
                ParamValue::Sequence(items.into_iter().map(ParamValue::from).collect())
            }
            Value::Object(map) => ParamValue::Mapping(
                map.into_iter()
                    .map(|(k, v)| (k, ParamValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Scalar(Scalar::Int(v))
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Scalar(Scalar::Bool(v))
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Scalar(Scalar::Text(v.to_string()))
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Scalar(Scalar::Text(v))
    }
}

/// Flat wire parameters: structural key to scalar
pub type FlatParams = BTreeMap<String, Scalar>;

/// Flattens a parameter tree with no prefix
///
/// Root mapping keys pass straight through; nested sequences and mappings
/// append `[index]` / `[key]` to their parent's key.
///
/// ```
/// use moodlecli::adapters::moodle::params::{flatten, ParamValue, Scalar};
/// use serde_json::json;
///
/// let flat = flatten(&ParamValue::from(json!({"foo": [{"a": 1}]})));
/// assert_eq!(flat.get("foo[0][a]"), Some(&Scalar::Int(1)));
/// ```
pub fn flatten(value: &ParamValue) -> FlatParams {
    flatten_with_prefix(value, "")
}

/// Flattens a parameter tree under `prefix`
///
/// A bare scalar is emitted under the prefix itself.
pub fn flatten_with_prefix(value: &ParamValue, prefix: &str) -> FlatParams {
    let mut out = FlatParams::new();
    flatten_into(value, prefix, &mut out);
    out
}

fn flatten_into(value: &ParamValue, prefix: &str, out: &mut FlatParams) {
    match value {
        ParamValue::Scalar(scalar) => {
            out.insert(prefix.to_string(), scalar.clone());
        }
        ParamValue::Sequence(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten_into(item, &child_key(prefix, &index.to_string()), out);
            }
        }
        ParamValue::Mapping(entries) => {
            for (key, item) in entries {
                flatten_into(item, &child_key(prefix, key), out);
            }
        }
    }
}

fn child_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}[{key}]")
    }
}
