// The JSON-shaped value the evaluation core consumes.
//
// This is a host-agnostic tree, not tied to `serde_json::Value` — callers
// hand the core a `Payload` however they parsed their bytes. `Object` stores
// its entries in a `BTreeMap` rather than a `HashMap`: wildcard resolution
// needs lexicographic key order (spec'd, not incidental), and a sorted map
// gives that for free instead of a sort step on every wildcard expansion.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Payload>),
    Object(BTreeMap<String, Payload>),
}

impl Payload {
    pub fn is_null(&self) -> bool {
        matches!(self, Payload::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Payload::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Payload::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Payload::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Payload]> {
        match self {
            Payload::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Payload>> {
        match self {
            Payload::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn object(pairs: impl IntoIterator<Item = (String, Payload)>) -> Self {
        Payload::Object(pairs.into_iter().collect())
    }

    pub fn array(items: impl IntoIterator<Item = Payload>) -> Self {
        Payload::Array(items.into_iter().collect())
    }
}

impl From<crate::types::Scalar> for Payload {
    fn from(scalar: crate::types::Scalar) -> Self {
        match scalar {
            crate::types::Scalar::Null => Payload::Null,
            crate::types::Scalar::Bool(b) => Payload::Bool(b),
            crate::types::Scalar::Number(n) => Payload::Number(n),
            crate::types::Scalar::String(s) => Payload::String(s),
        }
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload::String(s.to_string())
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::String(s)
    }
}

impl From<f64> for Payload {
    fn from(n: f64) -> Self {
        Payload::Number(n)
    }
}

impl From<i64> for Payload {
    fn from(n: i64) -> Self {
        Payload::Number(n as f64)
    }
}

impl From<bool> for Payload {
    fn from(b: bool) -> Self {
        Payload::Bool(b)
    }
}

impl<T: Into<Payload>> From<Vec<T>> for Payload {
    fn from(items: Vec<T>) -> Self {
        Payload::Array(items.into_iter().map(Into::into).collect())
    }
}

/// Converts an already-parsed `serde_json::Value` into a `Payload`.
///
/// This is the seam a collaborator crosses after parsing event bytes (spec
/// §6: "the core does not parse bytes" — that's the caller's job, typically
/// via `serde_json`). Numbers collapse to `f64`, matching this crate's
/// `Scalar`/`Coerced` numeric representation; a `serde_json::Number` outside
/// `f64`'s exact-integer range loses precision here exactly as it would in
/// any other `as f64` conversion.
impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Payload::Null,
            serde_json::Value::Bool(b) => Payload::Bool(b),
            serde_json::Value::Number(n) => Payload::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Payload::String(s),
            serde_json::Value::Array(items) => {
                Payload::Array(items.into_iter().map(Payload::from).collect())
            }
            serde_json::Value::Object(map) => {
                Payload::Object(map.into_iter().map(|(k, v)| (k, Payload::from(v))).collect())
            }
        }
    }
}
