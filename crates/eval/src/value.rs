//! Decoded configuration values.
//!
//! Decoding produces a single dynamically typed [`Value`]: null, boolean,
//! number, string, ordered sequence, or keyed mapping. The variant set is
//! closed, so structural equality and the JSON bridge are plain pattern
//! matches. Numbers are `rust_decimal::Decimal` throughout -- never `f64`
//! in the decode path.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// A decoded configuration value.
///
/// Equality is structural: mappings are equal iff they have the same key
/// set with pairwise-equal values; sequences iff same length with
/// pairwise-equal elements in order. Collections produced by block_set
/// specs are sequences with duplicates removed and no ordering guarantee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Decimal),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Human-readable type name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Convenience constructor for string values.
    pub fn string(s: impl Into<String>) -> Value {
        Value::String(s.into())
    }

    /// Convenience constructor for number values.
    pub fn number(n: impl Into<Decimal>) -> Value {
        Value::Number(n.into())
    }

    /// Render as JSON for shipping a decoded value across a plugin
    /// boundary. Integral numbers that fit `i64` become JSON numbers; any
    /// other number is rendered as its exact decimal string, matching the
    /// serde-with-str discipline of the number type itself.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(d) => {
                if d.fract().is_zero() {
                    if let Some(i) = d.to_i64() {
                        return serde_json::Value::from(i);
                    }
                }
                serde_json::Value::String(d.to_string())
            }
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    /// Build a value from JSON. Fails only when a JSON number does not fit
    /// the decimal representation (e.g. `1e300`).
    pub fn from_json(v: &serde_json::Value) -> Result<Value, NumberOutOfRange> {
        match v {
            serde_json::Value::Null => Ok(Value::Null),
            serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
            serde_json::Value::Number(n) => Decimal::from_str(&n.to_string())
                .or_else(|_| Decimal::from_scientific(&n.to_string()))
                .map(Value::Number)
                .map_err(|_| NumberOutOfRange {
                    literal: n.to_string(),
                }),
            serde_json::Value::String(s) => Ok(Value::String(s.clone())),
            serde_json::Value::Array(items) => items
                .iter()
                .map(Value::from_json)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            serde_json::Value::Object(entries) => {
                let mut map = BTreeMap::new();
                for (k, v) in entries {
                    map.insert(k.clone(), Value::from_json(v)?);
                }
                Ok(Value::Map(map))
            }
        }
    }
}

/// A JSON number that cannot be represented as a decimal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberOutOfRange {
    pub literal: String,
}

impl fmt::Display for NumberOutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "number '{}' is out of range", self.literal)
    }
}

impl std::error::Error for NumberOutOfRange {}
