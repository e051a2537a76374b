//! Value conversion against a type descriptor.
//!
//! Conversion is a best-effort structural coercion: a numeric string
//! becomes a `number`, a number or bool becomes its `string` rendering,
//! collections convert element-wise. `null` is a valid value of every type
//! and converts to itself. Failures name the expected and actual type so
//! diagnostics can surface both.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use confspec_core::TypeExpr;
use rust_decimal::Decimal;

use crate::value::Value;

// ──────────────────────────────────────────────
// Errors
// ──────────────────────────────────────────────

/// A value that cannot be coerced into the requested type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    /// The value's shape does not fit the type at all.
    Mismatch { expected: String, actual: String },
    /// An object type met an input key it does not declare.
    UnexpectedKey { key: String, expected: String },
    /// A tuple type met a sequence of the wrong length.
    LengthMismatch { expected: usize, actual: usize },
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::Mismatch { expected, actual } => {
                write!(f, "expected {}, got {}", expected, actual)
            }
            ConvertError::UnexpectedKey { key, expected } => {
                write!(f, "unexpected key '{}' for {}", key, expected)
            }
            ConvertError::LengthMismatch { expected, actual } => {
                write!(f, "expected a tuple of {} elements, got {}", expected, actual)
            }
        }
    }
}

impl std::error::Error for ConvertError {}

fn mismatch(ty: &TypeExpr, value: &Value) -> ConvertError {
    ConvertError::Mismatch {
        expected: ty.to_string(),
        actual: value.type_name().to_string(),
    }
}

// ──────────────────────────────────────────────
// Conversion
// ──────────────────────────────────────────────

/// Convert `value` into the shape of `ty`.
pub fn convert(value: &Value, ty: &TypeExpr) -> Result<Value, ConvertError> {
    // null conforms to every type and stays null.
    if value.is_null() {
        return Ok(Value::Null);
    }

    match ty {
        TypeExpr::Any => Ok(value.clone()),

        TypeExpr::String => match value {
            Value::String(_) => Ok(value.clone()),
            Value::Number(d) => Ok(Value::String(d.to_string())),
            Value::Bool(b) => Ok(Value::String(b.to_string())),
            other => Err(mismatch(ty, other)),
        },

        TypeExpr::Number => match value {
            Value::Number(_) => Ok(value.clone()),
            Value::String(s) => Decimal::from_str(s.trim())
                .map(Value::Number)
                .map_err(|_| mismatch(ty, value)),
            other => Err(mismatch(ty, other)),
        },

        TypeExpr::Bool => match value {
            Value::Bool(_) => Ok(value.clone()),
            Value::String(s) => match s.as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(mismatch(ty, value)),
            },
            other => Err(mismatch(ty, other)),
        },

        TypeExpr::List(elem) => match value {
            Value::List(items) => items
                .iter()
                .map(|item| convert(item, elem))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            other => Err(mismatch(ty, other)),
        },

        TypeExpr::Set(elem) => match value {
            Value::List(items) => {
                // Converting into a set removes structural duplicates,
                // keeping first occurrences.
                let mut out: Vec<Value> = Vec::with_capacity(items.len());
                for item in items {
                    let converted = convert(item, elem)?;
                    if !out.contains(&converted) {
                        out.push(converted);
                    }
                }
                Ok(Value::List(out))
            }
            other => Err(mismatch(ty, other)),
        },

        TypeExpr::Map(elem) => match value {
            Value::Map(entries) => {
                let mut out = BTreeMap::new();
                for (k, v) in entries {
                    out.insert(k.clone(), convert(v, elem)?);
                }
                Ok(Value::Map(out))
            }
            other => Err(mismatch(ty, other)),
        },

        TypeExpr::Object(fields) => match value {
            Value::Map(entries) => {
                for key in entries.keys() {
                    if !fields.contains_key(key) {
                        return Err(ConvertError::UnexpectedKey {
                            key: key.clone(),
                            expected: ty.to_string(),
                        });
                    }
                }
                let mut out = BTreeMap::new();
                for (name, field_ty) in fields {
                    let converted = match entries.get(name) {
                        Some(v) => convert(v, field_ty)?,
                        // Missing keys produce null rather than an error.
                        None => Value::Null,
                    };
                    out.insert(name.clone(), converted);
                }
                Ok(Value::Map(out))
            }
            other => Err(mismatch(ty, other)),
        },

        TypeExpr::Tuple(types) => match value {
            Value::List(items) => {
                if items.len() != types.len() {
                    return Err(ConvertError::LengthMismatch {
                        expected: types.len(),
                        actual: items.len(),
                    });
                }
                items
                    .iter()
                    .zip(types)
                    .map(|(item, item_ty)| convert(item, item_ty))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::List)
            }
            other => Err(mismatch(ty, other)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(src: &str) -> TypeExpr {
        TypeExpr::parse(src).unwrap()
    }

    #[test]
    fn numeric_string_into_number() {
        let v = convert(&Value::string("42"), &ty("number")).unwrap();
        assert_eq!(v, Value::Number(Decimal::from(42)));
        assert_eq!(
            convert(&Value::string("3.14"), &ty("number")).unwrap(),
            Value::Number(Decimal::from_str("3.14").unwrap())
        );
    }

    #[test]
    fn non_numeric_string_fails_with_both_types_named() {
        let err = convert(&Value::string("abc"), &ty("number")).unwrap_err();
        assert_eq!(
            err,
            ConvertError::Mismatch {
                expected: "number".to_string(),
                actual: "string".to_string()
            }
        );
    }

    #[test]
    fn number_and_bool_into_string() {
        assert_eq!(
            convert(&Value::number(8080), &ty("string")).unwrap(),
            Value::string("8080")
        );
        assert_eq!(
            convert(&Value::Bool(true), &ty("string")).unwrap(),
            Value::string("true")
        );
    }

    #[test]
    fn string_into_bool() {
        assert_eq!(
            convert(&Value::string("false"), &ty("bool")).unwrap(),
            Value::Bool(false)
        );
        assert!(convert(&Value::string("yes"), &ty("bool")).is_err());
    }

    #[test]
    fn null_conforms_to_every_type() {
        for src in ["any", "string", "number", "bool", "list(string)", "object({})"] {
            assert_eq!(convert(&Value::Null, &ty(src)).unwrap(), Value::Null);
        }
    }

    #[test]
    fn list_converts_elementwise() {
        let input = Value::List(vec![Value::string("1"), Value::string("2")]);
        assert_eq!(
            convert(&input, &ty("list(number)")).unwrap(),
            Value::List(vec![Value::number(1), Value::number(2)])
        );
    }

    #[test]
    fn set_conversion_drops_duplicates() {
        let input = Value::List(vec![
            Value::string("a"),
            Value::string("b"),
            Value::string("a"),
        ]);
        assert_eq!(
            convert(&input, &ty("set(string)")).unwrap(),
            Value::List(vec![Value::string("a"), Value::string("b")])
        );
    }

    #[test]
    fn object_rejects_extra_keys_and_fills_missing_with_null() {
        let object_ty = ty("object({host = string, port = number})");

        let mut entries = BTreeMap::new();
        entries.insert("host".to_string(), Value::string("db"));
        let v = convert(&Value::Map(entries.clone()), &object_ty).unwrap();
        let mut expected = BTreeMap::new();
        expected.insert("host".to_string(), Value::string("db"));
        expected.insert("port".to_string(), Value::Null);
        assert_eq!(v, Value::Map(expected));

        entries.insert("hosts".to_string(), Value::string("oops"));
        let err = convert(&Value::Map(entries), &object_ty).unwrap_err();
        assert!(matches!(err, ConvertError::UnexpectedKey { ref key, .. } if key == "hosts"));
    }

    #[test]
    fn tuple_requires_exact_length() {
        let tuple_ty = ty("tuple([string, number])");
        let ok = Value::List(vec![Value::string("x"), Value::number(1)]);
        assert_eq!(convert(&ok, &tuple_ty).unwrap(), ok);

        let short = Value::List(vec![Value::string("x")]);
        assert_eq!(
            convert(&short, &tuple_ty).unwrap_err(),
            ConvertError::LengthMismatch {
                expected: 2,
                actual: 1
            }
        );
    }
}
