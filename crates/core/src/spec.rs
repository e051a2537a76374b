//! The spec tree data model.
//!
//! A [`Spec`] is a closed tagged union of nine node variants forming a
//! rooted tree. A plugin declares one tree at registration time describing
//! the shape of its configuration; the eval crate then walks configuration
//! bodies against it. Trees are immutable once built and are read many
//! times, once per configuration instance.
//!
//! Each variant has a checked constructor that enforces its structural
//! invariants (non-empty BlockMap labels, consistent cardinality bounds,
//! well-formed type expressions). Trees arriving over the wire instead go
//! through [`crate::interchange::spec_from_json`], which re-runs the same
//! checks via the constraint extractor.

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::typeexpr::TypeExpr;

/// One node of a configuration spec tree.
///
/// The serde form is the interchange representation: an externally tagged
/// JSON object with snake_case variant names (`{"attr": {...}}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Spec {
    /// Produces a keyed mapping. Each entry's key is the output property
    /// name, independent of the nested spec's own name selector; a nested
    /// attr or block spec with no explicit name defaults to the entry key.
    /// Entries keep their declared order so decoding is deterministic.
    Object { entries: Vec<(String, Spec)> },

    /// Produces an ordered sequence; each element position has its own spec,
    /// all evaluated against the same body.
    Array { values: Vec<Spec> },

    /// Leaf. Reads one attribute's expression from the body and converts it
    /// to `type`. `name` may be omitted under a parent object entry.
    /// A `type` of `None` means `any`.
    Attr {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        type_expr: Option<TypeExpr>,
        #[serde(default)]
        required: bool,
    },

    /// Reads zero-or-one block of the given type name (exactly one when
    /// `required`) and applies `nested` to its body.
    Block {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default)]
        required: bool,
        nested: Box<Spec>,
    },

    /// Reads zero-or-more blocks of the given type name, producing an
    /// ordered sequence in encounter order. `min_items`/`max_items` bound
    /// the count; zero means no minimum / unbounded.
    BlockList {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default)]
        min_items: u64,
        #[serde(default)]
        max_items: u64,
        nested: Box<Spec>,
    },

    /// Same fetch and cardinality rule as `BlockList`, but duplicates (by
    /// structural value equality) are removed and the result carries no
    /// ordering guarantee.
    BlockSet {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default)]
        min_items: u64,
        #[serde(default)]
        max_items: u64,
        nested: Box<Spec>,
    },

    /// Reads zero-or-more blocks, each required to carry exactly
    /// `labels.len()` header labels. Produces a mapping keyed progressively
    /// by each label value, bottoming out in `nested` applied to the block
    /// body. A repeated identical label path overwrites silently.
    BlockMap {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        labels: Vec<String>,
        nested: Box<Spec>,
    },

    /// Evaluates `primary`; when its result is genuinely absent (null with
    /// no present-but-invalid diagnostic), evaluates `fallback` instead.
    /// Validation constraints are contributed only by `primary`.
    Default {
        primary: Box<Spec>,
        fallback: Box<Spec>,
    },

    /// Leaf. Returns a fixed value and contributes no constraints. The
    /// value is kept in its interchange (JSON) form.
    Literal { value: serde_json::Value },
}

impl Spec {
    /// Build an object spec. Fails on duplicate output keys.
    pub fn object(entries: Vec<(String, Spec)>) -> Result<Spec, SchemaError> {
        for (i, (key, _)) in entries.iter().enumerate() {
            if entries[..i].iter().any(|(k, _)| k == key) {
                return Err(SchemaError::DuplicateObjectKey { key: key.clone() });
            }
        }
        Ok(Spec::Object { entries })
    }

    /// Build an array spec.
    pub fn array(values: Vec<Spec>) -> Spec {
        Spec::Array { values }
    }

    /// Build an attr spec. `type_expr` of `None` means `any`; the
    /// expression is parsed here so a malformed type never reaches decode
    /// time.
    pub fn attr(
        name: Option<&str>,
        type_expr: Option<&str>,
        required: bool,
    ) -> Result<Spec, SchemaError> {
        let type_expr = type_expr.map(TypeExpr::parse).transpose()?;
        Ok(Spec::Attr {
            name: name.map(str::to_owned),
            type_expr,
            required,
        })
    }

    /// Build a singular block spec.
    pub fn block(name: Option<&str>, required: bool, nested: Spec) -> Spec {
        Spec::Block {
            name: name.map(str::to_owned),
            required,
            nested: Box::new(nested),
        }
    }

    /// Build a block list spec. Fails when `max_items` is set (non-zero)
    /// but smaller than `min_items`.
    pub fn block_list(
        name: Option<&str>,
        min_items: u64,
        max_items: u64,
        nested: Spec,
    ) -> Result<Spec, SchemaError> {
        check_cardinality(min_items, max_items)?;
        Ok(Spec::BlockList {
            name: name.map(str::to_owned),
            min_items,
            max_items,
            nested: Box::new(nested),
        })
    }

    /// Build a block set spec. Same cardinality rule as [`Spec::block_list`].
    pub fn block_set(
        name: Option<&str>,
        min_items: u64,
        max_items: u64,
        nested: Spec,
    ) -> Result<Spec, SchemaError> {
        check_cardinality(min_items, max_items)?;
        Ok(Spec::BlockSet {
            name: name.map(str::to_owned),
            min_items,
            max_items,
            nested: Box::new(nested),
        })
    }

    /// Build a block map spec. Fails when `labels` is empty.
    pub fn block_map(
        name: Option<&str>,
        labels: Vec<String>,
        nested: Spec,
    ) -> Result<Spec, SchemaError> {
        if labels.is_empty() {
            return Err(SchemaError::EmptyBlockMapLabels);
        }
        Ok(Spec::BlockMap {
            name: name.map(str::to_owned),
            labels,
            nested: Box::new(nested),
        })
    }

    /// Build a default spec: `primary`, falling back to `fallback` when
    /// `primary` decodes to null without a present-but-invalid diagnostic.
    pub fn default_to(primary: Spec, fallback: Spec) -> Spec {
        Spec::Default {
            primary: Box::new(primary),
            fallback: Box::new(fallback),
        }
    }

    /// Build a literal spec from an interchange (JSON) value.
    pub fn literal(value: serde_json::Value) -> Spec {
        Spec::Literal { value }
    }

    /// Variant name for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Spec::Object { .. } => "object",
            Spec::Array { .. } => "array",
            Spec::Attr { .. } => "attr",
            Spec::Block { .. } => "block",
            Spec::BlockList { .. } => "block_list",
            Spec::BlockSet { .. } => "block_set",
            Spec::BlockMap { .. } => "block_map",
            Spec::Default { .. } => "default",
            Spec::Literal { .. } => "literal",
        }
    }
}

fn check_cardinality(min_items: u64, max_items: u64) -> Result<(), SchemaError> {
    if max_items > 0 && max_items < min_items {
        return Err(SchemaError::InvalidCardinality {
            min_items,
            max_items,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_rejects_duplicate_keys() {
        let err = Spec::object(vec![
            ("port".to_string(), Spec::attr(None, None, false).unwrap()),
            ("port".to_string(), Spec::attr(None, None, true).unwrap()),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateObjectKey {
                key: "port".to_string()
            }
        );
    }

    #[test]
    fn attr_rejects_malformed_type() {
        let err = Spec::attr(Some("port"), Some("listt(number)"), false).unwrap_err();
        assert!(matches!(err, SchemaError::MalformedTypeExpression { .. }));
    }

    #[test]
    fn block_list_rejects_inverted_bounds() {
        let nested = Spec::attr(Some("v"), None, false).unwrap();
        let err = Spec::block_list(Some("b"), 3, 2, nested).unwrap_err();
        assert_eq!(
            err,
            SchemaError::InvalidCardinality {
                min_items: 3,
                max_items: 2
            }
        );
    }

    #[test]
    fn block_list_zero_max_means_unbounded() {
        let nested = Spec::attr(Some("v"), None, false).unwrap();
        assert!(Spec::block_list(Some("b"), 5, 0, nested).is_ok());
    }

    #[test]
    fn block_map_rejects_empty_labels() {
        let nested = Spec::attr(Some("v"), None, false).unwrap();
        let err = Spec::block_map(Some("b"), vec![], nested).unwrap_err();
        assert_eq!(err, SchemaError::EmptyBlockMapLabels);
    }

    #[test]
    fn kind_names() {
        assert_eq!(Spec::attr(Some("a"), None, false).unwrap().kind(), "attr");
        assert_eq!(Spec::literal(serde_json::json!(1)).kind(), "literal");
    }
}
