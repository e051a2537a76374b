//! The configuration body abstraction.
//!
//! A `Body` is one already-parsed configuration unit: named attributes
//! holding opaque expressions, and named, labeled nested blocks. The decode
//! engine consumes bodies through these traits; the upstream syntax parser
//! owns the concrete representation.
//!
//! Lookups are case-sensitive and never fail: an unknown attribute or block
//! name is simply "not present". Flagging unexpected extra content, if ever
//! needed, is the engine's job, not the body's.

use confspec_core::TypeExpr;

use crate::convert::{convert, ConvertError};
use crate::value::Value;

// ──────────────────────────────────────────────
// Traits
// ──────────────────────────────────────────────

/// An attribute's raw expression. Opaque to the engine except for the one
/// capability it needs: evaluation against a requested target type.
pub trait Expression {
    /// Evaluate against `target`, producing a converted value or a
    /// conversion error. The engine turns an error into a diagnostic on
    /// the offending subtree only.
    fn evaluate(&self, target: &TypeExpr) -> Result<Value, ConvertError>;
}

/// One block instance of a given type: its header labels and nested body.
pub struct BlockInstance<'a> {
    pub labels: &'a [String],
    pub body: &'a dyn Body,
}

/// An already-parsed configuration unit.
pub trait Body {
    /// Look up a named attribute's expression. `None` means absent.
    fn attribute(&self, name: &str) -> Option<&dyn Expression>;

    /// All blocks of the given type name, in encounter order.
    fn blocks(&self, type_name: &str) -> Vec<BlockInstance<'_>>;
}

// ──────────────────────────────────────────────
// In-memory implementation
// ──────────────────────────────────────────────

/// An expression that already holds its raw dynamic value; evaluation is
/// plain conversion. This is what an upstream parser that eagerly resolves
/// literals hands the engine, and what the test suite uses.
#[derive(Debug, Clone, PartialEq)]
pub struct RawExpr {
    value: Value,
}

impl RawExpr {
    pub fn new(value: Value) -> Self {
        RawExpr { value }
    }
}

impl Expression for RawExpr {
    fn evaluate(&self, target: &TypeExpr) -> Result<Value, ConvertError> {
        convert(&self.value, target)
    }
}

/// An in-memory body: attributes and blocks held directly, in declaration
/// order. Built with the `with_*` methods.
#[derive(Debug, Clone, Default)]
pub struct ConfigBody {
    attributes: Vec<(String, RawExpr)>,
    blocks: Vec<OwnedBlock>,
}

#[derive(Debug, Clone)]
struct OwnedBlock {
    type_name: String,
    labels: Vec<String>,
    body: ConfigBody,
}

impl ConfigBody {
    pub fn new() -> Self {
        ConfigBody::default()
    }

    /// Add an attribute holding a raw value.
    pub fn with_attr(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attributes.push((name.into(), RawExpr::new(value)));
        self
    }

    /// Add an unlabeled block of the given type.
    pub fn with_block(self, type_name: impl Into<String>, body: ConfigBody) -> Self {
        self.with_labeled_block(type_name, Vec::new(), body)
    }

    /// Add a block of the given type carrying header labels.
    pub fn with_labeled_block(
        mut self,
        type_name: impl Into<String>,
        labels: Vec<String>,
        body: ConfigBody,
    ) -> Self {
        self.blocks.push(OwnedBlock {
            type_name: type_name.into(),
            labels,
            body,
        });
        self
    }
}

impl Body for ConfigBody {
    fn attribute(&self, name: &str) -> Option<&dyn Expression> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, expr)| expr as &dyn Expression)
    }

    fn blocks(&self, type_name: &str) -> Vec<BlockInstance<'_>> {
        self.blocks
            .iter()
            .filter(|b| b.type_name == type_name)
            .map(|b| BlockInstance {
                labels: &b.labels,
                body: &b.body,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_lookup_is_case_sensitive() {
        let body = ConfigBody::new().with_attr("Name", Value::string("web"));
        assert!(body.attribute("Name").is_some());
        assert!(body.attribute("name").is_none());
    }

    #[test]
    fn blocks_keep_encounter_order() {
        let body = ConfigBody::new()
            .with_block("mount", ConfigBody::new().with_attr("path", Value::string("/a")))
            .with_block("network", ConfigBody::new())
            .with_block("mount", ConfigBody::new().with_attr("path", Value::string("/b")));

        let mounts = body.blocks("mount");
        assert_eq!(mounts.len(), 2);
        let first = mounts[0]
            .body
            .attribute("path")
            .unwrap()
            .evaluate(&TypeExpr::String)
            .unwrap();
        assert_eq!(first, Value::string("/a"));
    }

    #[test]
    fn unknown_names_are_simply_absent() {
        let body = ConfigBody::new();
        assert!(body.attribute("missing").is_none());
        assert!(body.blocks("missing").is_empty());
    }

    #[test]
    fn raw_expr_evaluates_by_conversion() {
        let expr = RawExpr::new(Value::string("42"));
        assert_eq!(
            expr.evaluate(&TypeExpr::Number).unwrap(),
            Value::number(42)
        );
        assert!(expr.evaluate(&TypeExpr::Bool).is_err());
    }
}
