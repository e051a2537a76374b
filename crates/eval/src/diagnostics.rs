//! Decode-time diagnostics.
//!
//! Every problem the engine meets while decoding becomes a [`Diagnostic`]
//! attached to the overall result; nothing at this layer is fatal. A
//! diagnostic carries a closed kind, a path pinpointing the subtree, and a
//! rendered message, and serializes to a stable JSON form for surfacing
//! through outer layers.

use serde::{Deserialize, Serialize};

/// Where a diagnostic sits in the decoded output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathStep {
    /// An object entry's output key.
    Key(String),
    /// An array element position.
    Index(usize),
    /// A block instance, addressed by type name and header labels.
    Block { name: String, labels: Vec<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// The closed set of decode-time problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A required attribute is absent from the body.
    MissingAttribute,
    /// A required singular block is absent from the body.
    MissingBlock,
    /// More than one block where at most one is permitted.
    DuplicateBlock,
    /// A block count outside its declared min/max bounds.
    Cardinality,
    /// A block carrying the wrong number of header labels.
    LabelCountMismatch,
    /// A present value that cannot be converted to its declared type, or a
    /// malformed literal.
    InvalidValue,
}

impl DiagnosticKind {
    /// Whether this kind reports genuine absence, as opposed to a value
    /// that is present but malformed. A default spec's fallback fires only
    /// when the primary produced nothing but absence-class diagnostics.
    pub fn is_absence(self) -> bool {
        matches!(
            self,
            DiagnosticKind::MissingAttribute | DiagnosticKind::MissingBlock
        )
    }
}

/// A structured, non-fatal decode-time problem report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    /// Path from the decode root to the offending subtree.
    pub path: Vec<PathStep>,
    pub message: String,
}

impl Diagnostic {
    pub fn error(kind: DiagnosticKind, path: Vec<PathStep>, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Error,
            kind,
            path,
            message: message.into(),
        }
    }

    /// Serialize to the stable JSON form used by outer layers.
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "severity": self.severity,
            "kind":     self.kind,
            "path":     self.path,
            "message":  self.message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absence_classification() {
        assert!(DiagnosticKind::MissingAttribute.is_absence());
        assert!(DiagnosticKind::MissingBlock.is_absence());
        assert!(!DiagnosticKind::InvalidValue.is_absence());
        assert!(!DiagnosticKind::DuplicateBlock.is_absence());
        assert!(!DiagnosticKind::Cardinality.is_absence());
        assert!(!DiagnosticKind::LabelCountMismatch.is_absence());
    }

    #[test]
    fn json_form_is_stable() {
        let d = Diagnostic::error(
            DiagnosticKind::MissingAttribute,
            vec![
                PathStep::Key("logging".to_string()),
                PathStep::Block {
                    name: "logging".to_string(),
                    labels: vec![],
                },
            ],
            "missing required attribute 'level'",
        );
        assert_eq!(
            d.to_json_value(),
            serde_json::json!({
                "severity": "error",
                "kind": "missing_attribute",
                "path": [
                    {"key": "logging"},
                    {"block": {"name": "logging", "labels": []}}
                ],
                "message": "missing required attribute 'level'",
            })
        );
    }
}
