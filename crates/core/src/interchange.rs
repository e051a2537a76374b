//! Interchange (wire) representation of spec trees.
//!
//! A spec tree crosses a process boundary when a plugin ships its declared
//! schema to the orchestrator. The wire form is the externally tagged JSON
//! encoding of [`Spec`]; any schema-preserving structured encoding would do,
//! as long as decode-then-encode reproduces an equivalent tree.
//!
//! Loading re-validates through the constraint extractor: a tree received
//! over the wire is held to the same structural invariants as one built
//! through the checked constructors.

use crate::error::SchemaError;
use crate::spec::Spec;

/// Serialize a spec tree to its interchange JSON form.
pub fn spec_to_json(spec: &Spec) -> Result<serde_json::Value, SchemaError> {
    serde_json::to_value(spec).map_err(|e| SchemaError::Interchange(e.to_string()))
}

/// Reconstruct and validate a spec tree from its interchange JSON form.
pub fn spec_from_json(value: &serde_json::Value) -> Result<Spec, SchemaError> {
    let spec: Spec =
        serde_json::from_value(value.clone()).map_err(|e| SchemaError::Interchange(e.to_string()))?;
    spec.validate()?;
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_spec() -> Spec {
        Spec::object(vec![
            (
                "name".to_string(),
                Spec::attr(None, Some("string"), true).unwrap(),
            ),
            (
                "tags".to_string(),
                Spec::block_set(
                    Some("tag"),
                    0,
                    0,
                    Spec::object(vec![(
                        "value".to_string(),
                        Spec::attr(None, Some("string"), false).unwrap(),
                    )])
                    .unwrap(),
                )
                .unwrap(),
            ),
            (
                "mode".to_string(),
                Spec::default_to(
                    Spec::attr(None, Some("string"), false).unwrap(),
                    Spec::literal(serde_json::json!("standard")),
                ),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn round_trip_reproduces_the_tree() {
        let spec = sample_spec();
        let wire = spec_to_json(&spec).unwrap();
        let back = spec_from_json(&wire).unwrap();
        assert_eq!(back, spec);
    }

    #[test]
    fn attr_type_travels_as_source_string() {
        let spec = Spec::attr(Some("ports"), Some("list(number)"), false).unwrap();
        let wire = spec_to_json(&spec).unwrap();
        assert_eq!(wire["attr"]["type"], serde_json::json!("list(number)"));
    }

    #[test]
    fn loading_rejects_unknown_variants() {
        let wire = serde_json::json!({"attr_list": {"name": "x"}});
        let err = spec_from_json(&wire).unwrap_err();
        assert!(matches!(err, SchemaError::Interchange(_)));
    }

    #[test]
    fn loading_revalidates_structural_invariants() {
        // Well-formed JSON, structurally invalid tree: empty label list.
        let wire = serde_json::json!({
            "block_map": {
                "name": "region",
                "labels": [],
                "nested": {"attr": {"name": "capacity"}}
            }
        });
        assert_eq!(
            spec_from_json(&wire).unwrap_err(),
            SchemaError::EmptyBlockMapLabels
        );
    }

    #[test]
    fn loading_rejects_malformed_type_expression() {
        let wire = serde_json::json!({"attr": {"name": "x", "type": "list("}});
        let err = spec_from_json(&wire).unwrap_err();
        assert!(matches!(err, SchemaError::Interchange(_)));
    }
}
