//! Constraint extraction: a body-independent walk of a spec tree.
//!
//! The walk does double duty. It derives the attribute/block presence and
//! cardinality constraints a tree implies (for documentation generation and
//! pre-validation of a schema), and it rejects structurally invalid trees
//! with a [`SchemaError`]. Checked constructors and interchange loading both
//! route through it, so an invalid tree never reaches decode time.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::SchemaError;
use crate::spec::Spec;

/// Count bounds on repeated blocks. Zero means "no minimum" for
/// `min_items` and "unbounded" for `max_items`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cardinality {
    pub min_items: u64,
    pub max_items: u64,
}

/// The presence and cardinality constraints implied by a spec tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConstraintSet {
    /// Attribute names that must be present in a body.
    pub required_attributes: Vec<String>,
    /// Block type names of which exactly one instance must be present.
    pub required_blocks: Vec<String>,
    /// Count bounds per block type name, from block / block_list /
    /// block_set specs.
    pub block_cardinalities: BTreeMap<String, Cardinality>,
    /// Expected header-label names per block type name, from block_map
    /// specs.
    pub label_shapes: BTreeMap<String, Vec<String>>,
}

/// Derive the constraint set implied by `spec`, rejecting invalid trees.
pub fn constraints(spec: &Spec) -> Result<ConstraintSet, SchemaError> {
    let mut out = ConstraintSet::default();
    walk(spec, None, &mut out)?;
    Ok(out)
}

impl Spec {
    /// Structural validation without the derived constraint set. Intended
    /// for trees assembled field-by-field or loaded from the wire.
    pub fn validate(&self) -> Result<(), SchemaError> {
        constraints(self).map(|_| ())
    }
}

/// Resolve a spec's name selector: explicit name, else the key of the
/// parent object entry the spec appears under.
fn resolve_name<'a>(
    name: Option<&'a str>,
    key_default: Option<&'a str>,
    kind: &str,
) -> Result<&'a str, SchemaError> {
    name.or(key_default).ok_or_else(|| SchemaError::MissingNameSelector {
        kind: kind.to_string(),
    })
}

fn walk(spec: &Spec, key_default: Option<&str>, out: &mut ConstraintSet) -> Result<(), SchemaError> {
    match spec {
        Spec::Object { entries } => {
            for (i, (key, _)) in entries.iter().enumerate() {
                if entries[..i].iter().any(|(k, _)| k == key) {
                    return Err(SchemaError::DuplicateObjectKey { key: key.clone() });
                }
            }
            for (key, child) in entries {
                walk(child, Some(key), out)?;
            }
            Ok(())
        }

        Spec::Array { values } => {
            for child in values {
                walk(child, None, out)?;
            }
            Ok(())
        }

        Spec::Attr { name, required, .. } => {
            let name = resolve_name(name.as_deref(), key_default, spec.kind())?;
            if *required {
                out.required_attributes.push(name.to_string());
            }
            Ok(())
        }

        Spec::Block {
            name,
            required,
            nested,
        } => {
            let name = resolve_name(name.as_deref(), key_default, spec.kind())?;
            if *required {
                out.required_blocks.push(name.to_string());
            }
            out.block_cardinalities.insert(
                name.to_string(),
                Cardinality {
                    min_items: u64::from(*required),
                    max_items: 1,
                },
            );
            walk(nested, None, out)
        }

        Spec::BlockList {
            name,
            min_items,
            max_items,
            nested,
        }
        | Spec::BlockSet {
            name,
            min_items,
            max_items,
            nested,
        } => {
            if *max_items > 0 && max_items < min_items {
                return Err(SchemaError::InvalidCardinality {
                    min_items: *min_items,
                    max_items: *max_items,
                });
            }
            let name = resolve_name(name.as_deref(), key_default, spec.kind())?;
            out.block_cardinalities.insert(
                name.to_string(),
                Cardinality {
                    min_items: *min_items,
                    max_items: *max_items,
                },
            );
            walk(nested, None, out)
        }

        Spec::BlockMap {
            name,
            labels,
            nested,
        } => {
            if labels.is_empty() {
                return Err(SchemaError::EmptyBlockMapLabels);
            }
            let name = resolve_name(name.as_deref(), key_default, spec.kind())?;
            out.label_shapes.insert(name.to_string(), labels.clone());
            walk(nested, None, out)
        }

        Spec::Default { primary, fallback } => {
            // Only the primary branch contributes constraints; the fallback
            // is still walked for structural validity, into a scratch set.
            walk(primary, key_default, out)?;
            let mut scratch = ConstraintSet::default();
            walk(fallback, key_default, &mut scratch)
        }

        Spec::Literal { .. } => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr(name: Option<&str>, required: bool) -> Spec {
        Spec::attr(name, None, required).unwrap()
    }

    #[test]
    fn collects_required_attributes_and_blocks() {
        let spec = Spec::object(vec![
            ("name".to_string(), attr(None, true)),
            ("region".to_string(), attr(Some("zone"), false)),
            (
                "logging".to_string(),
                Spec::block(None, true, attr(Some("level"), false)),
            ),
        ])
        .unwrap();

        let set = constraints(&spec).unwrap();
        assert_eq!(set.required_attributes, vec!["name"]);
        assert_eq!(set.required_blocks, vec!["logging"]);
        assert_eq!(
            set.block_cardinalities["logging"],
            Cardinality {
                min_items: 1,
                max_items: 1
            }
        );
    }

    #[test]
    fn name_defaults_flow_from_object_keys() {
        // "zone" carries an explicit name; "name" defaults to its key.
        let spec = Spec::object(vec![("region".to_string(), attr(Some("zone"), true))]).unwrap();
        let set = constraints(&spec).unwrap();
        assert_eq!(set.required_attributes, vec!["zone"]);
    }

    #[test]
    fn nameless_attr_outside_object_is_rejected() {
        let spec = attr(None, false);
        let err = constraints(&spec).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingNameSelector {
                kind: "attr".to_string()
            }
        );
    }

    #[test]
    fn block_list_bounds_are_recorded() {
        let spec = Spec::block_list(Some("mount"), 1, 4, attr(Some("path"), false)).unwrap();
        let set = constraints(&spec).unwrap();
        assert_eq!(
            set.block_cardinalities["mount"],
            Cardinality {
                min_items: 1,
                max_items: 4
            }
        );
    }

    #[test]
    fn block_map_labels_are_recorded() {
        let spec = Spec::block_map(
            Some("region"),
            vec!["name".to_string(), "zone".to_string()],
            attr(Some("capacity"), false),
        )
        .unwrap();
        let set = constraints(&spec).unwrap();
        assert_eq!(set.label_shapes["region"], vec!["name", "zone"]);
    }

    #[test]
    fn default_contributes_only_primary_constraints() {
        let spec = Spec::default_to(attr(Some("mode"), true), attr(Some("fallback_mode"), true));
        let set = constraints(&spec).unwrap();
        assert_eq!(set.required_attributes, vec!["mode"]);
    }

    #[test]
    fn default_fallback_is_still_validated() {
        // Fallback contributes no constraints but must still be well formed.
        let bad_fallback = Spec::BlockMap {
            name: Some("b".to_string()),
            labels: vec![],
            nested: Box::new(attr(Some("v"), false)),
        };
        let spec = Spec::default_to(attr(Some("mode"), false), bad_fallback);
        assert_eq!(constraints(&spec).unwrap_err(), SchemaError::EmptyBlockMapLabels);
    }

    #[test]
    fn hand_assembled_invalid_tree_is_rejected() {
        // Bypassing the checked constructors still fails validate().
        let spec = Spec::BlockList {
            name: Some("b".to_string()),
            min_items: 2,
            max_items: 1,
            nested: Box::new(attr(Some("v"), false)),
        };
        assert!(spec.validate().is_err());
    }
}
