//! The decode engine: recursive evaluation of a spec tree against a body.
//!
//! `decode` is a pure function of its inputs. Every recursive step returns
//! its value and appends to an accumulating diagnostic list, so a caller
//! always sees the complete set of problems in one pass; a failing leaf
//! decodes to null and never aborts its siblings. Recursion depth equals
//! the spec tree depth, which is bounded by the declarer, not by input.

use std::collections::BTreeMap;

use confspec_core::{Spec, TypeExpr};

use crate::body::Body;
use crate::diagnostics::{Diagnostic, DiagnosticKind, PathStep};
use crate::value::Value;

/// Decode `body` against `spec`, producing a structured value and every
/// problem found along the way. Never fails fatally: absent or invalid
/// subtrees decode to null with a diagnostic.
pub fn decode(spec: &Spec, body: &dyn Body) -> (Value, Vec<Diagnostic>) {
    let mut diags = Vec::new();
    let value = decode_spec(spec, body, None, &[], &mut diags);
    (value, diags)
}

fn extend(path: &[PathStep], step: PathStep) -> Vec<PathStep> {
    let mut out = path.to_vec();
    out.push(step);
    out
}

/// One recursive step. `key_default` is the parent object entry key, used
/// when an attr or block spec omits its own name selector.
fn decode_spec(
    spec: &Spec,
    body: &dyn Body,
    key_default: Option<&str>,
    path: &[PathStep],
    diags: &mut Vec<Diagnostic>,
) -> Value {
    match spec {
        Spec::Object { entries } => {
            let mut out = BTreeMap::new();
            for (key, child) in entries {
                let child_path = extend(path, PathStep::Key(key.clone()));
                let value = decode_spec(child, body, Some(key), &child_path, diags);
                out.insert(key.clone(), value);
            }
            Value::Map(out)
        }

        Spec::Array { values } => {
            let mut out = Vec::with_capacity(values.len());
            for (i, child) in values.iter().enumerate() {
                let child_path = extend(path, PathStep::Index(i));
                out.push(decode_spec(child, body, None, &child_path, diags));
            }
            Value::List(out)
        }

        Spec::Attr {
            name,
            type_expr,
            required,
        } => {
            let Some(name) = name.as_deref().or(key_default) else {
                diags.push(Diagnostic::error(
                    DiagnosticKind::InvalidValue,
                    path.to_vec(),
                    "attr spec has no name selector",
                ));
                return Value::Null;
            };
            let Some(expr) = body.attribute(name) else {
                if *required {
                    diags.push(Diagnostic::error(
                        DiagnosticKind::MissingAttribute,
                        path.to_vec(),
                        format!("missing required attribute '{}'", name),
                    ));
                }
                return Value::Null;
            };
            let target = type_expr.clone().unwrap_or(TypeExpr::Any);
            match expr.evaluate(&target) {
                Ok(value) => value,
                Err(err) => {
                    diags.push(Diagnostic::error(
                        DiagnosticKind::InvalidValue,
                        path.to_vec(),
                        format!("invalid value for attribute '{}': {}", name, err),
                    ));
                    Value::Null
                }
            }
        }

        Spec::Block {
            name,
            required,
            nested,
        } => {
            let Some(name) = name.as_deref().or(key_default) else {
                diags.push(Diagnostic::error(
                    DiagnosticKind::InvalidValue,
                    path.to_vec(),
                    "block spec has no name selector",
                ));
                return Value::Null;
            };
            let blocks = body.blocks(name);
            match blocks.len() {
                0 => {
                    if *required {
                        diags.push(Diagnostic::error(
                            DiagnosticKind::MissingBlock,
                            path.to_vec(),
                            format!("missing required block '{}'", name),
                        ));
                    }
                    Value::Null
                }
                1 => {
                    let block = &blocks[0];
                    let child_path = extend(
                        path,
                        PathStep::Block {
                            name: name.to_string(),
                            labels: block.labels.to_vec(),
                        },
                    );
                    decode_spec(nested, block.body, None, &child_path, diags)
                }
                n => {
                    diags.push(Diagnostic::error(
                        DiagnosticKind::DuplicateBlock,
                        path.to_vec(),
                        format!("duplicate block '{}': found {}, at most one is permitted", name, n),
                    ));
                    Value::Null
                }
            }
        }

        Spec::BlockList {
            name,
            min_items,
            max_items,
            nested,
        } => {
            let items = decode_repeated(
                name.as_deref(),
                key_default,
                *min_items,
                *max_items,
                nested,
                body,
                path,
                diags,
            );
            Value::List(items)
        }

        Spec::BlockSet {
            name,
            min_items,
            max_items,
            nested,
        } => {
            let items = decode_repeated(
                name.as_deref(),
                key_default,
                *min_items,
                *max_items,
                nested,
                body,
                path,
                diags,
            );
            // De-duplicate by structural equality, keeping first occurrences.
            let mut out: Vec<Value> = Vec::with_capacity(items.len());
            for item in items {
                if !out.contains(&item) {
                    out.push(item);
                }
            }
            Value::List(out)
        }

        Spec::BlockMap {
            name,
            labels,
            nested,
        } => {
            let Some(name) = name.as_deref().or(key_default) else {
                diags.push(Diagnostic::error(
                    DiagnosticKind::InvalidValue,
                    path.to_vec(),
                    "block_map spec has no name selector",
                ));
                return Value::Null;
            };
            let mut out = BTreeMap::new();
            for block in body.blocks(name) {
                if block.labels.len() != labels.len() {
                    diags.push(Diagnostic::error(
                        DiagnosticKind::LabelCountMismatch,
                        path.to_vec(),
                        format!(
                            "block '{}' has {} label(s), expected {}",
                            name,
                            block.labels.len(),
                            labels.len()
                        ),
                    ));
                    continue;
                }
                let child_path = extend(
                    path,
                    PathStep::Block {
                        name: name.to_string(),
                        labels: block.labels.to_vec(),
                    },
                );
                let value = decode_spec(nested, block.body, None, &child_path, diags);
                // A repeated identical label path overwrites silently;
                // label uniqueness is the declarer's responsibility.
                insert_labeled(&mut out, block.labels, value);
            }
            Value::Map(out)
        }

        Spec::Default { primary, fallback } => {
            let mut primary_diags = Vec::new();
            let value = decode_spec(primary, body, key_default, path, &mut primary_diags);
            let genuinely_absent =
                value.is_null() && primary_diags.iter().all(|d| d.kind.is_absence());
            if genuinely_absent {
                // Absence-class diagnostics are discarded; the fallback's
                // own diagnostics (if any) surface instead.
                decode_spec(fallback, body, key_default, path, diags)
            } else {
                diags.extend(primary_diags);
                value
            }
        }

        Spec::Literal { value } => match Value::from_json(value) {
            Ok(v) => v,
            Err(err) => {
                diags.push(Diagnostic::error(
                    DiagnosticKind::InvalidValue,
                    path.to_vec(),
                    format!("invalid literal value: {}", err),
                ));
                Value::Null
            }
        },
    }
}

/// Shared fetch/cardinality/decode path of block_list and block_set.
fn decode_repeated(
    name: Option<&str>,
    key_default: Option<&str>,
    min_items: u64,
    max_items: u64,
    nested: &Spec,
    body: &dyn Body,
    path: &[PathStep],
    diags: &mut Vec<Diagnostic>,
) -> Vec<Value> {
    let Some(name) = name.or(key_default) else {
        diags.push(Diagnostic::error(
            DiagnosticKind::InvalidValue,
            path.to_vec(),
            "block spec has no name selector",
        ));
        return Vec::new();
    };
    let blocks = body.blocks(name);
    let count = blocks.len() as u64;
    if count < min_items {
        diags.push(Diagnostic::error(
            DiagnosticKind::Cardinality,
            path.to_vec(),
            format!(
                "expected at least {} block(s) of type '{}', found {}",
                min_items, name, count
            ),
        ));
    }
    if max_items > 0 && count > max_items {
        diags.push(Diagnostic::error(
            DiagnosticKind::Cardinality,
            path.to_vec(),
            format!(
                "expected at most {} block(s) of type '{}', found {}",
                max_items, name, count
            ),
        ));
    }
    // The decoded sequence always covers every block found, bound
    // violations included.
    blocks
        .iter()
        .map(|block| {
            let child_path = extend(
                path,
                PathStep::Block {
                    name: name.to_string(),
                    labels: block.labels.to_vec(),
                },
            );
            decode_spec(nested, block.body, None, &child_path, diags)
        })
        .collect()
}

/// Insert a decoded block value into a nested mapping, one level per label.
fn insert_labeled(map: &mut BTreeMap<String, Value>, labels: &[String], value: Value) {
    match labels {
        [] => {}
        [last] => {
            map.insert(last.clone(), value);
        }
        [first, rest @ ..] => {
            let entry = map
                .entry(first.clone())
                .or_insert_with(|| Value::Map(BTreeMap::new()));
            if let Value::Map(inner) = entry {
                insert_labeled(inner, rest, value);
            }
        }
    }
}
