/// Errors raised while constructing or loading a spec tree.
///
/// These are fatal by design: a plugin whose declared schema fails one of
/// these checks must never reach decode time. Decode-time problems are a
/// different animal entirely and live in the eval crate as accumulated
/// diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// A BlockMap spec was declared with zero labels. Each label position
    /// produces one level of the nested output mapping, so an empty label
    /// list would make the variant meaningless.
    #[error("block_map spec requires at least one label")]
    EmptyBlockMapLabels,

    /// `max_items` is set (non-zero) but smaller than `min_items`.
    #[error("invalid cardinality: max_items {max_items} < min_items {min_items}")]
    InvalidCardinality { min_items: u64, max_items: u64 },

    /// Two entries of an object spec share the same output key.
    #[error("duplicate output key '{key}' in object spec")]
    DuplicateObjectKey { key: String },

    /// An attr or block spec has no explicit name and sits in a position
    /// where no parent object key can supply one.
    #[error("{kind} spec has no name and no parent object key to default to")]
    MissingNameSelector { kind: String },

    /// A type expression failed to parse.
    #[error("malformed type expression '{expr}': {message}")]
    MalformedTypeExpression { expr: String, message: String },

    /// A serialized spec tree could not be reconstructed.
    #[error("malformed spec interchange: {0}")]
    Interchange(String),
}
