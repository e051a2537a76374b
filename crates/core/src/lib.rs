//! confspec-core: configuration spec tree data model.
//!
//! A plugin declares the shape of its configuration as a tree of [`Spec`]
//! nodes: expected attributes, nested blocks, cardinality, types, and
//! defaults. This crate owns the data model and everything that can be done
//! with a tree before any configuration body exists:
//!
//! - [`Spec`] -- the closed nine-variant tree, with checked constructors
//! - [`TypeExpr`] -- the type-expression mini-language for attr constraints
//! - [`constraints()`] -- body-independent constraint extraction and
//!   structural validation
//! - [`spec_to_json`] / [`spec_from_json`] -- the interchange (wire) form
//!
//! Decoding a body against a tree lives in the companion eval crate.

pub mod constraints;
pub mod error;
pub mod interchange;
pub mod spec;
pub mod typeexpr;

pub use constraints::{constraints, Cardinality, ConstraintSet};
pub use error::SchemaError;
pub use interchange::{spec_from_json, spec_to_json};
pub use spec::Spec;
pub use typeexpr::TypeExpr;
