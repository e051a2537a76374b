//! confspec-eval: spec-driven configuration body decoder.
//!
//! The companion to confspec-core: given an immutable [`Spec`] tree and an
//! already-parsed configuration [`Body`], [`decode`] produces one
//! structured [`Value`] plus every validation problem found, as
//! accumulated [`Diagnostic`]s. The call is pure and synchronous; separate
//! decodes over the same tree may run concurrently on separate bodies.
//!
//! # Example
//!
//! ```
//! use confspec_core::Spec;
//! use confspec_eval::{decode, ConfigBody, Value};
//!
//! let spec = Spec::object(vec![
//!     ("name".to_string(), Spec::attr(None, Some("string"), true).unwrap()),
//! ]).unwrap();
//! let body = ConfigBody::new().with_attr("name", Value::string("web"));
//!
//! let (value, diags) = decode(&spec, &body);
//! assert!(diags.is_empty());
//! ```

pub mod body;
pub mod convert;
pub mod decode;
pub mod diagnostics;
pub mod value;

pub use body::{Body, BlockInstance, ConfigBody, Expression, RawExpr};
pub use confspec_core::{Spec, TypeExpr};
pub use convert::{convert, ConvertError};
pub use decode::decode;
pub use diagnostics::{Diagnostic, DiagnosticKind, PathStep, Severity};
pub use value::Value;
