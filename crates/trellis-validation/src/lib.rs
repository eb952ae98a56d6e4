//! Schema-based structural validation for tree documents.
//!
//! The engine walks a pre-parsed [`trellis_ast::SyntaxTree`] against a
//! JSON-Schema-flavored [`Schema`], producing ranked [`Diagnostic`]s and,
//! on request, the set of schemas that apply to each node, which is the
//! raw material for editor hover, completion, and go-to-definition.
//!
//! The walk is pure and synchronous: no I/O, no `$ref` resolution (refs
//! arrive pre-expanded), no document rewriting. Malformed schemas never
//! fail the run; unknown keywords and ill-typed fields are ignored and
//! every user-visible outcome is a diagnostic.

mod collector;
mod document;
mod result;
mod schema;
mod validator;

pub use collector::MatchingSchema;
pub use document::{Document, ValidationSettings};
pub use result::{Diagnostic, ErrorCode, ProblemKind, Severity, ValidationResult};
pub use schema::{Dependency, Exclusive, Items, Schema, SchemaObject, TypeSpec};
