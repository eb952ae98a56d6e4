//! Syntax tree for tree-shaped data documents.
//!
//! This crate provides the document model shared by the validation engine
//! and editor features: an arena of typed nodes carrying source offsets,
//! with offset-to-node lookup and a pre-order visitor. Trees are produced
//! by an external parser through the [`SyntaxTree`] builder methods; from
//! this crate's standpoint a finished tree is immutable.

mod node;
mod tree;

pub use node::{Node, NodeId, NodeKind};
pub use tree::{SyntaxTree, TreeError};
