//! Document façade over a parsed tree.

use crate::collector::{MatchingSchema, SchemaCollector};
use crate::result::{Diagnostic, ProblemKind, Severity, ValidationResult};
use crate::schema::Schema;
use crate::validator::ValidationRun;
use trellis_ast::{NodeId, SyntaxTree};

/// Knobs for a validation run.
///
/// The default severity is `Warning`; editors rely on that default and it
/// must not change, but callers may promote to `Error`.
#[derive(Debug, Clone, Copy)]
pub struct ValidationSettings {
    pub severity: Severity,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            severity: Severity::Warning,
        }
    }
}

/// A parsed document ready for validation and schema queries.
///
/// The wrapped tree is read-only; every operation here is pure and
/// reentrant, so disjoint documents validate safely in parallel.
#[derive(Debug, Clone, Default)]
pub struct Document {
    tree: SyntaxTree,
}

impl Document {
    pub fn new(tree: SyntaxTree) -> Self {
        Self { tree }
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn root(&self) -> Option<NodeId> {
        self.tree.root()
    }

    /// The deepest node whose span contains `offset`.
    pub fn node_at_offset(&self, offset: usize, include_right_bound: bool) -> Option<NodeId> {
        self.tree.node_at_offset(offset, include_right_bound)
    }

    /// Pre-order traversal; returning `false` skips a node's children.
    pub fn visit<F: FnMut(NodeId) -> bool>(&self, f: F) {
        self.tree.visit(f);
    }

    /// Validate against `schema`, returning problems only.
    pub fn validate(&self, schema: &Schema) -> Vec<Diagnostic> {
        self.validate_with(schema, &ValidationSettings::default())
    }

    pub fn validate_with(
        &self,
        schema: &Schema,
        settings: &ValidationSettings,
    ) -> Vec<Diagnostic> {
        let Some(root) = self.tree.root() else {
            return Vec::new();
        };
        tracing::trace!("validating document");
        let mut run = ValidationRun::new(&self.tree, settings.severity);
        let mut result = ValidationResult::new();
        let mut collector = SchemaCollector::noop();
        run.validate(root, schema, &mut result, &mut collector, 0);
        let mut problems = result.problems;
        if run.depth_exceeded() {
            let root_node = self.tree.get(root);
            problems.push(Diagnostic {
                offset: root_node.offset(),
                length: root_node.length(),
                severity: settings.severity,
                message: "Document is too deeply nested to validate completely.".to_string(),
                code: None,
                kind: ProblemKind::General,
            });
        }
        problems
    }

    /// Every schema the engine applied to a node, restricted to nodes
    /// whose span contains `focus_offset` (when given) and excluding
    /// `exclude`. Problems found along the way are discarded.
    pub fn matching_schemas<'s>(
        &self,
        schema: &'s Schema,
        focus_offset: Option<usize>,
        exclude: Option<NodeId>,
    ) -> Vec<MatchingSchema<'s>> {
        let Some(root) = self.tree.root() else {
            return Vec::new();
        };
        tracing::trace!(?focus_offset, "collecting matching schemas");
        let mut run = ValidationRun::new(&self.tree, Severity::Warning);
        let mut result = ValidationResult::new();
        let mut collector = SchemaCollector::recording(focus_offset, exclude);
        run.validate(root, schema, &mut result, &mut collector, 0);
        collector.into_schemas()
    }
}
