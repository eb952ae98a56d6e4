//! Applicable-schema collection.

use crate::schema::Schema;
use trellis_ast::{Node, NodeId};

/// A schema the engine applied to a node.
///
/// `inverted` flips each time the record crosses a `not` boundary on its
/// way out of the validation.
#[derive(Debug, Clone, Copy)]
pub struct MatchingSchema<'s> {
    pub node: NodeId,
    pub schema: &'s Schema,
    pub inverted: bool,
}

/// Collects applicable-schema records during validation.
///
/// The recording variant can be restricted to a focus offset, which also
/// prunes the walk: nodes whose span misses the focus are skipped
/// entirely. Sub-collectors (used for combinator branches) always gather
/// everything so that a winning branch can be promoted wholesale.
#[derive(Debug)]
pub(crate) enum SchemaCollector<'s> {
    Recording {
        focus_offset: Option<usize>,
        exclude: Option<NodeId>,
        schemas: Vec<MatchingSchema<'s>>,
    },
    NoOp,
}

impl<'s> SchemaCollector<'s> {
    pub fn recording(focus_offset: Option<usize>, exclude: Option<NodeId>) -> Self {
        SchemaCollector::Recording {
            focus_offset,
            exclude,
            schemas: Vec::new(),
        }
    }

    pub fn noop() -> Self {
        SchemaCollector::NoOp
    }

    /// Whether validation should descend into `id` at all.
    pub fn include(&self, id: NodeId, node: &Node) -> bool {
        match self {
            SchemaCollector::NoOp => true,
            SchemaCollector::Recording {
                focus_offset,
                exclude,
                ..
            } => {
                if *exclude == Some(id) {
                    return false;
                }
                match focus_offset {
                    None => true,
                    Some(focus) => node.offset() <= *focus && *focus < node.end(),
                }
            }
        }
    }

    pub fn add(&mut self, record: MatchingSchema<'s>) {
        if let SchemaCollector::Recording { schemas, .. } = self {
            schemas.push(record);
        }
    }

    pub fn merge(&mut self, other: SchemaCollector<'s>) {
        if let SchemaCollector::Recording { schemas, .. } = self {
            schemas.extend(other.into_schemas());
        }
    }

    /// An independent collector for a combinator branch: unrestricted
    /// focus, same exclusion.
    pub fn new_sub(&self) -> SchemaCollector<'s> {
        match self {
            SchemaCollector::NoOp => SchemaCollector::NoOp,
            SchemaCollector::Recording { exclude, .. } => SchemaCollector::recording(None, *exclude),
        }
    }

    pub fn into_schemas(self) -> Vec<MatchingSchema<'s>> {
        match self {
            SchemaCollector::NoOp => Vec::new(),
            SchemaCollector::Recording { schemas, .. } => schemas,
        }
    }
}
