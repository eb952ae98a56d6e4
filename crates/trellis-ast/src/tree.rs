//! The node arena, builder API, offset lookup, and visitor.

use crate::node::{Node, NodeId, NodeKind};
use thiserror::Error;

/// Errors raised by the tree builder when a parser wires nodes incorrectly.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("node is already attached to a parent")]
    AlreadyAttached(NodeId),
    #[error("property key must be a string node")]
    NonStringKey(NodeId),
    #[error("unknown node id")]
    UnknownNode(NodeId),
}

/// Arena of document nodes.
///
/// Parsers build a tree bottom-up: leaves first, then containers, which
/// attach their children and wire the parent back-references. Once
/// [`SyntaxTree::set_root`] has been called the tree is treated as
/// read-only by every consumer in this workspace.
#[derive(Debug, Clone, Default)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl SyntaxTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The document root, if one has been set.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Look up a node by id.
    ///
    /// Panics if `id` did not come from this tree.
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    fn push(&mut self, offset: usize, length: usize, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            offset,
            length,
            parent: None,
            kind,
        });
        id
    }

    /// Attach `child` to `parent`, failing if it already has an owner.
    fn attach(&mut self, child: NodeId, parent: NodeId) -> Result<(), TreeError> {
        let slot = self
            .nodes
            .get_mut(child.index())
            .ok_or(TreeError::UnknownNode(child))?;
        if slot.parent.is_some() {
            return Err(TreeError::AlreadyAttached(child));
        }
        slot.parent = Some(parent);
        Ok(())
    }

    pub fn add_null(&mut self, offset: usize, length: usize) -> NodeId {
        self.push(offset, length, NodeKind::Null)
    }

    pub fn add_boolean(&mut self, offset: usize, length: usize, value: bool) -> NodeId {
        self.push(offset, length, NodeKind::Boolean(value))
    }

    pub fn add_number(
        &mut self,
        offset: usize,
        length: usize,
        value: f64,
        is_integer: bool,
    ) -> NodeId {
        self.push(offset, length, NodeKind::Number { value, is_integer })
    }

    pub fn add_string(
        &mut self,
        offset: usize,
        length: usize,
        value: impl Into<String>,
    ) -> NodeId {
        self.push(offset, length, NodeKind::String(value.into()))
    }

    /// Create an array node and take ownership of `items`.
    pub fn add_array(
        &mut self,
        offset: usize,
        length: usize,
        items: Vec<NodeId>,
    ) -> Result<NodeId, TreeError> {
        let id = self.push(offset, length, NodeKind::Array { items: Vec::new() });
        for &item in &items {
            self.attach(item, id)?;
        }
        self.nodes[id.index()].kind = NodeKind::Array { items };
        Ok(id)
    }

    /// Create a property node owning `key` and (optionally) `value`.
    pub fn add_property(
        &mut self,
        offset: usize,
        length: usize,
        key: NodeId,
        value: Option<NodeId>,
        colon_offset: Option<usize>,
    ) -> Result<NodeId, TreeError> {
        let key_node = self
            .nodes
            .get(key.index())
            .ok_or(TreeError::UnknownNode(key))?;
        if !matches!(key_node.kind, NodeKind::String(_)) {
            return Err(TreeError::NonStringKey(key));
        }
        let id = self.push(
            offset,
            length,
            NodeKind::Property {
                key,
                value,
                colon_offset,
            },
        );
        self.attach(key, id)?;
        if let Some(value) = value {
            self.attach(value, id)?;
        }
        Ok(id)
    }

    /// Create an object node owning the given property nodes.
    pub fn add_object(
        &mut self,
        offset: usize,
        length: usize,
        properties: Vec<NodeId>,
    ) -> Result<NodeId, TreeError> {
        let id = self.push(
            offset,
            length,
            NodeKind::Object {
                properties: Vec::new(),
            },
        );
        for &prop in &properties {
            self.attach(prop, id)?;
        }
        self.nodes[id.index()].kind = NodeKind::Object { properties };
        Ok(id)
    }

    /// Mark `id` as the document root. The root must not be owned by
    /// another node.
    pub fn set_root(&mut self, id: NodeId) -> Result<(), TreeError> {
        let node = self.nodes.get(id.index()).ok_or(TreeError::UnknownNode(id))?;
        if node.parent.is_some() {
            return Err(TreeError::AlreadyAttached(id));
        }
        self.root = Some(id);
        Ok(())
    }

    /// Direct children of a node, in source order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        match &self.get(id).kind {
            NodeKind::Array { items } => items.clone(),
            NodeKind::Object { properties } => properties.clone(),
            NodeKind::Property { key, value, .. } => {
                let mut out = vec![*key];
                if let Some(value) = value {
                    out.push(*value);
                }
                out
            }
            _ => Vec::new(),
        }
    }

    /// The deepest node whose span contains `offset`, starting from the
    /// root. Children are scanned in order; the scan stops once a child
    /// starts past the offset.
    pub fn node_at_offset(&self, offset: usize, include_right_bound: bool) -> Option<NodeId> {
        let root = self.root?;
        self.node_at_offset_from(root, offset, include_right_bound)
    }

    fn node_at_offset_from(
        &self,
        id: NodeId,
        offset: usize,
        include_right_bound: bool,
    ) -> Option<NodeId> {
        if !self.get(id).contains(offset, include_right_bound) {
            return None;
        }
        for child in self.children(id) {
            if self.get(child).offset() > offset {
                break;
            }
            if let Some(found) = self.node_at_offset_from(child, offset, include_right_bound) {
                return Some(found);
            }
        }
        Some(id)
    }

    /// Pre-order traversal from the root. Returning `false` from `f`
    /// skips the node's children; siblings are still visited.
    pub fn visit<F: FnMut(NodeId) -> bool>(&self, mut f: F) {
        if let Some(root) = self.root {
            self.visit_from(root, &mut f);
        }
    }

    fn visit_from<F: FnMut(NodeId) -> bool>(&self, id: NodeId, f: &mut F) {
        if f(id) {
            for child in self.children(id) {
                self.visit_from(child, f);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // `{"a": [1, true]}` with hand-computed offsets:
    //  {  "a"  :  ' '  [  1  ,  ' '  t...e  ]  }
    //  0  1-3  4  5    6  7  8  9    10-13  14 15
    fn sample() -> SyntaxTree {
        let mut tree = SyntaxTree::new();
        let key = tree.add_string(1, 3, "a");
        let one = tree.add_number(7, 1, 1.0, true);
        let tru = tree.add_boolean(10, 4, true);
        let arr = tree.add_array(6, 9, vec![one, tru]).unwrap();
        let prop = tree.add_property(1, 14, key, Some(arr), Some(4)).unwrap();
        let obj = tree.add_object(0, 16, vec![prop]).unwrap();
        tree.set_root(obj).unwrap();
        tree
    }

    #[test]
    fn parents_are_wired_on_attach() {
        let tree = sample();
        let root = tree.root().unwrap();
        assert!(tree.get(root).parent().is_none());
        for prop in tree.children(root) {
            assert_eq!(tree.get(prop).parent(), Some(root));
            for child in tree.children(prop) {
                assert_eq!(tree.get(child).parent(), Some(prop));
            }
        }
    }

    #[test]
    fn child_spans_are_contained_in_parents() {
        let tree = sample();
        tree.visit(|id| {
            let node = tree.get(id);
            if let Some(parent) = node.parent() {
                let p = tree.get(parent);
                assert!(p.offset() <= node.offset() && node.end() <= p.end());
            }
            true
        });
    }

    #[test]
    fn node_at_offset_finds_the_deepest_node() {
        let tree = sample();
        let at = |offset| tree.node_at_offset(offset, false).unwrap();
        assert_eq!(tree.get(at(7)).type_name(), "number");
        assert_eq!(tree.get(at(11)).type_name(), "boolean");
        assert_eq!(tree.get(at(2)).type_name(), "string");
        // The gap between array items belongs to the array.
        assert_eq!(tree.get(at(8)).type_name(), "array");
        // Past the root: nothing.
        assert_eq!(tree.node_at_offset(16, false), None);
    }

    #[test]
    fn node_at_offset_leaf_start_is_the_leaf() {
        let tree = sample();
        tree.visit(|id| {
            if tree.children(id).is_empty() {
                assert_eq!(tree.node_at_offset(tree.get(id).offset(), false), Some(id));
            }
            true
        });
    }

    #[test]
    fn node_at_offset_right_bound() {
        let tree = sample();
        // Offset 8 is one past the `1` token.
        let number = tree.node_at_offset(8, true).unwrap();
        assert_eq!(tree.get(number).type_name(), "number");
        assert_eq!(tree.node_at_offset(16, true), Some(tree.root().unwrap()));
    }

    #[test]
    fn visit_is_preorder_with_early_stop() {
        let tree = sample();
        let mut names = Vec::new();
        tree.visit(|id| {
            names.push(tree.get(id).type_name());
            true
        });
        assert_eq!(
            names,
            ["object", "property", "string", "array", "number", "boolean"]
        );

        // Refusing to descend into the array hides its items.
        let mut pruned = Vec::new();
        tree.visit(|id| {
            pruned.push(tree.get(id).type_name());
            tree.get(id).type_name() != "array"
        });
        assert_eq!(pruned, ["object", "property", "string", "array"]);
    }

    #[test]
    fn attach_rejects_double_ownership() {
        let mut tree = SyntaxTree::new();
        let item = tree.add_null(1, 4);
        tree.add_array(0, 6, vec![item]).unwrap();
        assert_eq!(
            tree.add_array(0, 6, vec![item]).unwrap_err(),
            TreeError::AlreadyAttached(item)
        );
    }

    #[test]
    fn property_key_must_be_a_string() {
        let mut tree = SyntaxTree::new();
        let key = tree.add_number(0, 1, 3.0, true);
        assert_eq!(
            tree.add_property(0, 4, key, None, None).unwrap_err(),
            TreeError::NonStringKey(key)
        );
    }
}
