//! The fitted decision tree model.

use std::collections::VecDeque;

use crate::dataset::Schema;
use crate::node::{Node, NodeIndex, NodeKind};

/// A fitted C4.5 decision tree.
///
/// Stored as an arena-based `Vec<Node>` with index references for
/// cache-friendly traversal and trivial serialization. The arena is compact:
/// every node is reachable from the root, and the root sits at index 0.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TreeModel {
    schema: Schema,
    nodes: Vec<Node>,
    root: NodeIndex,
}

impl TreeModel {
    /// Wrap a raw construction arena, dropping the nodes of discarded
    /// splits.
    pub(crate) fn new(schema: Schema, nodes: Vec<Node>, root: NodeIndex) -> Self {
        let mut model = Self {
            schema,
            nodes,
            root,
        };
        model.compact();
        model
    }

    /// Rebuild the arena in preorder, keeping only nodes reachable from the
    /// root. Construction and pruning both leave unreachable nodes behind
    /// when they discard a subtree; after compaction the root is index 0.
    pub(crate) fn compact(&mut self) {
        let mut nodes = Vec::with_capacity(self.nodes.len());
        let root = Self::copy_subtree(&self.nodes, &mut nodes, self.root, None);
        self.nodes = nodes;
        self.root = root;
    }

    fn copy_subtree(
        source: &[Node],
        target: &mut Vec<Node>,
        index: NodeIndex,
        parent: Option<NodeIndex>,
    ) -> NodeIndex {
        let node = &source[index.index()];
        let copy = NodeIndex::new(target.len());
        // Placeholder leaf first so children see a valid parent index.
        target.push(Node::new(node.content().clone(), NodeKind::Leaf, parent));
        if let NodeKind::Internal {
            attribute,
            cut,
            children,
            subtree_error,
        } = node.kind()
        {
            let children = children
                .iter()
                .map(|&child| Self::copy_subtree(source, target, child, Some(copy)))
                .collect();
            target[copy.index()].set_internal(NodeKind::Internal {
                attribute: *attribute,
                cut: *cut,
                children,
                subtree_error: *subtree_error,
            });
        }
        copy
    }

    /// Return the schema the model was trained against.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Return the root node index.
    #[must_use]
    pub fn root(&self) -> NodeIndex {
        self.root
    }

    /// Return the node at `index`.
    ///
    /// # Panics
    ///
    /// Panics when `index` did not come from this model.
    #[must_use]
    pub fn node(&self, index: NodeIndex) -> &Node {
        &self.nodes[index.index()]
    }

    pub(crate) fn node_mut(&mut self, index: NodeIndex) -> &mut Node {
        &mut self.nodes[index.index()]
    }

    pub(crate) fn set_root(&mut self, root: NodeIndex) {
        self.root = root;
    }

    /// Return the total number of nodes in the tree (both splits and
    /// leaves).
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Return the number of leaf nodes.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_leaf()).count()
    }

    /// Return the maximum depth of the tree in edges.
    ///
    /// A single-leaf tree has depth 0. Uses an iterative BFS approach.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut max_depth = 0usize;
        let mut queue = VecDeque::new();
        queue.push_back((self.root, 0usize));
        while let Some((index, depth)) = queue.pop_front() {
            max_depth = max_depth.max(depth);
            for &child in self.nodes[index.index()].children() {
                queue.push_back((child, depth + 1));
            }
        }
        max_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{AttributeSpec, Schema};
    use crate::node::{AttributeIndex, NodeContent};
    use crate::testdata::strings;

    fn toy_schema() -> Schema {
        Schema::new(
            vec![
                AttributeSpec::continuous("x"),
                AttributeSpec::discrete("label", strings(&["a", "b"])),
            ],
            1,
        )
        .unwrap()
    }

    fn leaf(weight: f64, parent: Option<NodeIndex>) -> Node {
        Node::new(
            NodeContent::from_distribution(vec![weight, 0.0], 0),
            NodeKind::Leaf,
            parent,
        )
    }

    #[test]
    fn compaction_drops_unreachable_nodes() {
        // Arena with a dangling leaf at index 0 left by a reverted split;
        // the live tree is root=1 with children 2 and 3.
        let mut nodes = vec![leaf(9.0, None)];
        nodes.push(Node::new(
            NodeContent::from_distribution(vec![3.0, 3.0], 0),
            NodeKind::Internal {
                attribute: AttributeIndex::new(0),
                cut: None,
                children: vec![NodeIndex::new(2), NodeIndex::new(3)],
                subtree_error: 0.0,
            },
            None,
        ));
        nodes.push(leaf(3.0, Some(NodeIndex::new(1))));
        nodes.push(leaf(3.0, Some(NodeIndex::new(1))));

        let model = TreeModel::new(toy_schema(), nodes, NodeIndex::new(1));

        assert_eq!(model.node_count(), 3);
        assert_eq!(model.root().index(), 0);
        let root = model.node(model.root());
        assert_eq!(root.children().len(), 2);
        for &child in root.children() {
            assert_eq!(model.node(child).parent(), Some(model.root()));
            assert!(model.node(child).is_leaf());
        }
    }

    #[test]
    fn counts_and_depth() {
        let dataset = crate::testdata::separable();
        let delegates = crate::delegate::build_delegates(&dataset);
        let (nodes, root) = crate::builder::TreeBuilder::new(&dataset, &delegates, 2.0).run();
        let model = TreeModel::new(dataset.schema().clone(), nodes, root);

        assert_eq!(model.node_count(), 3);
        assert_eq!(model.leaf_count(), 2);
        assert_eq!(model.depth(), 1);
        assert!(!model.node(model.root()).is_leaf());
    }

    #[test]
    fn single_leaf_tree_has_depth_zero() {
        let model = TreeModel::new(toy_schema(), vec![leaf(4.0, None)], NodeIndex::new(0));
        assert_eq!(model.depth(), 0);
        assert_eq!(model.leaf_count(), 1);
    }
}
