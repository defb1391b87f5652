use std::fmt;

/// Zero-based attribute column index.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    serde::Serialize, serde::Deserialize,
)]
pub struct AttributeIndex(usize);

impl AttributeIndex {
    /// Create a new attribute index from a zero-based column position.
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based attribute column index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for AttributeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index into a `Vec<Node>` arena, identifying a specific node in a tree.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    serde::Serialize, serde::Deserialize,
)]
pub struct NodeIndex(usize);

impl NodeIndex {
    /// Create a new node index from a zero-based arena position.
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based arena index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Threshold of a continuous test.
///
/// The rank is the threshold's position among the attribute's globally sorted
/// training values; groupings are re-derived by rank comparison so repeated
/// walks partition exactly as the builder did.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Cut {
    /// Threshold value; a case goes to branch 0 iff its value is at or below it.
    pub value: f64,
    /// Rank of the threshold among the globally sorted training values.
    pub rank: usize,
}

/// Per-node training statistics.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NodeContent {
    total_weight: f64,
    distribution: Vec<f64>,
    classification: usize,
    leaf_error: f64,
}

impl NodeContent {
    /// Derive content from a weighted class distribution.
    ///
    /// The majority search starts at `initial_class`, so a class tying the
    /// maximum keeps `initial_class` as the classification; otherwise the
    /// lowest tied index wins. Leaf error is the raw misclassification
    /// weight; the pruner later augments it with the pessimistic estimate.
    pub(crate) fn from_distribution(distribution: Vec<f64>, initial_class: usize) -> Self {
        let total_weight: f64 = distribution.iter().sum();
        let mut classification = initial_class;
        for (class, &weight) in distribution.iter().enumerate() {
            if weight > distribution[classification] {
                classification = class;
            }
        }
        let leaf_error = total_weight - distribution[classification];
        Self {
            total_weight,
            distribution,
            classification,
            leaf_error,
        }
    }

    /// Add the pessimistic extra-error penalty onto the observed leaf error.
    pub(crate) fn add_leaf_error(&mut self, extra: f64) {
        self.leaf_error += extra;
    }

    /// Content of an empty branch: zero weight, inherited classification.
    pub(crate) fn empty(classification: usize, class_count: usize) -> Self {
        Self {
            total_weight: 0.0,
            distribution: vec![0.0; class_count],
            classification,
            leaf_error: 0.0,
        }
    }

    /// Return the total training weight that reached this node.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Return the per-class weighted distribution.
    #[must_use]
    pub fn distribution(&self) -> &[f64] {
        &self.distribution
    }

    /// Return the majority class index.
    #[must_use]
    pub fn classification(&self) -> usize {
        self.classification
    }

    /// Return the error this node incurs as a leaf.
    #[must_use]
    pub fn leaf_error(&self) -> f64 {
        self.leaf_error
    }
}

/// The payload distinguishing leaves from internal test nodes.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum NodeKind {
    /// A terminal node predicting its content's majority class.
    Leaf,
    /// An internal node testing one attribute.
    Internal {
        /// The test attribute.
        attribute: AttributeIndex,
        /// Threshold for a continuous test; `None` for discrete.
        cut: Option<Cut>,
        /// Children in branch-slot order (continuous: `≤ cut` then `> cut`;
        /// discrete: vocabulary order).
        children: Vec<NodeIndex>,
        /// Sum of the children's train errors.
        subtree_error: f64,
    },
}

/// An arena entry: content, kind, and a back-reference to the parent.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Node {
    content: NodeContent,
    kind: NodeKind,
    parent: Option<NodeIndex>,
}

impl Node {
    pub(crate) fn new(content: NodeContent, kind: NodeKind, parent: Option<NodeIndex>) -> Self {
        Self {
            content,
            kind,
            parent,
        }
    }

    /// Return the training statistics of this node.
    #[must_use]
    pub fn content(&self) -> &NodeContent {
        &self.content
    }

    /// Return the node kind.
    #[must_use]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Return the parent index; `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    /// Return `true` if this node has no parent.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Return `true` if this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf)
    }

    /// Children in branch-slot order; empty for a leaf.
    #[must_use]
    pub fn children(&self) -> &[NodeIndex] {
        match &self.kind {
            NodeKind::Leaf => &[],
            NodeKind::Internal { children, .. } => children,
        }
    }

    /// The error this node contributes to its parent's subtree error:
    /// leaf error for a leaf, rolled-up subtree error for an internal node.
    #[must_use]
    pub fn train_error(&self) -> f64 {
        match &self.kind {
            NodeKind::Leaf => self.content.leaf_error(),
            NodeKind::Internal { subtree_error, .. } => *subtree_error,
        }
    }

    pub(crate) fn set_content(&mut self, content: NodeContent) {
        self.content = content;
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeIndex>) {
        self.parent = parent;
    }

    /// Turn this node into a leaf, dropping any children.
    pub(crate) fn collapse_to_leaf(&mut self, content: NodeContent) {
        self.content = content;
        self.kind = NodeKind::Leaf;
    }

    pub(crate) fn set_internal(&mut self, kind: NodeKind) {
        self.kind = kind;
    }

    pub(crate) fn set_subtree_error(&mut self, error: f64) {
        if let NodeKind::Internal { subtree_error, .. } = &mut self.kind {
            *subtree_error = error;
        }
    }

    pub(crate) fn set_child(&mut self, slot: usize, child: NodeIndex) {
        if let NodeKind::Internal { children, .. } = &mut self.kind {
            children[slot] = child;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf_content() -> NodeContent {
        NodeContent::from_distribution(vec![7.0, 3.0], 0)
    }

    // --- indices ---

    #[test]
    fn attribute_index_roundtrip() {
        let ai = AttributeIndex::new(4);
        assert_eq!(ai.index(), 4);
        assert_eq!(format!("{ai}"), "4");
    }

    #[test]
    fn node_index_roundtrip() {
        let ni = NodeIndex::new(12);
        assert_eq!(ni.index(), 12);
        assert_eq!(format!("{ni}"), "12");
    }

    #[test]
    fn node_index_ordering() {
        assert!(NodeIndex::new(1) < NodeIndex::new(2));
    }

    // --- content ---

    #[test]
    fn content_accessors() {
        let content = leaf_content();
        assert!((content.total_weight() - 10.0).abs() < f64::EPSILON);
        assert_eq!(content.classification(), 0);
        assert!((content.leaf_error() - 3.0).abs() < f64::EPSILON);
        assert_eq!(content.distribution(), &[7.0, 3.0]);
    }

    #[test]
    fn majority_ties_keep_the_initial_class() {
        let tied = NodeContent::from_distribution(vec![2.0, 2.0], 1);
        assert_eq!(tied.classification(), 1);
        let beaten = NodeContent::from_distribution(vec![3.0, 2.0], 1);
        assert_eq!(beaten.classification(), 0);
        let lowest = NodeContent::from_distribution(vec![2.0, 2.0], 0);
        assert_eq!(lowest.classification(), 0);
    }

    #[test]
    fn extra_error_accumulates() {
        let mut content = leaf_content();
        content.add_leaf_error(1.25);
        assert!((content.leaf_error() - 4.25).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_content_inherits_classification() {
        let content = NodeContent::empty(1, 3);
        assert_eq!(content.classification(), 1);
        assert!(content.total_weight().abs() < f64::EPSILON);
        assert_eq!(content.distribution(), &[0.0, 0.0, 0.0]);
    }

    // --- node ---

    #[test]
    fn leaf_train_error_is_leaf_error() {
        let node = Node::new(leaf_content(), NodeKind::Leaf, None);
        assert!(node.is_leaf());
        assert!(node.children().is_empty());
        assert!((node.train_error() - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn internal_train_error_is_subtree_error() {
        let kind = NodeKind::Internal {
            attribute: AttributeIndex::new(0),
            cut: Some(Cut { value: 5.0, rank: 2 }),
            children: vec![NodeIndex::new(1), NodeIndex::new(2)],
            subtree_error: 1.5,
        };
        let node = Node::new(leaf_content(), kind, None);
        assert!(!node.is_leaf());
        assert_eq!(node.children().len(), 2);
        assert!((node.train_error() - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn collapse_drops_children() {
        let kind = NodeKind::Internal {
            attribute: AttributeIndex::new(0),
            cut: None,
            children: vec![NodeIndex::new(1)],
            subtree_error: 0.0,
        };
        let mut node = Node::new(leaf_content(), kind, Some(NodeIndex::new(0)));
        node.collapse_to_leaf(NodeContent::empty(0, 2));
        assert!(node.is_leaf());
        assert!(node.children().is_empty());
    }

    #[test]
    fn rewire_child_slot() {
        let kind = NodeKind::Internal {
            attribute: AttributeIndex::new(1),
            cut: None,
            children: vec![NodeIndex::new(1), NodeIndex::new(2)],
            subtree_error: 0.0,
        };
        let mut node = Node::new(leaf_content(), kind, None);
        node.set_child(1, NodeIndex::new(9));
        assert_eq!(node.children(), &[NodeIndex::new(1), NodeIndex::new(9)]);
    }
}
