//! Error-based pruning with subtree raising.

use tracing::{debug, instrument};

use crate::dataset::Dataset;
use crate::delegate::{
    AttributeDelegate, BranchCriterion, BranchDistribution, CaseOrder, build_delegates,
};
use crate::error::C45Error;
use crate::estimate::extra_error;
use crate::node::{NodeContent, NodeIndex, NodeKind};
use crate::tree::TreeModel;

/// Comparison slack for pruning decisions; a simpler shape wins unless the
/// more complex one beats it by more than this.
const SLACK: f64 = 0.1;

/// Whether a descent may rewrite the tree.
///
/// Branch-error estimation descends the heaviest child over the full range
/// as a trial; letting that descent raise subtrees of its own would compound
/// raising and destroy correct subtrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Update,
    Trial,
}

/// Simplify a fitted tree against pessimistic error estimates.
///
/// Re-walks the training cases through the tree with the builder's grouping
/// logic and, bottom-up, replaces each test by a leaf or by its
/// largest-weight branch whenever the estimated error does not suffer.
/// Running it again on the result changes nothing.
///
/// # Errors
///
/// | Variant | When |
/// |---------|------|
/// | [`C45Error::SchemaMismatch`] | `dataset` was not read under the model's schema |
#[instrument(skip(dataset, model), fields(n_cases = dataset.case_count()))]
pub fn prune(dataset: &Dataset, model: &mut TreeModel) -> Result<(), C45Error> {
    if dataset.schema() != model.schema() {
        return Err(C45Error::SchemaMismatch);
    }
    let delegates = build_delegates(dataset);
    let root = model.root();
    let case_count = dataset.case_count();

    let (new_root, error) = {
        let mut pruner = TreePruner::new(dataset, &delegates, model);
        pruner.prune_node(root, 0, case_count, Pass::Update)
    };
    if new_root != root {
        model.node_mut(new_root).set_parent(None);
        model.set_root(new_root);
    }
    model.compact();

    debug!(
        n_nodes = model.node_count(),
        n_leaves = model.leaf_count(),
        estimated_error = error,
        "pruning pass complete"
    );
    Ok(())
}

/// One pruning pass over a fitted tree.
///
/// Owns a fresh unit-weight case order; grouping mutates it exactly as
/// construction did, so every node sees the cases that reach it.
struct TreePruner<'a> {
    delegates: &'a [AttributeDelegate],
    model: &'a mut TreeModel,
    classes: Vec<usize>,
    class_count: usize,
    order: CaseOrder,
}

impl<'a> TreePruner<'a> {
    fn new(
        dataset: &Dataset,
        delegates: &'a [AttributeDelegate],
        model: &'a mut TreeModel,
    ) -> Self {
        let classes = (0..dataset.case_count())
            .map(|case| dataset.class_of(case))
            .collect();
        Self {
            delegates,
            model,
            classes,
            class_count: dataset.schema().class_count(),
            order: CaseOrder::identity(dataset.case_count()),
        }
    }

    /// Prune the subtree at `index` against the cases in `[first, last)`.
    ///
    /// Returns the node now standing in this position (the node itself, or
    /// the child raised over it) and its estimated error. Trial passes never
    /// mutate and never raise.
    fn prune_node(
        &mut self,
        index: NodeIndex,
        first: usize,
        last: usize,
        pass: Pass,
    ) -> (NodeIndex, f64) {
        // Pessimistic content over the range now reaching this node;
        // majority ties keep the previous classification.
        let previous = self.model.node(index).content().classification();
        let content = self.range_content(first, last, previous);
        let leaf_error = content.leaf_error();
        let total_weight = content.total_weight();

        let (attribute, cut, mut children) = match self.model.node(index).kind() {
            NodeKind::Leaf => {
                if pass == Pass::Update {
                    self.model.node_mut(index).set_content(content);
                }
                return (index, leaf_error);
            }
            NodeKind::Internal {
                attribute,
                cut,
                children,
                ..
            } => (*attribute, *cut, children.clone()),
        };
        if pass == Pass::Update {
            self.model.node_mut(index).set_content(content.clone());
        }

        let delegates = self.delegates;
        let delegate = &delegates[attribute.index()];

        // Regroup the range exactly as construction did: missing cases
        // first, then each branch, the last as remainder.
        let branch_count = delegate.branch_count();
        let mut distribution = BranchDistribution::new(branch_count);
        let missing_end = if delegate.has_missing() {
            delegate.group_forward(
                &mut self.order,
                first,
                last,
                BranchCriterion::Missing,
                &mut distribution,
            )
        } else {
            first
        };
        let missing_len = missing_end - first;
        let known_weight = total_weight - distribution.missing();

        let mut tree_error = 0.0;
        let mut heaviest: Option<(usize, f64)> = None;
        let mut group_begin = missing_end;
        for branch in 0..branch_count {
            let next_begin = if branch + 1 == branch_count {
                distribution.set_branch(branch, total_weight - distribution.assigned());
                last
            } else {
                let criterion = match cut {
                    Some(cut) => BranchCriterion::RankAtMost(cut.rank),
                    None => BranchCriterion::Branch(branch),
                };
                delegate.group_forward(
                    &mut self.order,
                    group_begin,
                    last,
                    criterion,
                    &mut distribution,
                )
            };

            // Empty branches contribute nothing and keep their stale leaf.
            if next_begin > group_begin {
                let branch_weight = distribution.branch(branch);
                if heaviest.is_none_or(|(_, weight)| branch_weight > weight) {
                    heaviest = Some((branch, branch_weight));
                }

                let child = children[branch];
                let (new_child, child_error) = if missing_len > 0 {
                    let ratio = distribution.branch(branch) / known_weight;
                    let segment_first = group_begin - missing_len;
                    self.order.scale_weights(segment_first, group_begin, ratio);
                    let result = self.prune_node(child, segment_first, next_begin, pass);
                    let missing_begin =
                        delegate.group_backward(&mut self.order, segment_first, next_begin);
                    self.order.divide_weights(missing_begin, next_begin, ratio);
                    result
                } else {
                    self.prune_node(child, group_begin, next_begin, pass)
                };
                if pass == Pass::Update && new_child != child {
                    children[branch] = new_child;
                    self.model.node_mut(index).set_child(branch, new_child);
                    self.model.node_mut(new_child).set_parent(Some(index));
                }
                tree_error += child_error;
            }
            group_begin = next_begin;
        }

        // Trial descents stop here: report the kept subtree's error with no
        // second round of raising.
        if pass == Pass::Trial {
            return (index, tree_error);
        }

        let raised = heaviest.map(|(branch, _)| children[branch]);
        let branch_error = match raised {
            Some(child) => self.prune_node(child, first, last, Pass::Trial).1,
            None => f64::INFINITY,
        };

        if leaf_error <= branch_error + SLACK && leaf_error <= tree_error + SLACK {
            self.model.node_mut(index).collapse_to_leaf(content);
            return (index, leaf_error);
        }
        if let Some(child) = raised
            && branch_error <= tree_error + SLACK
        {
            // Subtree raising: the heaviest branch takes over the whole
            // range; the caller rewires it into this node's place.
            return self.prune_node(child, first, last, Pass::Update);
        }
        self.model.node_mut(index).set_subtree_error(tree_error);
        (index, tree_error)
    }

    /// Weighted class distribution of a range with the pessimistic error
    /// penalty folded into the leaf error.
    fn range_content(&self, first: usize, last: usize, previous_class: usize) -> NodeContent {
        let mut distribution = vec![0.0; self.class_count];
        for (case, weight) in self.order.iter(first, last) {
            distribution[self.classes[case]] += weight;
        }
        let mut content = NodeContent::from_distribution(distribution, previous_class);
        content.add_leaf_error(extra_error(content.total_weight(), content.leaf_error()));
        content
    }
}
