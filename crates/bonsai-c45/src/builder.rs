//! Recursive top-down tree construction.

use fixedbitset::FixedBitSet;
use tracing::debug;

use crate::dataset::Dataset;
use crate::delegate::{
    AttributeDelegate, BranchCriterion, BranchDistribution, CaseOrder, Evaluation,
};
use crate::gain::{EPSILON, PRECISION, gain_ratio};
use crate::node::{AttributeIndex, Cut, Node, NodeContent, NodeIndex, NodeKind};

/// Attributes still eligible as test attributes along the current path.
///
/// A discrete attribute tested by an ancestor cannot be retested below it;
/// the builder disables it for the subtree and re-enables it afterwards.
/// Continuous attributes stay eligible at every depth.
#[derive(Debug)]
struct CandidateSet {
    bits: FixedBitSet,
}

impl CandidateSet {
    /// Every attribute except the class starts as a candidate.
    fn new(attribute_count: usize, class_index: usize) -> Self {
        let mut bits = FixedBitSet::with_capacity(attribute_count);
        bits.insert_range(..);
        bits.set(class_index, false);
        Self { bits }
    }

    fn is_empty(&self) -> bool {
        self.bits.count_ones(..) == 0
    }

    fn contains(&self, attribute: AttributeIndex) -> bool {
        self.bits.contains(attribute.index())
    }

    fn disable(&mut self, attribute: AttributeIndex) {
        self.bits.set(attribute.index(), false);
    }

    fn enable(&mut self, attribute: AttributeIndex) {
        self.bits.set(attribute.index(), true);
    }
}

/// Winning attribute of one selection round.
#[derive(Debug, Clone, Copy)]
struct Selection {
    attribute: AttributeIndex,
    ratio: f64,
    cut_ranks: Option<(usize, usize)>,
}

/// One tree-construction pass over a validated dataset.
///
/// Owns the shared case order for the pass; attribute delegates are borrowed
/// so grouping calls can run while the builder recurses.
pub(crate) struct TreeBuilder<'a> {
    dataset: &'a Dataset,
    delegates: &'a [AttributeDelegate],
    classes: Vec<usize>,
    class_count: usize,
    min_split_weight: f64,
    order: CaseOrder,
    candidates: CandidateSet,
    nodes: Vec<Node>,
}

impl<'a> TreeBuilder<'a> {
    pub(crate) fn new(
        dataset: &'a Dataset,
        delegates: &'a [AttributeDelegate],
        min_split_weight: f64,
    ) -> Self {
        let classes = (0..dataset.case_count())
            .map(|case| dataset.class_of(case))
            .collect();
        Self {
            dataset,
            delegates,
            classes,
            class_count: dataset.schema().class_count(),
            min_split_weight,
            order: CaseOrder::identity(dataset.case_count()),
            candidates: CandidateSet::new(
                dataset.attribute_count(),
                dataset.schema().class_index(),
            ),
            nodes: Vec::new(),
        }
    }

    /// Build the whole tree; returns the arena and the root index.
    ///
    /// The arena still contains the nodes of discarded splits; the caller
    /// compacts before handing the model out.
    pub(crate) fn run(mut self) -> (Vec<Node>, NodeIndex) {
        let case_count = self.dataset.case_count();
        let root = self.build_node(0, case_count, None);
        debug!(
            arena = self.nodes.len(),
            root = root.index(),
            "construction pass complete"
        );
        (self.nodes, root)
    }

    /// Build the node for `[first, last)` and its subtree.
    fn build_node(&mut self, first: usize, last: usize, parent: Option<NodeIndex>) -> NodeIndex {
        // 1. Content over the active range.
        let content = self.range_content(first, last);
        let total_weight = content.total_weight();

        // 2. Too light to split, or nothing left to test.
        if total_weight <= self.min_split_weight || self.candidates.is_empty() {
            return self.push_leaf(content, parent);
        }

        // 3. Best attribute by bias-corrected gain ratio.
        let Some(selection) = self.select_attribute(first, last) else {
            return self.push_leaf(content, parent);
        };
        let delegates = self.delegates;
        let delegate = &delegates[selection.attribute.index()];

        // 4. Cut bookkeeping for a continuous winner; a discrete winner is
        //    excluded from re-selection inside its own subtree.
        let cut = selection.cut_ranks.map(|(rank_below, rank_above)| {
            let rank = delegate.find_cut_rank(rank_below, rank_above);
            Cut {
                value: delegate.find_cut(rank),
                rank,
            }
        });
        if !delegate.is_continuous() {
            self.candidates.disable(selection.attribute);
        }

        // Arena pattern: reserve the slot, recurse, then overwrite the kind.
        let node_index = NodeIndex::new(self.nodes.len());
        self.nodes
            .push(Node::new(content.clone(), NodeKind::Leaf, parent));

        // 5. Missing cases first; the missing segment then rides immediately
        //    in front of each branch segment so every recursion covers one
        //    contiguous range, and group_backward parks it before the next
        //    branch after the recursion returns.
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

        let mut children = Vec::with_capacity(branch_count);
        let mut subtree_error = 0.0;
        let mut group_begin = missing_end;
        for branch in 0..branch_count {
            let next_begin = if branch + 1 == branch_count {
                // Remainder branch: whatever the earlier groupings left.
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

            let child = if next_begin == group_begin {
                // Empty branch: zero-weight leaf inheriting the parent class.
                self.push_leaf(
                    NodeContent::empty(content.classification(), self.class_count),
                    Some(node_index),
                )
            } else if missing_len > 0 {
                let ratio = distribution.branch(branch) / known_weight;
                let segment_first = group_begin - missing_len;
                self.order.scale_weights(segment_first, group_begin, ratio);
                let child = self.build_node(segment_first, next_begin, Some(node_index));
                let missing_begin =
                    delegate.group_backward(&mut self.order, segment_first, next_begin);
                self.order.divide_weights(missing_begin, next_begin, ratio);
                child
            } else {
                self.build_node(group_begin, next_begin, Some(node_index))
            };

            subtree_error += self.nodes[child.index()].train_error();
            children.push(child);
            group_begin = next_begin;
        }

        // 6. The discrete winner becomes selectable again outside this
        //    subtree.
        if !delegate.is_continuous() {
            self.candidates.enable(selection.attribute);
        }

        // 7. Keep the split only when it beats the leaf by more than the
        //    comparison slack; otherwise the reserved slot stays a leaf and
        //    the children become unreachable.
        if subtree_error - content.leaf_error() < -PRECISION {
            self.nodes[node_index.index()].set_internal(NodeKind::Internal {
                attribute: selection.attribute,
                cut,
                children,
                subtree_error,
            });
        }
        node_index
    }

    /// Weighted class distribution of a range, majority ties to the lowest
    /// class index.
    fn range_content(&self, first: usize, last: usize) -> NodeContent {
        let mut distribution = vec![0.0; self.class_count];
        for (case, weight) in self.order.iter(first, last) {
            distribution[self.classes[case]] += weight;
        }
        NodeContent::from_distribution(distribution, 0)
    }

    fn push_leaf(&mut self, content: NodeContent, parent: Option<NodeIndex>) -> NodeIndex {
        let index = NodeIndex::new(self.nodes.len());
        self.nodes.push(Node::new(content, NodeKind::Leaf, parent));
        index
    }

    /// Rank the candidate attributes over `[first, last)`.
    ///
    /// Only feasible attributes rank: positive gain, and a branch count
    /// under 30% of the dataset's case count + 1 (the multi-value guard that
    /// keeps near-unique identifiers out). Among those, attributes whose
    /// gain falls below the feasible average by more than EPSILON are
    /// dropped, and a candidate must beat the incumbent's gain ratio by at
    /// least PRECISION, so exact ties keep the earlier attribute.
    fn select_attribute(&self, first: usize, last: usize) -> Option<Selection> {
        let branch_limit = 0.3 * (self.dataset.case_count() as f64 + 1.0);

        let mut feasible: Vec<(AttributeIndex, Evaluation)> = Vec::new();
        let mut gain_sum = 0.0;
        for delegate in self.delegates {
            if !self.candidates.contains(delegate.attribute()) {
                continue;
            }
            let Some(evaluation) =
                delegate.evaluate(&self.order, first, last, &self.classes, self.class_count)
            else {
                continue;
            };
            if evaluation.gain > 0.0 && (delegate.branch_count() as f64) < branch_limit {
                gain_sum += evaluation.gain;
                feasible.push((delegate.attribute(), evaluation));
            }
        }
        if feasible.is_empty() {
            return None;
        }
        let average_gain = gain_sum / feasible.len() as f64;

        let mut best: Option<Selection> = None;
        for (attribute, evaluation) in feasible {
            if evaluation.gain < average_gain - EPSILON {
                continue;
            }
            let Some(ratio) = gain_ratio(evaluation.gain, evaluation.split_info) else {
                continue;
            };
            let better = match &best {
                None => true,
                Some(incumbent) => ratio >= incumbent.ratio + PRECISION,
            };
            if better {
                best = Some(Selection {
                    attribute,
                    ratio,
                    cut_ranks: evaluation.cut_ranks,
                });
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{AttributeSpec, Schema};
    use crate::delegate::build_delegates;
    use crate::testdata;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn build(dataset: &Dataset, min_split_weight: f64) -> (Vec<Node>, NodeIndex) {
        let delegates = build_delegates(dataset);
        TreeBuilder::new(dataset, &delegates, min_split_weight).run()
    }

    // --- CandidateSet ---

    #[test]
    fn candidates_exclude_the_class() {
        let mut candidates = CandidateSet::new(3, 2);
        assert!(candidates.contains(AttributeIndex::new(0)));
        assert!(!candidates.contains(AttributeIndex::new(2)));
        candidates.disable(AttributeIndex::new(0));
        candidates.disable(AttributeIndex::new(1));
        assert!(candidates.is_empty());
        candidates.enable(AttributeIndex::new(1));
        assert!(!candidates.is_empty());
    }

    // --- construction ---

    #[test]
    fn separable_data_splits_once_at_five() {
        let dataset = testdata::separable();
        let (nodes, root) = build(&dataset, 2.0);

        let root_node = &nodes[root.index()];
        let NodeKind::Internal {
            attribute,
            cut,
            children,
            subtree_error,
        } = root_node.kind()
        else {
            panic!("root must be a split");
        };
        assert_eq!(attribute.index(), 0);
        let cut = cut.expect("continuous test carries a cut");
        assert!((cut.value - 5.0).abs() < 1e-9);
        assert_eq!(cut.rank, 2);
        assert_eq!(children.len(), 2);
        assert!(subtree_error.abs() < 1e-9);

        for &child in children {
            let node = &nodes[child.index()];
            assert!(node.is_leaf());
            assert!((node.content().total_weight() - 3.0).abs() < 1e-9);
        }
    }

    #[test]
    fn pure_range_stays_a_leaf() {
        let schema = Schema::new(
            vec![
                AttributeSpec::continuous("x"),
                AttributeSpec::discrete("label", strings(&["a", "b"])),
            ],
            1,
        )
        .unwrap();
        let rows = (0..8).map(|i| strings(&[&i.to_string(), "a"])).collect();
        let dataset = Dataset::new("pure", schema, rows).unwrap();
        let (nodes, root) = build(&dataset, 2.0);
        assert!(nodes[root.index()].is_leaf());
        assert!(nodes[root.index()].content().leaf_error().abs() < 1e-9);
    }

    #[test]
    fn heavy_minimum_weight_stops_splitting() {
        let dataset = testdata::separable();
        let (nodes, root) = build(&dataset, 100.0);
        assert!(nodes[root.index()].is_leaf());
    }

    #[test]
    fn unique_id_attribute_is_never_selected() {
        let dataset = testdata::unique_ids();
        let (nodes, root) = build(&dataset, 2.0);
        // The id column has maximal raw gain but too many branches to be
        // feasible, and nothing else carries signal.
        assert!(nodes[root.index()].is_leaf());
    }

    #[test]
    fn unhelpful_split_reverts_to_a_leaf() {
        // Branch u: 3 yes / 1 no, branch v: 3 yes / 3 no. The split gains
        // entropy but not a single error, so construction discards it.
        let schema = Schema::new(
            vec![
                AttributeSpec::discrete("a", strings(&["u", "v"])),
                AttributeSpec::discrete("play", strings(&["yes", "no"])),
            ],
            1,
        )
        .unwrap();
        let mut rows: Vec<Vec<String>> = Vec::new();
        for _ in 0..3 {
            rows.push(strings(&["u", "yes"]));
        }
        rows.push(strings(&["u", "no"]));
        for _ in 0..3 {
            rows.push(strings(&["v", "yes"]));
        }
        for _ in 0..3 {
            rows.push(strings(&["v", "no"]));
        }
        let dataset = Dataset::new("flat-gain", schema, rows).unwrap();

        let (nodes, root) = build(&dataset, 2.0);
        let root_node = &nodes[root.index()];
        assert!(root_node.is_leaf());
        assert_eq!(root_node.content().classification(), 0);
        assert!((root_node.content().leaf_error() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn weather_root_splits_on_outlook() {
        let dataset = testdata::weather();
        let (nodes, root) = build(&dataset, 4.0);

        let NodeKind::Internal {
            attribute,
            cut,
            children,
            subtree_error,
        } = nodes[root.index()].kind()
        else {
            panic!("weather root must be a split");
        };
        assert_eq!(attribute.index(), 0, "outlook wins the root");
        assert!(cut.is_none());
        assert_eq!(children.len(), 3);
        assert!(
            subtree_error.abs() < 1e-9,
            "weather trains to zero error, got {subtree_error}"
        );
        assert!((nodes[root.index()].content().total_weight() - 14.0).abs() < 1e-9);
    }

    #[test]
    fn missing_values_spread_weight_over_branches() {
        let dataset = testdata::missing_split();
        let (nodes, root) = build(&dataset, 4.0);

        let NodeKind::Internal { children, .. } = nodes[root.index()].kind() else {
            panic!("root must be a split");
        };
        let total: f64 = children
            .iter()
            .map(|&child| nodes[child.index()].content().total_weight())
            .sum();
        assert!(
            (total - 8.0).abs() < 1e-9,
            "children must conserve the root weight, got {total}"
        );
        // Known split 3:4, one missing case follows proportionally.
        let low = nodes[children[0].index()].content().total_weight();
        let high = nodes[children[1].index()].content().total_weight();
        assert!((low - (3.0 + 3.0 / 7.0)).abs() < 1e-9);
        assert!((high - (4.0 + 4.0 / 7.0)).abs() < 1e-9);
    }

    #[test]
    fn mass_is_conserved_at_every_split() {
        let dataset = testdata::weather();
        let (nodes, root) = build(&dataset, 4.0);
        let mut stack = vec![root];
        while let Some(index) = stack.pop() {
            let node = &nodes[index.index()];
            let distribution_sum: f64 = node.content().distribution().iter().sum();
            assert!((distribution_sum - node.content().total_weight()).abs() < 1e-9);
            if let NodeKind::Internal { children, .. } = node.kind() {
                let child_sum: f64 = children
                    .iter()
                    .map(|&child| nodes[child.index()].content().total_weight())
                    .sum();
                assert!((child_sum - node.content().total_weight()).abs() < 1e-9);
                stack.extend_from_slice(children);
            }
        }
    }
}
