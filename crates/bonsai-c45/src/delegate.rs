//! Per-attribute split evaluation and in-place case grouping.
//!
//! Construction and pruning both walk the tree over one shared permutation of
//! case ids plus a parallel weight array ([`CaseOrder`]). Each attribute gets
//! a delegate bound to its dataset column; delegates score candidate splits
//! over a case range and physically regroup the range by branch, so recursive
//! descent always operates on contiguous sub-ranges without reallocating.

use crate::dataset::{AttributeKind, Dataset};
use crate::gain::distribution_entropy;
use crate::node::AttributeIndex;

/// Shared case permutation and per-case weights for one build or prune pass.
///
/// The half-open range `[first, last)` over `cases` denotes the cases reaching
/// the current node. Grouping permutes within a range and never changes the
/// case set it contains; weight scaling around a recursive call is always
/// undone by the caller.
#[derive(Debug)]
pub(crate) struct CaseOrder {
    cases: Vec<usize>,
    weights: Vec<f64>,
    scratch: Vec<(usize, f64)>,
}

impl CaseOrder {
    /// Identity permutation over `case_count` cases, all weights 1.0.
    pub(crate) fn identity(case_count: usize) -> Self {
        Self {
            cases: (0..case_count).collect(),
            weights: vec![1.0; case_count],
            scratch: Vec::with_capacity(case_count),
        }
    }

    /// Iterate `(case id, weight)` pairs over `[first, last)`.
    pub(crate) fn iter(
        &self,
        first: usize,
        last: usize,
    ) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.cases[first..last]
            .iter()
            .zip(&self.weights[first..last])
            .map(|(&case, &weight)| (case, weight))
    }

    /// Sum of weights over `[first, last)`.
    pub(crate) fn total_weight(&self, first: usize, last: usize) -> f64 {
        self.weights[first..last].iter().sum()
    }

    /// Multiply every weight in `[first, last)` by `factor`.
    pub(crate) fn scale_weights(&mut self, first: usize, last: usize, factor: f64) {
        for weight in &mut self.weights[first..last] {
            *weight *= factor;
        }
    }

    /// Divide every weight in `[first, last)` by `factor`, undoing a prior
    /// [`CaseOrder::scale_weights`] with the same factor.
    pub(crate) fn divide_weights(&mut self, first: usize, last: usize, factor: f64) {
        for weight in &mut self.weights[first..last] {
            *weight /= factor;
        }
    }

    /// Stable partition of `[first, last)`: cases accepted by `keep` move to
    /// the front, the rest to the back, both sides in their original relative
    /// order. Returns the boundary index.
    ///
    /// Rejected pairs detour through a reused scratch buffer, so a partition
    /// costs O(range) with no per-call allocation once the buffer has grown.
    pub(crate) fn partition(
        &mut self,
        first: usize,
        last: usize,
        mut keep: impl FnMut(usize, f64) -> bool,
    ) -> usize {
        self.scratch.clear();
        let mut write = first;
        for read in first..last {
            let case = self.cases[read];
            let weight = self.weights[read];
            if keep(case, weight) {
                self.cases[write] = case;
                self.weights[write] = weight;
                write += 1;
            } else {
                self.scratch.push((case, weight));
            }
        }
        for (offset, &(case, weight)) in self.scratch.iter().enumerate() {
            self.cases[write + offset] = case;
            self.weights[write + offset] = weight;
        }
        write
    }
}

/// Predicate selecting the cases of one grouping step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BranchCriterion {
    /// The attribute value is missing.
    Missing,
    /// Continuous branch 0: value rank at or below the cut rank.
    RankAtMost(usize),
    /// Discrete branch: vocabulary index equals the branch index.
    Branch(usize),
}

impl BranchCriterion {
    /// Distribution slot this criterion accumulates into.
    fn slot(self) -> usize {
        match self {
            BranchCriterion::Missing => 0,
            BranchCriterion::RankAtMost(_) => 1,
            BranchCriterion::Branch(branch) => branch + 1,
        }
    }
}

/// Weight accumulated per grouping slot at one node.
///
/// Slot 0 collects missing-value weight; slot `b + 1` collects branch `b`.
#[derive(Debug)]
pub(crate) struct BranchDistribution {
    slots: Vec<f64>,
}

impl BranchDistribution {
    pub(crate) fn new(branch_count: usize) -> Self {
        Self {
            slots: vec![0.0; branch_count + 1],
        }
    }

    /// Weight of the missing-value bucket.
    pub(crate) fn missing(&self) -> f64 {
        self.slots[0]
    }

    /// Weight of branch `branch`.
    pub(crate) fn branch(&self, branch: usize) -> f64 {
        self.slots[branch + 1]
    }

    /// Overwrite branch `branch`, used for the closing remainder branch.
    pub(crate) fn set_branch(&mut self, branch: usize, weight: f64) {
        self.slots[branch + 1] = weight;
    }

    /// Total weight assigned to any slot so far.
    pub(crate) fn assigned(&self) -> f64 {
        self.slots.iter().sum()
    }

    fn add(&mut self, slot: usize, weight: f64) {
        self.slots[slot] += weight;
    }
}

/// Outcome of evaluating one candidate attribute over a case range.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Evaluation {
    /// Information gain, scaled by the known-value weight fraction.
    pub(crate) gain: f64,
    /// Entropy of the branch-weight distribution, missing bucket included.
    pub(crate) split_info: f64,
    /// Bracketing global ranks of the winning threshold (continuous only).
    pub(crate) cut_ranks: Option<(usize, usize)>,
}

#[derive(Debug)]
enum DelegateKind {
    /// Numeric column: per-case rank into the globally sorted known values.
    Continuous {
        /// Rank of each case's value; `None` when missing.
        ranks: Vec<Option<usize>>,
        /// Known values in ascending order, ties broken by case id.
        sorted: Vec<f64>,
    },
    /// Nominal column: per-case vocabulary index.
    Discrete {
        /// Vocabulary index of each case's value; `None` when missing.
        values: Vec<Option<usize>>,
        branch_count: usize,
    },
}

/// One delegate per attribute column, class attribute included; the class
/// delegate is never evaluated but keeps indices aligned.
pub(crate) fn build_delegates(dataset: &Dataset) -> Vec<AttributeDelegate> {
    (0..dataset.attribute_count())
        .map(|index| AttributeDelegate::build(dataset, AttributeIndex::new(index)))
        .collect()
}

/// Split helper bound to one dataset column.
#[derive(Debug)]
pub(crate) struct AttributeDelegate {
    attribute: AttributeIndex,
    has_missing: bool,
    kind: DelegateKind,
}

impl AttributeDelegate {
    /// Bind a delegate to one attribute column of a validated dataset.
    pub(crate) fn build(dataset: &Dataset, attribute: AttributeIndex) -> Self {
        let case_count = dataset.case_count();
        match dataset.schema().attribute(attribute.index()).kind() {
            AttributeKind::Continuous => {
                let mut pairs: Vec<(f64, usize)> = Vec::with_capacity(case_count);
                for case in 0..case_count {
                    if let Some(value) = dataset.numeric(case, attribute.index()) {
                        pairs.push((value, case));
                    }
                }
                // Tie-break on case id so ranks are deterministic.
                pairs.sort_unstable_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
                let mut ranks = vec![None; case_count];
                for (rank, &(_, case)) in pairs.iter().enumerate() {
                    ranks[case] = Some(rank);
                }
                let has_missing = pairs.len() < case_count;
                let sorted = pairs.into_iter().map(|(value, _)| value).collect();
                Self {
                    attribute,
                    has_missing,
                    kind: DelegateKind::Continuous { ranks, sorted },
                }
            }
            AttributeKind::Discrete { values: vocabulary } => {
                let branch_count = vocabulary.len();
                let values: Vec<Option<usize>> = (0..case_count)
                    .map(|case| dataset.nominal(case, attribute.index()))
                    .collect();
                let has_missing = values.iter().any(Option::is_none);
                Self {
                    attribute,
                    has_missing,
                    kind: DelegateKind::Discrete {
                        values,
                        branch_count,
                    },
                }
            }
        }
    }

    /// The bound attribute column.
    pub(crate) fn attribute(&self) -> AttributeIndex {
        self.attribute
    }

    /// Whether any case in the dataset misses a value for this attribute.
    pub(crate) fn has_missing(&self) -> bool {
        self.has_missing
    }

    /// 2 for continuous, vocabulary size for discrete.
    pub(crate) fn branch_count(&self) -> usize {
        match &self.kind {
            DelegateKind::Continuous { .. } => 2,
            DelegateKind::Discrete { branch_count, .. } => *branch_count,
        }
    }

    pub(crate) fn is_continuous(&self) -> bool {
        matches!(self.kind, DelegateKind::Continuous { .. })
    }

    /// Score the best split of this attribute over `[first, last)`.
    ///
    /// Gain follows the fractional missing-value treatment: entropy reduction
    /// is computed over known-value cases only, then scaled by the known
    /// weight fraction; split information treats the missing bucket as one
    /// extra branch. Returns `None` when the range carries no known weight or
    /// a continuous column has no boundary between distinct values.
    pub(crate) fn evaluate(
        &self,
        order: &CaseOrder,
        first: usize,
        last: usize,
        classes: &[usize],
        class_count: usize,
    ) -> Option<Evaluation> {
        match &self.kind {
            DelegateKind::Continuous { ranks, sorted } => {
                // (rank, weight, class) per known case, then sort by rank.
                let mut items: Vec<(usize, f64, usize)> = Vec::with_capacity(last - first);
                let mut known_class = vec![0.0; class_count];
                let mut missing_weight = 0.0;
                let mut total_weight = 0.0;
                for (case, weight) in order.iter(first, last) {
                    total_weight += weight;
                    match ranks[case] {
                        Some(rank) => {
                            items.push((rank, weight, classes[case]));
                            known_class[classes[case]] += weight;
                        }
                        None => missing_weight += weight,
                    }
                }
                if items.len() < 2 {
                    return None;
                }
                items.sort_unstable_by_key(|&(rank, _, _)| rank);

                let known_weight: f64 = known_class.iter().sum();
                let known_entropy = distribution_entropy(&known_class);

                // Scan boundaries between distinct adjacent values, moving
                // one case at a time from the above side to the below side.
                let mut below_class = vec![0.0; class_count];
                let mut above_class = known_class;
                let mut below_weight = 0.0;
                let mut best: Option<(f64, usize, usize, f64)> = None;
                for window in 0..items.len() - 1 {
                    let (rank, weight, class) = items[window];
                    below_class[class] += weight;
                    above_class[class] -= weight;
                    below_weight += weight;
                    let next_rank = items[window + 1].0;
                    if sorted[rank] == sorted[next_rank] {
                        continue;
                    }
                    let above_weight = known_weight - below_weight;
                    let info = (below_weight * distribution_entropy(&below_class)
                        + above_weight * distribution_entropy(&above_class))
                        / known_weight;
                    if best.is_none_or(|(best_info, ..)| info < best_info) {
                        best = Some((info, rank, next_rank, below_weight));
                    }
                }
                let (info, rank_below, rank_above, below_weight) = best?;
                let gain = known_weight / total_weight * (known_entropy - info);
                let split_info = distribution_entropy(&[
                    missing_weight,
                    below_weight,
                    known_weight - below_weight,
                ]);
                Some(Evaluation {
                    gain,
                    split_info,
                    cut_ranks: Some((rank_below, rank_above)),
                })
            }
            DelegateKind::Discrete {
                values,
                branch_count,
            } => {
                let branch_count = *branch_count;
                let mut known_class = vec![0.0; class_count];
                // Slot 0 of `weights` is the missing bucket, as in grouping.
                let mut weights = vec![0.0; branch_count + 1];
                let mut table = vec![0.0; branch_count * class_count];
                let mut total_weight = 0.0;
                for (case, weight) in order.iter(first, last) {
                    total_weight += weight;
                    match values[case] {
                        Some(branch) => {
                            weights[branch + 1] += weight;
                            table[branch * class_count + classes[case]] += weight;
                            known_class[classes[case]] += weight;
                        }
                        None => weights[0] += weight,
                    }
                }
                let known_weight: f64 = known_class.iter().sum();
                if known_weight <= 0.0 {
                    return None;
                }
                let known_entropy = distribution_entropy(&known_class);
                let mut info = 0.0;
                for branch in 0..branch_count {
                    let branch_weight = weights[branch + 1];
                    if branch_weight > 0.0 {
                        let row = &table[branch * class_count..(branch + 1) * class_count];
                        info += branch_weight / known_weight * distribution_entropy(row);
                    }
                }
                let gain = known_weight / total_weight * (known_entropy - info);
                let split_info = distribution_entropy(&weights);
                Some(Evaluation {
                    gain,
                    split_info,
                    cut_ranks: None,
                })
            }
        }
    }

    /// Rank of the threshold: integer midpoint of the bracketing ranks
    /// returned by [`AttributeDelegate::evaluate`].
    pub(crate) fn find_cut_rank(&self, rank_below: usize, rank_above: usize) -> usize {
        (rank_below + rank_above) / 2
    }

    /// Threshold value at a cut rank: midpoint of the two neighbouring
    /// globally sorted values.
    pub(crate) fn find_cut(&self, cut_rank: usize) -> f64 {
        match &self.kind {
            DelegateKind::Continuous { sorted, .. } => {
                (sorted[cut_rank] + sorted[cut_rank + 1]) / 2.0
            }
            DelegateKind::Discrete { .. } => {
                unreachable!("cut values exist only for continuous attributes")
            }
        }
    }

    /// Whether `case` belongs to the grouping step selected by `criterion`.
    fn matches(&self, case: usize, criterion: BranchCriterion) -> bool {
        match (criterion, &self.kind) {
            (BranchCriterion::Missing, DelegateKind::Continuous { ranks, .. }) => {
                ranks[case].is_none()
            }
            (BranchCriterion::Missing, DelegateKind::Discrete { values, .. }) => {
                values[case].is_none()
            }
            (BranchCriterion::RankAtMost(cut_rank), DelegateKind::Continuous { ranks, .. }) => {
                ranks[case].is_some_and(|rank| rank <= cut_rank)
            }
            (BranchCriterion::Branch(branch), DelegateKind::Discrete { values, .. }) => {
                values[case] == Some(branch)
            }
            _ => false,
        }
    }

    /// Move the cases matching `criterion` to the front of `[first, last)`,
    /// accumulating their weight into the criterion's distribution slot.
    /// Returns the new group boundary.
    pub(crate) fn group_forward(
        &self,
        order: &mut CaseOrder,
        first: usize,
        last: usize,
        criterion: BranchCriterion,
        distribution: &mut BranchDistribution,
    ) -> usize {
        let mut matched_weight = 0.0;
        let boundary = order.partition(first, last, |case, weight| {
            if self.matches(case, criterion) {
                matched_weight += weight;
                true
            } else {
                false
            }
        });
        distribution.add(criterion.slot(), matched_weight);
        boundary
    }

    /// Re-gather the missing-value cases of `[first, last)` at the back of
    /// the range, known-value cases in front, both in stable order. Returns
    /// the index where the missing segment begins.
    pub(crate) fn group_backward(&self, order: &mut CaseOrder, first: usize, last: usize) -> usize {
        order.partition(first, last, |case, _| {
            !self.matches(case, BranchCriterion::Missing)
        })
    }
}
