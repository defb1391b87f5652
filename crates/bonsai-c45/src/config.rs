//! Training configuration and entry point.

use tracing::{debug, instrument};

use crate::builder::TreeBuilder;
use crate::dataset::Dataset;
use crate::delegate::build_delegates;
use crate::error::C45Error;
use crate::prune::prune;
use crate::tree::TreeModel;

/// Configuration for training a C4.5 decision tree.
///
/// Construct via [`C45Config::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter          | Default |
/// |--------------------|---------|
/// | `min_split_weight` | `4.0`   |
/// | `prune`            | `true`  |
#[derive(Debug, Clone, PartialEq)]
pub struct C45Config {
    min_split_weight: f64,
    prune: bool,
}

impl C45Config {
    /// Create a new config with default values.
    ///
    /// All parameters use the defaults shown in the struct-level
    /// documentation.
    #[must_use]
    pub fn new() -> Self {
        Self {
            min_split_weight: 4.0,
            prune: true,
        }
    }

    /// Set the minimum total case weight a node must exceed to be split.
    ///
    /// Raising it yields smaller, more conservative trees.
    #[must_use]
    pub fn with_min_split_weight(mut self, min_split_weight: f64) -> Self {
        self.min_split_weight = min_split_weight;
        self
    }

    /// Enable or disable error-based pruning after construction.
    #[must_use]
    pub fn with_pruning(mut self, prune: bool) -> Self {
        self.prune = prune;
        self
    }

    // --- Getters ---

    /// Return the minimum split weight.
    #[must_use]
    pub fn min_split_weight(&self) -> f64 {
        self.min_split_weight
    }

    /// Return whether pruning runs after construction.
    #[must_use]
    pub fn prune(&self) -> bool {
        self.prune
    }

    /// Train a decision tree on a validated dataset.
    ///
    /// Construction recursively partitions the cases by the attribute with
    /// the best bias-corrected gain ratio; when pruning is enabled the tree
    /// is then simplified against pessimistic error estimates.
    ///
    /// # Errors
    ///
    /// | Variant | When |
    /// |---------|------|
    /// | [`C45Error::InvalidMinSplitWeight`] | `min_split_weight` is not finite or below 1.0 |
    #[instrument(skip(self, dataset), fields(n_cases = dataset.case_count()))]
    pub fn fit(&self, dataset: &Dataset) -> Result<TreeModel, C45Error> {
        // --- Validate config ---
        if !self.min_split_weight.is_finite() || self.min_split_weight < 1.0 {
            return Err(C45Error::InvalidMinSplitWeight {
                min_split_weight: self.min_split_weight,
            });
        }

        debug!(
            n_cases = dataset.case_count(),
            n_attributes = dataset.attribute_count(),
            n_classes = dataset.schema().class_count(),
            min_split_weight = self.min_split_weight,
            "fitting decision tree"
        );

        let delegates = build_delegates(dataset);
        let (nodes, root) = TreeBuilder::new(dataset, &delegates, self.min_split_weight).run();
        let mut model = TreeModel::new(dataset.schema().clone(), nodes, root);

        debug!(
            n_nodes = model.node_count(),
            n_leaves = model.leaf_count(),
            depth = model.depth(),
            "decision tree built"
        );

        if self.prune {
            prune(dataset, &mut model)?;
            debug!(
                n_nodes = model.node_count(),
                n_leaves = model.leaf_count(),
                depth = model.depth(),
                "decision tree pruned"
            );
        }

        Ok(model)
    }
}

impl Default for C45Config {
    fn default() -> Self {
        Self::new()
    }
}
