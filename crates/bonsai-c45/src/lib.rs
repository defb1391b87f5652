//! C4.5 decision tree classification: train, prune, classify.
//!
//! Provides a hand-rolled C4.5 classifier over mixed continuous/nominal
//! attributes with gain-ratio split selection, fractional weighting of
//! missing values, error-based pruning with subtree raising, plain-text
//! rendering, and model serialization.

mod builder;
mod classify;
mod config;
mod dataset;
mod delegate;
mod error;
mod estimate;
mod gain;
mod node;
mod prune;
mod render;
mod serialize;
#[cfg(test)]
mod testdata;
mod tree;

pub use classify::EvaluationReport;
pub use config::C45Config;
pub use dataset::{AttributeKind, AttributeSpec, Dataset, Schema};
pub use error::C45Error;
pub use node::{AttributeIndex, Cut, Node, NodeContent, NodeIndex, NodeKind};
pub use prune::prune;
pub use render::PlainView;
pub use tree::TreeModel;
