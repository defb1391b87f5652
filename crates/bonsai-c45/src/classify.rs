//! Weighted record classification.

use crate::dataset::Dataset;
use crate::error::C45Error;
use crate::gain::PRECISION;
use crate::node::{NodeIndex, NodeKind};
use crate::tree::TreeModel;

/// Outcome of classifying a labeled dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationReport {
    /// Number of classified cases.
    pub cases: usize,
    /// Number of misclassified cases.
    pub errors: usize,
    /// `errors / cases`.
    pub error_rate: f64,
}

impl TreeModel {
    /// Classify one record, returning the predicted class label.
    ///
    /// The record is a full-width row in schema order; the class slot is
    /// ignored and may be `?`. Ties in the accumulated distribution resolve
    /// to the lowest class index.
    ///
    /// # Errors
    ///
    /// | Variant | When |
    /// |---------|------|
    /// | [`C45Error::RecordWidthMismatch`] | record length differs from the schema |
    /// | [`C45Error::UnknownRecordValue`] | a consulted discrete value is outside its vocabulary |
    /// | [`C45Error::UnparsableRecordNumber`] | a consulted continuous value does not parse |
    pub fn classify<S: AsRef<str>>(&self, record: &[S]) -> Result<&str, C45Error> {
        let distribution = self.class_distribution_for(record)?;
        let mut best = 0;
        for (class, &weight) in distribution.iter().enumerate() {
            if weight > distribution[best] {
                best = class;
            }
        }
        Ok(&self.schema().class_values()[best])
    }

    /// Return the accumulated per-class weight for one record.
    ///
    /// The record enters the root with weight 1.0; at a test whose value is
    /// missing the weight fans out over every branch in proportion to its
    /// training weight, so the result always sums to 1.0.
    ///
    /// # Errors
    ///
    /// Same conditions as [`TreeModel::classify`].
    pub fn class_distribution_for<S: AsRef<str>>(
        &self,
        record: &[S],
    ) -> Result<Vec<f64>, C45Error> {
        let schema = self.schema();
        if record.len() != schema.attribute_count() {
            return Err(C45Error::RecordWidthMismatch {
                expected: schema.attribute_count(),
                got: record.len(),
            });
        }
        let mut accumulator = vec![0.0; schema.class_count()];
        self.spread(self.root(), 1.0, record, &mut accumulator)?;
        Ok(accumulator)
    }

    fn spread<S: AsRef<str>>(
        &self,
        index: NodeIndex,
        weight: f64,
        record: &[S],
        accumulator: &mut [f64],
    ) -> Result<(), C45Error> {
        let node = self.node(index);
        let content = node.content();
        let NodeKind::Internal {
            attribute,
            cut,
            children,
            ..
        } = node.kind()
        else {
            // Leaf: split the weight over the training distribution; a leaf
            // no training case reached gives everything to its class.
            let total = content.total_weight();
            if total > 0.0 {
                for (slot, class_weight) in accumulator.iter_mut().zip(content.distribution()) {
                    *slot += weight * class_weight / total;
                }
            } else {
                accumulator[content.classification()] += weight;
            }
            return Ok(());
        };

        let raw = record[attribute.index()].as_ref();
        if Dataset::is_missing(raw) {
            let node_total = content.total_weight();
            for &child in children {
                let share = self.node(child).content().total_weight() / node_total;
                self.spread(child, weight * share, record, accumulator)?;
            }
            return Ok(());
        }

        let spec = self.schema().attribute(attribute.index());
        let branch = match cut {
            Some(cut) => {
                let value: f64 = raw
                    .parse()
                    .ok()
                    .filter(|value: &f64| value.is_finite())
                    .ok_or_else(|| C45Error::UnparsableRecordNumber {
                        attribute: spec.name().to_string(),
                        raw: raw.to_string(),
                    })?;
                if value < cut.value + PRECISION { 0 } else { 1 }
            }
            None => {
                spec.value_index(raw)
                    .ok_or_else(|| C45Error::UnknownRecordValue {
                        attribute: spec.name().to_string(),
                        value: raw.to_string(),
                    })?
            }
        };
        self.spread(children[branch], weight, record, accumulator)
    }

    /// Classify every row of a labeled dataset and count the mistakes.
    ///
    /// # Errors
    ///
    /// [`C45Error::SchemaMismatch`] when `dataset` was not read under the
    /// model's schema, plus any per-record classification error.
    pub fn evaluate(&self, dataset: &Dataset) -> Result<EvaluationReport, C45Error> {
        if dataset.schema() != self.schema() {
            return Err(C45Error::SchemaMismatch);
        }
        let cases = dataset.case_count();
        let mut errors = 0usize;
        for case in 0..cases {
            let predicted = self.classify(dataset.row(case))?;
            if predicted != self.schema().class_values()[dataset.class_of(case)] {
                errors += 1;
            }
        }
        Ok(EvaluationReport {
            cases,
            errors,
            error_rate: errors as f64 / cases as f64,
        })
    }
}
