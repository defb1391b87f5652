//! Validated in-memory datasets: attribute schemas and raw string rows.

use crate::error::C45Error;

/// Raw-value token encoding a missing entry.
pub const MISSING_TOKEN: &str = "?";

/// The kind of an attribute: numeric, or nominal over a fixed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AttributeKind {
    /// Numeric attribute; raw values parse as floating point.
    Continuous,
    /// Nominal attribute over an ordered, de-duplicated vocabulary.
    Discrete {
        /// The vocabulary, in declaration order. Branch slots follow it.
        values: Vec<String>,
    },
}

/// A named attribute column.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AttributeSpec {
    name: String,
    kind: AttributeKind,
}

impl AttributeSpec {
    /// Declare a continuous attribute.
    pub fn continuous(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::Continuous,
        }
    }

    /// Declare a discrete attribute over the given vocabulary.
    pub fn discrete(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::Discrete { values },
        }
    }

    /// Return the attribute name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the attribute kind.
    #[must_use]
    pub fn kind(&self) -> &AttributeKind {
        &self.kind
    }

    /// Return `true` for a continuous attribute.
    #[must_use]
    pub fn is_continuous(&self) -> bool {
        matches!(self.kind, AttributeKind::Continuous)
    }

    /// Vocabulary of a discrete attribute; empty slice for continuous.
    #[must_use]
    pub fn values(&self) -> &[String] {
        match &self.kind {
            AttributeKind::Continuous => &[],
            AttributeKind::Discrete { values } => values,
        }
    }

    /// Position of a nominal value in the vocabulary.
    #[must_use]
    pub fn value_index(&self, raw: &str) -> Option<usize> {
        self.values().iter().position(|v| v == raw)
    }
}

/// Ordered attribute list plus the class-attribute index.
///
/// The class attribute must be discrete; its vocabulary is the label set.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Schema {
    attributes: Vec<AttributeSpec>,
    class_index: usize,
}

impl Schema {
    /// Build a schema and validate its attribute declarations.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`C45Error::EmptySchema`] | zero attributes |
    /// | [`C45Error::ClassIndexOutOfRange`] | class index ≥ attribute count |
    /// | [`C45Error::ClassNotDiscrete`] | class attribute is continuous |
    /// | [`C45Error::EmptyVocabulary`] | a discrete attribute has no values |
    /// | [`C45Error::DuplicateNominalValue`] | a vocabulary repeats a value |
    pub fn new(attributes: Vec<AttributeSpec>, class_index: usize) -> Result<Self, C45Error> {
        if attributes.is_empty() {
            return Err(C45Error::EmptySchema);
        }
        if class_index >= attributes.len() {
            return Err(C45Error::ClassIndexOutOfRange {
                class_index,
                attribute_count: attributes.len(),
            });
        }
        if attributes[class_index].is_continuous() {
            return Err(C45Error::ClassNotDiscrete {
                attribute: attributes[class_index].name().to_string(),
            });
        }
        for spec in &attributes {
            if let AttributeKind::Discrete { values } = spec.kind() {
                if values.is_empty() {
                    return Err(C45Error::EmptyVocabulary {
                        attribute: spec.name().to_string(),
                    });
                }
                for (i, value) in values.iter().enumerate() {
                    if values[..i].contains(value) {
                        return Err(C45Error::DuplicateNominalValue {
                            attribute: spec.name().to_string(),
                            value: value.clone(),
                        });
                    }
                }
            }
        }
        Ok(Self {
            attributes,
            class_index,
        })
    }

    /// Return the number of attributes, class attribute included.
    #[must_use]
    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    /// Return the attribute at a zero-based index.
    #[must_use]
    pub fn attribute(&self, index: usize) -> &AttributeSpec {
        &self.attributes[index]
    }

    /// Return all attributes in declaration order.
    #[must_use]
    pub fn attributes(&self) -> &[AttributeSpec] {
        &self.attributes
    }

    /// Return the class-attribute index.
    #[must_use]
    pub fn class_index(&self) -> usize {
        self.class_index
    }

    /// Return the class attribute.
    #[must_use]
    pub fn class_attribute(&self) -> &AttributeSpec {
        &self.attributes[self.class_index]
    }

    /// Return the class labels in vocabulary order.
    #[must_use]
    pub fn class_values(&self) -> &[String] {
        self.class_attribute().values()
    }

    /// Return the number of class labels.
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.class_values().len()
    }
}

/// A named, fully validated 2-D view of raw string values (case × attribute).
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    name: String,
    schema: Schema,
    rows: Vec<Vec<String>>,
    class_indices: Vec<usize>,
}

impl Dataset {
    /// Build a dataset and validate every cell against the schema.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`C45Error::EmptyDataset`] | zero rows |
    /// | [`C45Error::RowWidthMismatch`] | a row width differs from the schema |
    /// | [`C45Error::UnknownNominalValue`] | a nominal value outside its vocabulary |
    /// | [`C45Error::UnparsableNumber`] | a numeric value unparsable or non-finite |
    /// | [`C45Error::MissingClassLabel`] | a `?` in the class column |
    pub fn new(
        name: impl Into<String>,
        schema: Schema,
        rows: Vec<Vec<String>>,
    ) -> Result<Self, C45Error> {
        if rows.is_empty() {
            return Err(C45Error::EmptyDataset);
        }
        let expected = schema.attribute_count();
        let mut class_indices = Vec::with_capacity(rows.len());
        for (case_index, row) in rows.iter().enumerate() {
            if row.len() != expected {
                return Err(C45Error::RowWidthMismatch {
                    expected,
                    got: row.len(),
                    case_index,
                });
            }
            for (attr_index, raw) in row.iter().enumerate() {
                if Self::is_missing(raw) {
                    if attr_index == schema.class_index() {
                        return Err(C45Error::MissingClassLabel { case_index });
                    }
                    continue;
                }
                let spec = schema.attribute(attr_index);
                match spec.kind() {
                    AttributeKind::Continuous => {
                        let parsed = raw.parse::<f64>();
                        if !parsed.map(f64::is_finite).unwrap_or(false) {
                            return Err(C45Error::UnparsableNumber {
                                case_index,
                                attribute: spec.name().to_string(),
                                raw: raw.clone(),
                            });
                        }
                    }
                    AttributeKind::Discrete { .. } => {
                        let Some(value_index) = spec.value_index(raw) else {
                            return Err(C45Error::UnknownNominalValue {
                                case_index,
                                attribute: spec.name().to_string(),
                                value: raw.clone(),
                            });
                        };
                        if attr_index == schema.class_index() {
                            class_indices.push(value_index);
                        }
                    }
                }
            }
        }
        Ok(Self {
            name: name.into(),
            schema,
            rows,
            class_indices,
        })
    }

    /// Return `true` if a raw value encodes a missing entry.
    #[must_use]
    pub fn is_missing(raw: &str) -> bool {
        raw == MISSING_TOKEN
    }

    /// Return the dataset name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the schema.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Return the number of cases.
    #[must_use]
    pub fn case_count(&self) -> usize {
        self.rows.len()
    }

    /// Return the number of attributes, class attribute included.
    #[must_use]
    pub fn attribute_count(&self) -> usize {
        self.schema.attribute_count()
    }

    /// Return the raw value of one case for one attribute.
    #[must_use]
    pub fn raw(&self, case: usize, attribute: usize) -> &str {
        &self.rows[case][attribute]
    }

    /// Parsed value of a continuous cell; `None` when missing.
    ///
    /// Construction already rejected unparsable numerics, so parsing a
    /// validated cell cannot fail.
    #[must_use]
    pub fn numeric(&self, case: usize, attribute: usize) -> Option<f64> {
        let raw = self.raw(case, attribute);
        if Self::is_missing(raw) {
            return None;
        }
        raw.parse().ok()
    }

    /// Vocabulary index of a nominal cell; `None` when missing.
    #[must_use]
    pub fn nominal(&self, case: usize, attribute: usize) -> Option<usize> {
        let raw = self.raw(case, attribute);
        if Self::is_missing(raw) {
            return None;
        }
        self.schema.attribute(attribute).value_index(raw)
    }

    /// Class index of a case; class labels are never missing.
    #[must_use]
    pub fn class_of(&self, case: usize) -> usize {
        self.class_indices[case]
    }

    /// Return one full-width row.
    #[must_use]
    pub fn row(&self, case: usize) -> &[String] {
        &self.rows[case]
    }

    /// Return all rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }
}
