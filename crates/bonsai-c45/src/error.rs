use std::path::PathBuf;

/// Errors from decision-tree training, classification, and model I/O.
#[derive(Debug, thiserror::Error)]
pub enum C45Error {
    /// Returned when a schema declares zero attributes.
    #[error("schema declares zero attributes")]
    EmptySchema,

    /// Returned when the class-attribute index is out of range.
    #[error("class attribute index {class_index} out of range for {attribute_count} attributes")]
    ClassIndexOutOfRange {
        /// The invalid class-attribute index.
        class_index: usize,
        /// The number of attributes in the schema.
        attribute_count: usize,
    },

    /// Returned when the class attribute is continuous.
    #[error("class attribute '{attribute}' must be discrete")]
    ClassNotDiscrete {
        /// Name of the offending attribute.
        attribute: String,
    },

    /// Returned when a discrete attribute declares an empty vocabulary.
    #[error("discrete attribute '{attribute}' declares an empty vocabulary")]
    EmptyVocabulary {
        /// Name of the offending attribute.
        attribute: String,
    },

    /// Returned when a discrete vocabulary lists the same value twice.
    #[error("attribute '{attribute}' lists nominal value '{value}' more than once")]
    DuplicateNominalValue {
        /// Name of the offending attribute.
        attribute: String,
        /// The duplicated nominal value.
        value: String,
    },

    /// Returned when the dataset has zero cases.
    #[error("dataset has zero cases")]
    EmptyDataset,

    /// Returned when a row has a different width than the schema.
    #[error("case {case_index} has {got} values, expected {expected}")]
    RowWidthMismatch {
        /// The expected number of values per row.
        expected: usize,
        /// The actual number of values in the row.
        got: usize,
        /// The zero-based index of the offending case.
        case_index: usize,
    },

    /// Returned when a training value is outside its attribute's vocabulary.
    #[error("case {case_index}: '{value}' is not in the vocabulary of attribute '{attribute}'")]
    UnknownNominalValue {
        /// The zero-based index of the offending case.
        case_index: usize,
        /// Name of the offending attribute.
        attribute: String,
        /// The raw value found.
        value: String,
    },

    /// Returned when a training value of a continuous attribute is not a finite number.
    #[error("case {case_index}: '{raw}' is not a finite number for attribute '{attribute}'")]
    UnparsableNumber {
        /// The zero-based index of the offending case.
        case_index: usize,
        /// Name of the offending attribute.
        attribute: String,
        /// The raw value found.
        raw: String,
    },

    /// Returned when a training case has a missing class label.
    #[error("case {case_index} has a missing class label")]
    MissingClassLabel {
        /// The zero-based index of the offending case.
        case_index: usize,
    },

    /// Returned when min_split_weight is below 1.0 or not finite.
    #[error("min_split_weight must be a finite value of at least 1.0, got {min_split_weight}")]
    InvalidMinSplitWeight {
        /// The invalid min_split_weight value provided.
        min_split_weight: f64,
    },

    /// Returned when a record has a different width than the model's schema.
    #[error("record has {got} values, expected {expected}")]
    RecordWidthMismatch {
        /// The expected number of values per record.
        expected: usize,
        /// The actual number of values in the record.
        got: usize,
    },

    /// Returned when a record's nominal value is outside the attribute's vocabulary.
    #[error("'{value}' is not in the vocabulary of attribute '{attribute}'")]
    UnknownRecordValue {
        /// Name of the offending attribute.
        attribute: String,
        /// The raw value found.
        value: String,
    },

    /// Returned when a record's continuous value is not a finite number.
    #[error("'{raw}' is not a finite number for attribute '{attribute}'")]
    UnparsableRecordNumber {
        /// Name of the offending attribute.
        attribute: String,
        /// The raw value found.
        raw: String,
    },

    /// Returned when pruning a model against a dataset with a different schema.
    #[error("model schema does not match the dataset schema")]
    SchemaMismatch,

    /// Returned when model serialization fails.
    #[error("failed to serialize model")]
    SerializeModel {
        /// The underlying bincode error.
        source: Box<bincode::ErrorKind>,
    },

    /// Returned when model deserialization fails.
    #[error("failed to deserialize model from {path}")]
    DeserializeModel {
        /// Path to the model file that could not be deserialized.
        path: PathBuf,
        /// The underlying bincode error.
        source: Box<bincode::ErrorKind>,
    },

    /// Returned when writing the model file fails.
    #[error("failed to write model to {path}")]
    WriteModel {
        /// Path to the file that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when reading the model file fails.
    #[error("failed to read model from {path}")]
    ReadModel {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when loading a model with an incompatible format version.
    #[error("incompatible model version in {path}: expected {expected}, found {found}")]
    IncompatibleModelVersion {
        /// The model format version this build expects.
        expected: u32,
        /// The model format version found in the file.
        found: u32,
        /// Path to the model file with the incompatible version.
        path: PathBuf,
    },
}
