//! I/O error types for bonsai-io.

use std::path::PathBuf;

use bonsai_c45::C45Error;

/// Errors from `.names`/`.data` file loading.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when an input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a `.names` file declares no attributes at all.
    #[error("no attribute declarations in {path}")]
    EmptyNames {
        /// Path to the `.names` file.
        path: PathBuf,
    },

    /// Returned when a `.names` line is not a `name : definition` pair.
    #[error("malformed attribute declaration in {path} at line {line_number}: \"{line}\"")]
    MalformedAttribute {
        /// Path to the `.names` file.
        path: PathBuf,
        /// One-based line number of the offending declaration.
        line_number: usize,
        /// The offending line as read.
        line: String,
    },

    /// Returned when the declared target attribute is not among the
    /// attributes.
    #[error("class attribute \"{attribute}\" is not declared in {path}")]
    ClassAttributeNotFound {
        /// Path to the `.names` file.
        path: PathBuf,
        /// The missing class attribute name.
        attribute: String,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in {path} at byte offset {offset}")]
    CsvParse {
        /// Path to the `.data` file.
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when a `.data` file contains no records.
    #[error("empty dataset (no data rows) in {path}")]
    EmptyDataset {
        /// Path to the `.data` file.
        path: PathBuf,
    },

    /// Returned when the loaded rows fail schema validation.
    #[error("dataset validation failed")]
    Dataset {
        /// The underlying validation error.
        source: C45Error,
    },
}
