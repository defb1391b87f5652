//! Reader for UCI-style `.data` record files.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::error::IoError;

/// Reads raw records from a headerless `.data` CSV file.
///
/// Cells are whitespace-trimmed and kept as strings; `?` marks a missing
/// value. Row width is not checked here so that dataset validation can
/// report the offending case instead of a low-level parse error.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::EmptyDataset`] | No data rows |
pub struct DataReader {
    path: PathBuf,
}

impl DataReader {
    /// Create a new reader for the given `.data` file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read the records as raw string rows.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Vec<Vec<String>>, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| IoError::CsvParse {
                path: self.path.clone(),
                offset: e.position().map_or(0, |p| p.byte()),
                source: e,
            })?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            rows.push(record.iter().map(str::to_string).collect());
        }

        if rows.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        debug!(n_rows = rows.len(), "data file read");
        Ok(rows)
    }
}
