//! Composed loader pairing `.names` metadata with `.data` records.

use std::path::{Path, PathBuf};

use bonsai_c45::Dataset;
use tracing::{info, instrument};

use crate::data_reader::DataReader;
use crate::error::IoError;
use crate::names_reader::NamesReader;

/// Loads a validated [`Dataset`] from a `base.names`/`base.data` file pair.
///
/// The dataset takes its name from the file stem, so `data/golf` (or
/// `data/golf.data`) loads `data/golf.names` plus `data/golf.data` into a
/// dataset called `golf`.
///
/// # Errors
///
/// Everything [`NamesReader`] and [`DataReader`] return, plus
/// [`IoError::Dataset`] when the rows do not fit the schema.
pub struct DatasetReader {
    base: PathBuf,
}

impl DatasetReader {
    /// Create a reader for the file pair next to `base`; any extension on
    /// `base` is replaced.
    pub fn new(base: &Path) -> Self {
        Self {
            base: base.to_path_buf(),
        }
    }

    /// Read both files and assemble the validated dataset.
    #[instrument(skip(self), fields(base = %self.base.display()))]
    pub fn read(&self) -> Result<Dataset, IoError> {
        let schema = NamesReader::new(&self.base.with_extension("names")).read()?;
        let rows = DataReader::new(&self.base.with_extension("data")).read()?;

        let name = self
            .base
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("dataset");
        let dataset =
            Dataset::new(name, schema, rows).map_err(|e| IoError::Dataset { source: e })?;

        info!(
            name = %dataset.name(),
            n_cases = dataset.case_count(),
            n_attributes = dataset.attribute_count(),
            "dataset loaded"
        );
        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const GOLF_NAMES: &str = "\
the target attribute : play
outlook : sunny, overcast, rain
temperature : continuous
humidity : continuous
windy : true, false
play : yes, no
";

    fn write_pair(dir: &TempDir, names: &str, data: &str) -> PathBuf {
        let base = dir.path().join("golf");
        let mut f = std::fs::File::create(base.with_extension("names")).unwrap();
        f.write_all(names.as_bytes()).unwrap();
        let mut f = std::fs::File::create(base.with_extension("data")).unwrap();
        f.write_all(data.as_bytes()).unwrap();
        base
    }

    #[test]
    fn loads_a_names_data_pair() {
        let dir = TempDir::new().unwrap();
        let base = write_pair(
            &dir,
            GOLF_NAMES,
            "sunny, 85, 85, false, no\nrain, 70, 96, false, yes\n?, 64, 65, true, yes\n",
        );

        let dataset = DatasetReader::new(&base).read().unwrap();
        assert_eq!(dataset.name(), "golf");
        assert_eq!(dataset.case_count(), 3);
        assert_eq!(dataset.schema().class_index(), 4);
        assert_eq!(dataset.raw(2, 0), "?");
        assert_eq!(dataset.class_of(0), 1);
    }

    #[test]
    fn extension_on_the_base_path_is_replaced() {
        let dir = TempDir::new().unwrap();
        let base = write_pair(&dir, GOLF_NAMES, "sunny, 85, 85, false, no\n");
        let dataset = DatasetReader::new(&base.with_extension("data")).read().unwrap();
        assert_eq!(dataset.name(), "golf");
        assert_eq!(dataset.case_count(), 1);
    }

    #[test]
    fn error_missing_data_file() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("golf");
        let mut f = std::fs::File::create(base.with_extension("names")).unwrap();
        f.write_all(GOLF_NAMES.as_bytes()).unwrap();

        let err = DatasetReader::new(&base).read().unwrap_err();
        assert!(matches!(err, IoError::FileNotFound { .. }));
    }

    #[test]
    fn error_rows_that_do_not_fit_the_schema() {
        let dir = TempDir::new().unwrap();

        let base = write_pair(&dir, GOLF_NAMES, "sunny, 85, 85, false\n");
        let err = DatasetReader::new(&base).read().unwrap_err();
        assert!(matches!(err, IoError::Dataset { .. }));

        let base = write_pair(&dir, GOLF_NAMES, "drizzle, 85, 85, false, no\n");
        let err = DatasetReader::new(&base).read().unwrap_err();
        assert!(matches!(err, IoError::Dataset { .. }));
    }
}
