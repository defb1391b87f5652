//! Model serialization and deserialization via bincode.

use std::path::Path;

use tracing::{debug, info, instrument};

use crate::error::C45Error;
use crate::tree::TreeModel;

/// Current binary format version.
const FORMAT_VERSION: u32 = 1;

/// Versioned envelope for the serialized model.
#[derive(serde::Serialize, serde::Deserialize)]
struct ModelEnvelope {
    /// Format version for compatibility checking.
    format_version: u32,
    /// Number of nodes in the tree.
    n_nodes: usize,
    /// Number of classes.
    n_classes: usize,
    /// Name of the class attribute.
    class_attribute: String,
    /// The serialized tree with its schema snapshot.
    model: TreeModel,
}

impl TreeModel {
    /// Save the model to a binary file.
    ///
    /// Uses bincode encoding wrapped in a versioned envelope for
    /// forward-compatibility checking.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`C45Error::SerializeModel`] | bincode encoding failed |
    /// | [`C45Error::WriteModel`] | file write failed |
    #[instrument(skip(self), fields(path = %path.as_ref().display()))]
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), C45Error> {
        let path = path.as_ref();

        let envelope = ModelEnvelope {
            format_version: FORMAT_VERSION,
            n_nodes: self.node_count(),
            n_classes: self.schema().class_count(),
            class_attribute: self.schema().class_attribute().name().to_string(),
            model: self.clone(),
        };

        let bytes =
            bincode::serialize(&envelope).map_err(|e| C45Error::SerializeModel { source: e })?;

        std::fs::write(path, &bytes).map_err(|e| C45Error::WriteModel {
            path: path.to_path_buf(),
            source: e,
        })?;

        info!(
            size_bytes = bytes.len(),
            n_nodes = self.node_count(),
            "model saved"
        );

        Ok(())
    }

    /// Load a model from a binary file.
    ///
    /// Checks the format version and returns an error on mismatch.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`C45Error::ReadModel`] | file read failed |
    /// | [`C45Error::DeserializeModel`] | bincode decoding failed |
    /// | [`C45Error::IncompatibleModelVersion`] | format version mismatch |
    #[instrument(fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, C45Error> {
        let path = path.as_ref();

        let bytes = std::fs::read(path).map_err(|e| C45Error::ReadModel {
            path: path.to_path_buf(),
            source: e,
        })?;

        let envelope: ModelEnvelope =
            bincode::deserialize(&bytes).map_err(|e| C45Error::DeserializeModel {
                path: path.to_path_buf(),
                source: e,
            })?;

        if envelope.format_version != FORMAT_VERSION {
            return Err(C45Error::IncompatibleModelVersion {
                expected: FORMAT_VERSION,
                found: envelope.format_version,
                path: path.to_path_buf(),
            });
        }

        debug!(
            n_nodes = envelope.n_nodes,
            n_classes = envelope.n_classes,
            class_attribute = %envelope.class_attribute,
            "model loaded"
        );

        Ok(envelope.model)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use crate::config::C45Config;
    use crate::error::C45Error;
    use crate::testdata;
    use crate::tree::TreeModel;

    #[test]
    fn round_trip_identical_predictions() {
        let dir = TempDir::new().unwrap();
        let model_path = dir.path().join("weather_model.bin");

        let dataset = testdata::weather();
        let model = C45Config::new().with_pruning(false).fit(&dataset).unwrap();

        model.save(&model_path).unwrap();
        let loaded = TreeModel::load(&model_path).unwrap();

        assert_eq!(loaded, model);
        let records = [
            ["sunny", "72", "66", "false", "?"],
            ["rain", "?", "?", "?", "?"],
            ["?", "70", "90", "true", "?"],
        ];
        for record in &records {
            let original = model.classify(record).unwrap();
            let restored = loaded.classify(record).unwrap();
            assert_eq!(original, restored, "predictions differ for {record:?}");
        }
    }

    #[test]
    fn load_nonexistent_file_error() {
        let err = TreeModel::load("/tmp/nonexistent_model_abc123.bin").unwrap_err();
        assert!(matches!(err, C45Error::ReadModel { .. }));
    }

    #[test]
    fn load_corrupt_file_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("corrupt.bin");
        std::fs::write(&path, b"not a valid bincode file").unwrap();
        let err = TreeModel::load(&path).unwrap_err();
        assert!(matches!(err, C45Error::DeserializeModel { .. }));
    }
}
