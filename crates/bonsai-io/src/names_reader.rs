//! Parser for UCI-style `.names` metadata files.

use std::path::{Path, PathBuf};

use bonsai_c45::{AttributeSpec, Schema};
use tracing::{debug, instrument};

use crate::error::IoError;

/// Declaration name marking the class attribute.
const TARGET_DIRECTIVE: &str = "the target attribute";

/// Class attribute name assumed when no directive is present.
const DEFAULT_CLASS: &str = "class";

/// Reads attribute metadata from a `.names` file.
///
/// Expected format, one declaration per line:
/// - `name : continuous` for a numeric attribute
/// - `name : v1, v2, v3.` for a nominal attribute (trailing dot optional)
/// - `the target attribute : name` selects the class attribute; without the
///   directive an attribute named `class` is expected
/// - `|` starts a comment, blank lines are skipped
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::MalformedAttribute`] | A line has no `name : definition` shape |
/// | [`IoError::EmptyNames`] | No attribute declarations at all |
/// | [`IoError::ClassAttributeNotFound`] | The target attribute is not declared |
/// | [`IoError::Dataset`] | The declarations fail schema validation |
pub struct NamesReader {
    path: PathBuf,
}

impl NamesReader {
    /// Create a new reader for the given `.names` file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the metadata, returning a [`Schema`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Schema, IoError> {
        let raw = std::fs::read_to_string(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        let mut target: Option<String> = None;
        let mut attributes: Vec<AttributeSpec> = Vec::new();

        for (index, raw_line) in raw.lines().enumerate() {
            // `|` starts a comment running to the end of the line.
            let line = raw_line.split('|').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }

            let malformed = || IoError::MalformedAttribute {
                path: self.path.clone(),
                line_number: index + 1,
                line: raw_line.to_string(),
            };
            let Some((name, definition)) = line.split_once(':') else {
                return Err(malformed());
            };
            let name = name.trim();
            let definition = definition.trim().trim_end_matches('.').trim();
            if name.is_empty() || definition.is_empty() {
                return Err(malformed());
            }

            if name == TARGET_DIRECTIVE {
                target = Some(definition.to_string());
            } else if definition == "continuous" {
                attributes.push(AttributeSpec::continuous(name));
            } else {
                let values: Vec<String> = definition
                    .split(',')
                    .map(|value| value.trim().to_string())
                    .filter(|value| !value.is_empty())
                    .collect();
                attributes.push(AttributeSpec::discrete(name, values));
            }
        }

        if attributes.is_empty() {
            return Err(IoError::EmptyNames {
                path: self.path.clone(),
            });
        }

        // The directive may appear anywhere, so resolve the class at the end.
        let class_name = target.as_deref().unwrap_or(DEFAULT_CLASS);
        let Some(class_index) = attributes
            .iter()
            .position(|attribute| attribute.name() == class_name)
        else {
            return Err(IoError::ClassAttributeNotFound {
                path: self.path.clone(),
                attribute: class_name.to_string(),
            });
        };

        debug!(
            n_attributes = attributes.len(),
            class_attribute = %class_name,
            "names file parsed"
        );

        Schema::new(attributes, class_index).map_err(|e| IoError::Dataset { source: e })
    }
}
