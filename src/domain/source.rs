use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::document::{self, DocumentFormat, value_kind};

/// Errors that can occur while collecting game version specifiers
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Missing field 'key' in 'gameVersions'")]
    MissingKey,

    #[error("failed to read game versions source file: {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse game versions source file {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("Failed to get game versions from source file using key '{key}'")]
    KeyNotFound { key: String },

    #[error("expected a version string or a list of version strings at key '{key}', got {kind}")]
    NotStrings { key: String, kind: &'static str },
}

/// Reads the text of documents that game versions are sourced from
pub trait DocumentReader {
    /// Read the full contents of the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read.
    fn read_document(&self, path: &Path) -> Result<String, io::Error>;
}

/// Where the raw game version specifiers come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintSource {
    /// `"gameVersions": [">=0.3.1", "0.2.4"]`
    InlineList(Vec<String>),
    /// `"gameVersions": ">=0.3.1"`
    InlineScalar(String),
    /// `"gameVersions": {"file": "fabric.mod.json", "key": "depends.minecraft"}`
    ExternalReference {
        file_path: PathBuf,
        key_path: Vec<String>,
    },
}

impl ConstraintSource {
    /// Build an external reference from a dotted key such as `release.versions`.
    /// An empty key yields an empty key path.
    #[must_use]
    pub fn reference(file_path: PathBuf, key: &str) -> Self {
        let key_path = if key.is_empty() {
            Vec::new()
        } else {
            key.split('.').map(str::to_owned).collect()
        };
        Self::ExternalReference {
            file_path,
            key_path,
        }
    }

    /// Flatten the source into the list of raw specifier strings.
    ///
    /// # Errors
    ///
    /// For external references, returns [`SourceError::MissingKey`] if the key
    /// path is empty, [`SourceError::Read`] or [`SourceError::Parse`] if the
    /// document is unusable, [`SourceError::KeyNotFound`] if the key path does
    /// not lead to a value, and [`SourceError::NotStrings`] if the value is not
    /// a string or a list of strings.
    pub fn resolve<R: DocumentReader>(&self, reader: &R) -> Result<Vec<String>, SourceError> {
        match self {
            Self::InlineList(specifiers) => Ok(specifiers.clone()),
            Self::InlineScalar(specifier) => Ok(vec![specifier.clone()]),
            Self::ExternalReference {
                file_path,
                key_path,
            } => resolve_reference(reader, file_path, key_path),
        }
    }
}

/// Read the referenced document and extract the specifiers at `key_path`.
fn resolve_reference<R: DocumentReader>(
    reader: &R,
    file_path: &Path,
    key_path: &[String],
) -> Result<Vec<String>, SourceError> {
    if key_path.is_empty() {
        return Err(SourceError::MissingKey);
    }
    let key = key_path.join(".");

    let text = reader
        .read_document(file_path)
        .map_err(|source| SourceError::Read {
            path: file_path.to_path_buf(),
            source,
        })?;
    let parsed = DocumentFormat::from_path(file_path)
        .parse(&text)
        .map_err(|reason| SourceError::Parse {
            path: file_path.to_path_buf(),
            reason,
        })?;

    match document::lookup(&parsed, key_path) {
        None | Some(Value::Null) => Err(SourceError::KeyNotFound { key }),
        Some(Value::String(specifier)) if specifier.is_empty() => {
            Err(SourceError::KeyNotFound { key })
        }
        Some(Value::String(specifier)) => Ok(vec![specifier.clone()]),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_owned)
                    .ok_or_else(|| SourceError::NotStrings {
                        key: key.clone(),
                        kind: value_kind(item),
                    })
            })
            .collect(),
        Some(other @ (Value::Bool(_) | Value::Number(_) | Value::Object(_))) => {
            Err(SourceError::NotStrings {
                key,
                kind: value_kind(other),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::document::MemoryDocuments;

    fn external(file: &str, key: &str) -> ConstraintSource {
        ConstraintSource::reference(PathBuf::from(file), key)
    }

    #[test]
    fn inline_list_is_returned_unchanged() {
        let source = ConstraintSource::InlineList(vec![">=0.3.1".to_owned(), "0.2.4".to_owned()]);
        let specifiers = source.resolve(&MemoryDocuments::default()).unwrap();
        assert_eq!(specifiers, [">=0.3.1", "0.2.4"]);
    }

    #[test]
    fn inline_scalar_is_wrapped() {
        let source = ConstraintSource::InlineScalar("<1.0".to_owned());
        let specifiers = source.resolve(&MemoryDocuments::default()).unwrap();
        assert_eq!(specifiers, ["<1.0"]);
    }

    #[test]
    fn reference_splits_dotted_key() {
        assert_eq!(
            external("mod.json", "release.versions"),
            ConstraintSource::ExternalReference {
                file_path: PathBuf::from("mod.json"),
                key_path: vec!["release".to_owned(), "versions".to_owned()],
            }
        );
    }

    #[test]
    fn reference_scalar_value_is_wrapped() {
        let reader = MemoryDocuments::default()
            .with_document("mod.json", r#"{"release": {"versions": "1.2"}}"#);
        let specifiers = external("mod.json", "release.versions")
            .resolve(&reader)
            .unwrap();
        assert_eq!(specifiers, ["1.2"]);
    }

    #[test]
    fn reference_list_value_is_returned() {
        let reader = MemoryDocuments::default()
            .with_document("mod.json", r#"{"compat": [">=1.1", "0.9"]}"#);
        let specifiers = external("mod.json", "compat").resolve(&reader).unwrap();
        assert_eq!(specifiers, [">=1.1", "0.9"]);
    }

    #[test]
    fn reference_reads_toml_documents() {
        let reader = MemoryDocuments::default().with_document(
            "gradle/libs.versions.toml",
            "[versions]\ngame = \">=0.3.1\"\n",
        );
        let specifiers = external("gradle/libs.versions.toml", "versions.game")
            .resolve(&reader)
            .unwrap();
        assert_eq!(specifiers, [">=0.3.1"]);
    }

    #[test]
    fn reference_without_key_fails() {
        let reader = MemoryDocuments::default().with_document("mod.json", "{}");
        let err = external("mod.json", "").resolve(&reader).unwrap_err();
        assert!(matches!(err, SourceError::MissingKey));
        assert_eq!(err.to_string(), "Missing field 'key' in 'gameVersions'");
    }

    #[test]
    fn reference_missing_intermediate_fails() {
        let reader = MemoryDocuments::default()
            .with_document("mod.json", r#"{"release": {"versions": "1.2"}}"#);
        let err = external("mod.json", "beta.versions")
            .resolve(&reader)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to get game versions from source file using key 'beta.versions'"
        );
    }

    #[test]
    fn reference_null_or_empty_value_fails() {
        let reader = MemoryDocuments::default()
            .with_document("mod.json", r#"{"a": null, "b": ""}"#);
        for key in ["a", "b"] {
            let err = external("mod.json", key).resolve(&reader).unwrap_err();
            assert!(matches!(err, SourceError::KeyNotFound { .. }), "{key}");
        }
    }

    #[test]
    fn reference_non_string_value_fails() {
        let reader = MemoryDocuments::default()
            .with_document("mod.json", r#"{"versions": [1.2, "1.1"], "flag": true}"#);

        let err = external("mod.json", "versions").resolve(&reader).unwrap_err();
        assert!(matches!(err, SourceError::NotStrings { kind: "a number", .. }));

        let err = external("mod.json", "flag").resolve(&reader).unwrap_err();
        assert!(matches!(err, SourceError::NotStrings { kind: "a boolean", .. }));
    }

    #[test]
    fn reference_unreadable_file_fails() {
        let err = external("missing.json", "versions")
            .resolve(&MemoryDocuments::default())
            .unwrap_err();
        assert!(matches!(err, SourceError::Read { .. }));
    }

    #[test]
    fn reference_invalid_document_fails() {
        let reader = MemoryDocuments::default().with_document("mod.json", "{oops");
        let err = external("mod.json", "versions").resolve(&reader).unwrap_err();
        assert!(matches!(err, SourceError::Parse { .. }));
    }
}
