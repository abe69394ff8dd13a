use glob::glob;
use log::debug;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::upload::UploadFile;

/// Characters that turn an additional file entry into a glob pattern
const GLOB_CHARS: [char; 3] = ['*', '?', '['];

/// Errors that can occur when loading files to upload
#[derive(Debug, Error)]
pub enum FileError {
    #[error("failed to read upload file: {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("upload file path has no file name: {}", path.display())]
    NoFileName { path: PathBuf },

    #[error("invalid file pattern '{pattern}'")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("failed to expand file pattern '{pattern}'")]
    Glob {
        pattern: String,
        #[source]
        source: glob::GlobError,
    },

    #[error("no files match pattern '{pattern}'")]
    NoMatch { pattern: String },
}

/// Read a file to upload. Its upload name is the last path component.
///
/// # Errors
///
/// Returns [`FileError::NoFileName`] if the path ends in `..` or is a root,
/// and [`FileError::Read`] if the file cannot be read.
pub fn load_file(path: &Path) -> Result<UploadFile, FileError> {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| FileError::NoFileName {
            path: path.to_path_buf(),
        })?;
    let bytes = fs::read(path).map_err(|source| FileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Loaded {} ({} bytes)", path.display(), bytes.len());
    Ok(UploadFile { name, bytes })
}

/// Expand one additional file entry into paths.
///
/// Plain paths are returned as is. Patterns are expanded in alphabetical order.
///
/// # Errors
///
/// Returns [`FileError::Pattern`] for an invalid pattern, [`FileError::Glob`]
/// if a matched path cannot be read, and [`FileError::NoMatch`] if the pattern
/// matches nothing.
pub fn expand(entry: &str) -> Result<Vec<PathBuf>, FileError> {
    if !entry.contains(GLOB_CHARS) {
        return Ok(vec![PathBuf::from(entry)]);
    }

    let paths = glob(entry)
        .map_err(|source| FileError::Pattern {
            pattern: entry.to_owned(),
            source,
        })?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| FileError::Glob {
            pattern: entry.to_owned(),
            source,
        })?;

    if paths.is_empty() {
        return Err(FileError::NoMatch {
            pattern: entry.to_owned(),
        });
    }
    Ok(paths)
}

/// Expand and read every additional file entry, in order.
///
/// # Errors
///
/// Returns the first [`FileError`] raised while expanding or reading.
pub fn load_files(entries: &[String]) -> Result<Vec<UploadFile>, FileError> {
    let mut files = Vec::new();
    for entry in entries {
        for path in expand(entry)? {
            files.push(load_file(&path)?);
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn pattern(dir: &TempDir, glob_pattern: &str) -> String {
        dir.path().join(glob_pattern).to_string_lossy().into_owned()
    }

    #[test]
    fn load_file_uses_last_path_component() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "mod-1.5.0.jar", b"PK");

        let file = load_file(&path).unwrap();

        assert_eq!(file.name, "mod-1.5.0.jar");
        assert_eq!(file.bytes, b"PK");
    }

    #[test]
    fn load_file_missing_fails() {
        let dir = TempDir::new().unwrap();
        let err = load_file(&dir.path().join("missing.jar")).unwrap_err();
        assert!(matches!(err, FileError::Read { .. }));
    }

    #[test]
    fn plain_entry_is_not_expanded() {
        let paths = expand("build/libs/mod.jar").unwrap();
        assert_eq!(paths, [PathBuf::from("build/libs/mod.jar")]);
    }

    #[test]
    fn pattern_expands_sorted() {
        let dir = TempDir::new().unwrap();
        write(&dir, "mod-sources.jar", b"b");
        write(&dir, "mod-javadoc.jar", b"a");
        write(&dir, "mod.jar", b"c");

        let paths = expand(&pattern(&dir, "mod-*.jar")).unwrap();

        let names: Vec<_> = paths
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["mod-javadoc.jar", "mod-sources.jar"]);
    }

    #[test]
    fn pattern_without_matches_fails() {
        let dir = TempDir::new().unwrap();
        let err = expand(&pattern(&dir, "*.zip")).unwrap_err();
        assert!(matches!(err, FileError::NoMatch { .. }));
    }

    #[test]
    fn invalid_pattern_fails() {
        let err = expand("build/[libs").unwrap_err();
        assert!(matches!(err, FileError::Pattern { .. }));
    }

    #[test]
    fn load_files_keeps_entry_order() {
        let dir = TempDir::new().unwrap();
        let sources = write(&dir, "sources.jar", b"s");
        write(&dir, "a-extra.txt", b"x");

        let files = load_files(&[
            sources.to_string_lossy().into_owned(),
            pattern(&dir, "*.txt"),
        ])
        .unwrap();

        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["sources.jar", "a-extra.txt"]);
    }
}
