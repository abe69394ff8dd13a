use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::domain::source::DocumentReader;

/// Reads documents from the local file system
#[derive(Debug, Default, Clone, Copy)]
pub struct FileDocuments;

impl DocumentReader for FileDocuments {
    fn read_document(&self, path: &Path) -> Result<String, io::Error> {
        fs::read_to_string(path)
    }
}

/// In-memory documents keyed by path
#[derive(Debug, Default)]
pub struct MemoryDocuments {
    /// Document text by path
    documents: HashMap<PathBuf, String>,
}

impl MemoryDocuments {
    #[must_use]
    pub fn with_document<P: Into<PathBuf>, T: Into<String>>(mut self, path: P, text: T) -> Self {
        self.documents.insert(path.into(), text.into());
        self
    }
}

impl DocumentReader for MemoryDocuments {
    fn read_document(&self, path: &Path) -> Result<String, io::Error> {
        self.documents.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no document at {}", path.display()),
            )
        })
    }
}
