//! Document state management

use crate::model::{File, RawFile};

/// An open text document and its parsed file
#[derive(Debug)]
pub struct Document {
    /// The file built from the current text
    pub file: File,
    /// The document version
    pub version: i32,
}

impl Document {
    /// Create a new document with the given path, text and version
    pub fn new(path: impl Into<String>, text: String, version: i32) -> Self {
        Self {
            file: File::new(RawFile::new(path, text)),
            version,
        }
    }

    pub fn text(&self) -> &str {
        self.file.text()
    }
}
