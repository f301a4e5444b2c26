//! Files on disk or in an editor buffer

use std::io;
use std::path::Path;
use std::sync::OnceLock;

use tracing::debug;

use crate::location::{FileIdentifier, Locatable, Location};

use super::content::Content;

/// Unparsed file contents with their identifying path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFile {
    pub path: FileIdentifier,
    pub text: String,
}

impl RawFile {
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            path: FileIdentifier::new(path),
            text: text.into(),
        }
    }
}

/// A file to analyze.
///
/// The content is parsed and classified on first access and the same
/// instance is returned afterwards, whether or not it is valid.
#[derive(Debug)]
pub struct File {
    origin: RawFile,
    location: Location,
    content: OnceLock<Content>,
}

impl File {
    pub fn new(origin: RawFile) -> Self {
        let location = Location::whole_file(origin.path.clone(), &origin.text);
        Self {
            origin,
            location,
            content: OnceLock::new(),
        }
    }

    /// Read a file from disk, identified by its path as given
    pub fn load(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        Ok(Self::new(RawFile::new(path.to_string_lossy(), text)))
    }

    pub fn origin(&self) -> &RawFile {
        &self.origin
    }

    pub fn path(&self) -> &FileIdentifier {
        &self.origin.path
    }

    pub fn text(&self) -> &str {
        &self.origin.text
    }

    /// Spans the entire text
    pub fn location(&self) -> Location {
        self.location.clone()
    }

    pub fn content(&self) -> &Content {
        self.content.get_or_init(|| {
            debug!("Classifying {}", self.origin.path);
            Content::load(&self.origin.path, &self.origin.text)
        })
    }
}

impl Locatable for File {
    fn location(&self) -> Location {
        File::location(self)
    }
}
