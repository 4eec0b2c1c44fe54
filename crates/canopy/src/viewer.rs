//! Decides which viewer, if any, opens an activated file.

use std::collections::BTreeSet;
use std::path::Path;

/// Image extensions opened in the image viewer by default.
pub const DEFAULT_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "tiff"];

/// Extensions opened in the text viewer by default.
pub const DEFAULT_TEXT_EXTENSIONS: &[&str] = &["txt", "text"];

/// The viewer an activated file is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Shown as a picture.
    Image,
    /// Shown as plain text.
    Text,
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileKind::Image => write!(f, "image"),
            FileKind::Text => write!(f, "text"),
        }
    }
}

/// Maps file extensions to a [`FileKind`], ignoring case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileClassifier {
    image: BTreeSet<String>,
    text: BTreeSet<String>,
}

impl Default for FileClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_EXTENSIONS, DEFAULT_TEXT_EXTENSIONS)
    }
}

impl FileClassifier {
    /// Creates a classifier from extension lists (without the leading dot).
    pub fn new<I, T>(image: I, text: T) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        T: IntoIterator,
        T::Item: AsRef<str>,
    {
        let normalize = |ext: &str| ext.trim_start_matches('.').to_lowercase();
        Self {
            image: image.into_iter().map(|e| normalize(e.as_ref())).collect(),
            text: text.into_iter().map(|e| normalize(e.as_ref())).collect(),
        }
    }

    /// The kind of viewer for `path`, or `None` if it should not be opened.
    pub fn classify(&self, path: &Path) -> Option<FileKind> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        if self.image.contains(&ext) {
            Some(FileKind::Image)
        } else if self.text.contains(&ext) {
            Some(FileKind::Text)
        } else {
            None
        }
    }
}
