//! Error types for browsing operations.

use std::io;
use std::path::{Path, PathBuf};

/// Errors surfaced by enumeration and file operations.
#[derive(Debug, thiserror::Error)]
pub enum BrowseError {
    /// The path vanished, never existed, or is not a directory.
    #[error("not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The operating system denied the operation.
    #[error("access denied: {}", path.display())]
    Access {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The rename or create target already exists.
    #[error("name already in use: {}", path.display())]
    NameConflict { path: PathBuf },

    /// A rename or create was requested with a blank name.
    #[error("name must not be empty")]
    EmptyName,

    /// The name cannot be used as a single path component.
    #[error("invalid name: {name:?}")]
    InvalidName { name: String },

    /// Any other I/O failure.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BrowseError {
    /// Classify an I/O error raised while operating on `path`.
    pub fn from_io(err: io::Error, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match err.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => Self::NotFound { path },
            io::ErrorKind::PermissionDenied => Self::Access { path, source: err },
            io::ErrorKind::AlreadyExists | io::ErrorKind::DirectoryNotEmpty => {
                Self::NameConflict { path }
            }
            _ => Self::Io { path, source: err },
        }
    }

    /// Creates a "not found" error for the given path.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Creates a "name conflict" error for the given path.
    pub fn name_conflict(path: impl Into<PathBuf>) -> Self {
        Self::NameConflict { path: path.into() }
    }

    /// The path involved in the error, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotFound { path }
            | Self::Access { path, .. }
            | Self::NameConflict { path }
            | Self::Io { path, .. } => Some(path),
            Self::EmptyName | Self::InvalidName { .. } => None,
        }
    }

    /// Returns true if this error indicates the path was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if this error indicates permission was denied.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::Access { .. })
    }

    /// Returns true if this error indicates the target name is taken.
    pub fn is_name_conflict(&self) -> bool {
        matches!(self, Self::NameConflict { .. })
    }
}

/// A specialized Result type for browsing operations.
pub type BrowseResult<T> = Result<T, BrowseError>;

/// Errors raised while loading or saving configuration files.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("failed to access config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file contents could not be parsed.
    #[error("invalid config file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// The value could not be serialized.
    #[error("failed to serialize config: {0}")]
    Serialize(String),
}

/// A specialized Result type for configuration I/O.
pub type ConfigResult<T> = Result<T, ConfigError>;
