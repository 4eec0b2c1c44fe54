//! The filesystem seam.
//!
//! Every component reaches the disk through the [`FileSystem`] trait, so the
//! engine can run against a scripted filesystem in tests. [`LocalFileSystem`]
//! is the production implementation over `std::fs`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BrowseError, BrowseResult};

/// One child of a directory as reported by the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    /// The file name (lossily converted to UTF-8).
    pub name: String,
    /// The full path of the child.
    pub path: PathBuf,
    /// Whether the child is a directory (symbolic links are followed).
    pub is_dir: bool,
}

impl RawEntry {
    /// Whether the name marks a hidden entry.
    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }
}

/// The filesystem operations the browsing engine consumes.
///
/// Enumeration never yields the `.` and `..` pseudo-entries.
pub trait FileSystem: Send + Sync {
    /// List the children of a directory.
    ///
    /// Fails with `NotFound` if the path does not exist or is not a directory,
    /// and with `Access` if enumeration is denied.
    fn list_directory(&self, path: &Path) -> BrowseResult<Vec<RawEntry>>;

    /// Whether any child of `path` satisfies `predicate`.
    ///
    /// Implementations must stop at the first match instead of collecting
    /// the whole directory.
    fn any_child(
        &self,
        path: &Path,
        predicate: &mut dyn FnMut(&RawEntry) -> bool,
    ) -> BrowseResult<bool>;

    /// Rename `from` to `to`.
    fn rename(&self, from: &Path, to: &Path) -> BrowseResult<()>;

    /// Whether anything exists at `path` (dangling symlinks included).
    fn path_exists(&self, path: &Path) -> bool;

    /// Whether `path` is a directory.
    fn is_directory(&self, path: &Path) -> bool;

    /// Whether `path` can be opened for reading.
    fn is_readable(&self, path: &Path) -> bool;

    /// Whether two paths name the same filesystem object.
    fn is_same_entry(&self, a: &Path, b: &Path) -> bool {
        a == b
    }

    /// Create a single directory.
    fn create_directory(&self, path: &Path) -> BrowseResult<()>;

    /// Remove a file, or a directory and everything below it.
    fn remove(&self, path: &Path) -> BrowseResult<()>;
}

/// [`FileSystem`] over the local disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    /// Create the local filesystem handle.
    pub fn new() -> Self {
        Self
    }

    fn open_dir(path: &Path) -> BrowseResult<fs::ReadDir> {
        let metadata = fs::metadata(path).map_err(|e| BrowseError::from_io(e, path))?;
        if !metadata.is_dir() {
            return Err(BrowseError::not_found(path));
        }
        fs::read_dir(path).map_err(|e| BrowseError::from_io(e, path))
    }

    fn to_raw(entry: fs::DirEntry) -> RawEntry {
        let path = entry.path();
        let is_dir = match entry.file_type() {
            Ok(file_type) if file_type.is_symlink() => path.is_dir(),
            Ok(file_type) => file_type.is_dir(),
            Err(_) => false,
        };
        RawEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            path,
            is_dir,
        }
    }
}

impl FileSystem for LocalFileSystem {
    fn list_directory(&self, path: &Path) -> BrowseResult<Vec<RawEntry>> {
        let mut entries = Vec::new();
        for entry in Self::open_dir(path)? {
            let entry = entry.map_err(|e| BrowseError::from_io(e, path))?;
            entries.push(Self::to_raw(entry));
        }
        Ok(entries)
    }

    fn any_child(
        &self,
        path: &Path,
        predicate: &mut dyn FnMut(&RawEntry) -> bool,
    ) -> BrowseResult<bool> {
        for entry in Self::open_dir(path)? {
            // An unreadable child does not prove the directory empty.
            let Ok(entry) = entry else { continue };
            if predicate(&Self::to_raw(entry)) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn rename(&self, from: &Path, to: &Path) -> BrowseResult<()> {
        fs::rename(from, to).map_err(|e| {
            if from.symlink_metadata().is_err() {
                BrowseError::from_io(e, from)
            } else {
                BrowseError::from_io(e, to)
            }
        })
    }

    fn path_exists(&self, path: &Path) -> bool {
        path.symlink_metadata().is_ok()
    }

    fn is_directory(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_readable(&self, path: &Path) -> bool {
        fs::File::open(path).is_ok()
    }

    fn is_same_entry(&self, a: &Path, b: &Path) -> bool {
        match (fs::canonicalize(a), fs::canonicalize(b)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }

    fn create_directory(&self, path: &Path) -> BrowseResult<()> {
        fs::create_dir(path).map_err(|e| BrowseError::from_io(e, path))
    }

    fn remove(&self, path: &Path) -> BrowseResult<()> {
        let metadata = path
            .symlink_metadata()
            .map_err(|e| BrowseError::from_io(e, path))?;
        let result = if metadata.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        };
        result.map_err(|e| BrowseError::from_io(e, path))
    }
}
