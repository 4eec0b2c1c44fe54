//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use canopy::{BrowseError, BrowseResult, FileSystem, LocalFileSystem, RawEntry, Signal};
use parking_lot::Mutex;
use tempfile::TempDir;

/// A small tree:
///
/// ```text
/// root/
///   Archive/          (one subdirectory)
///     2023/
///   docs/             (files only)
///     Plan.txt
///     notes.txt
///   .hidden
///   a.txt
///   B.png
///   readme
/// ```
pub fn setup_test_dir() -> TempDir {
    canopy_core::init_tracing("canopy=debug,canopy_core=info");
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("Archive/2023")).unwrap();
    fs::create_dir(root.join("docs")).unwrap();
    fs::write(root.join("docs/Plan.txt"), "plan").unwrap();
    fs::write(root.join("docs/notes.txt"), "notes").unwrap();
    fs::write(root.join(".hidden"), "").unwrap();
    fs::write(root.join("a.txt"), "alpha").unwrap();
    fs::write(root.join("B.png"), "").unwrap();
    fs::write(root.join("readme"), "").unwrap();
    temp
}

/// Record every emission of `signal`.
pub fn record<T: Clone + Send + 'static>(signal: &Signal<T>) -> Arc<Mutex<Vec<T>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();
    signal.connect(move |value| seen_clone.lock().push(value.clone()));
    seen
}

/// The local filesystem with scripted permission failures.
#[derive(Debug, Default)]
pub struct ScriptedFileSystem {
    inner: LocalFileSystem,
    denied: Mutex<HashSet<PathBuf>>,
}

impl ScriptedFileSystem {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make enumeration, rename and removal under `path` fail with
    /// "permission denied".
    pub fn deny(&self, path: &Path) {
        self.denied.lock().insert(path.to_path_buf());
    }

    pub fn allow(&self, path: &Path) {
        self.denied.lock().remove(path);
    }

    fn check(&self, path: &Path) -> BrowseResult<()> {
        let denied = self.denied.lock();
        if path.ancestors().any(|p| denied.contains(p)) {
            return Err(BrowseError::from_io(
                io::Error::from(io::ErrorKind::PermissionDenied),
                path,
            ));
        }
        Ok(())
    }
}

impl FileSystem for ScriptedFileSystem {
    fn list_directory(&self, path: &Path) -> BrowseResult<Vec<RawEntry>> {
        self.check(path)?;
        self.inner.list_directory(path)
    }

    fn any_child(
        &self,
        path: &Path,
        predicate: &mut dyn FnMut(&RawEntry) -> bool,
    ) -> BrowseResult<bool> {
        self.check(path)?;
        self.inner.any_child(path, predicate)
    }

    fn rename(&self, from: &Path, to: &Path) -> BrowseResult<()> {
        self.check(from)?;
        self.inner.rename(from, to)
    }

    fn path_exists(&self, path: &Path) -> bool {
        self.inner.path_exists(path)
    }

    fn is_directory(&self, path: &Path) -> bool {
        self.inner.is_directory(path)
    }

    fn is_readable(&self, path: &Path) -> bool {
        self.check(path).is_ok() && self.inner.is_readable(path)
    }

    fn is_same_entry(&self, a: &Path, b: &Path) -> bool {
        self.inner.is_same_entry(a, b)
    }

    fn create_directory(&self, path: &Path) -> BrowseResult<()> {
        if let Some(parent) = path.parent() {
            self.check(parent)?;
        }
        self.inner.create_directory(path)
    }

    fn remove(&self, path: &Path) -> BrowseResult<()> {
        self.check(path)?;
        self.inner.remove(path)
    }
}
