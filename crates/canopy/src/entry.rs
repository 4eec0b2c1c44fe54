//! Directory entries, entry lists and the canonical sort order.
//!
//! An [`EntryList`] is the sorted, filtered snapshot of one directory. Lists
//! are never patched: every refresh builds a new one.
//!
//! # Sort Order
//!
//! Directories sort before files. Within each group names compare
//! case-insensitively, character by character, without locale rules. Names
//! that are equal ignoring case are ordered by a case-sensitive comparison,
//! so the order is total and deterministic.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use crate::fs::RawEntry;

// ============================================================================
// DirectoryEntry
// ============================================================================

/// An immutable snapshot of one directory child.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DirectoryEntry {
    name: String,
    full_path: PathBuf,
    is_directory: bool,
}

impl DirectoryEntry {
    /// Creates an entry snapshot.
    pub fn new(name: impl Into<String>, full_path: impl Into<PathBuf>, is_directory: bool) -> Self {
        Self {
            name: name.into(),
            full_path: full_path.into(),
            is_directory,
        }
    }

    /// The display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The full path.
    pub fn full_path(&self) -> &Path {
        &self.full_path
    }

    /// Whether the entry is a directory.
    pub fn is_directory(&self) -> bool {
        self.is_directory
    }

    /// The directory containing this entry.
    pub fn parent(&self) -> Option<&Path> {
        self.full_path.parent()
    }

    /// Splits the name into its editable base and the preserved extension.
    ///
    /// See [`split_name`].
    pub fn split_name(&self) -> (&str, Option<&str>) {
        split_name(&self.name, self.is_directory)
    }
}

impl From<RawEntry> for DirectoryEntry {
    fn from(raw: RawEntry) -> Self {
        Self {
            name: raw.name,
            full_path: raw.path,
            is_directory: raw.is_dir,
        }
    }
}

/// Splits an entry name into `(base, extension)`.
///
/// Directories have no extension. For files the extension is everything
/// after the last dot, unless that dot is the first character, so
/// `"archive.tar.gz"` gives `("archive.tar", Some("gz"))` and `".bashrc"`
/// has no extension.
pub fn split_name(name: &str, is_directory: bool) -> (&str, Option<&str>) {
    if is_directory {
        return (name, None);
    }
    match name.rfind('.') {
        Some(dot) if dot > 0 => (&name[..dot], Some(&name[dot + 1..])),
        _ => (name, None),
    }
}

/// Joins a base name with an optional extension.
pub fn join_name(base: &str, extension: Option<&str>) -> String {
    match extension {
        Some(ext) => format!("{base}.{ext}"),
        None => base.to_string(),
    }
}

// ============================================================================
// Sorting
// ============================================================================

/// Compares two names ignoring case, without locale rules.
pub fn compare_names_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// The canonical entry order: directories first, then names ignoring case,
/// then names by exact comparison.
pub fn compare_entries(a: &DirectoryEntry, b: &DirectoryEntry) -> Ordering {
    b.is_directory
        .cmp(&a.is_directory)
        .then_with(|| compare_names_ignore_case(&a.name, &b.name))
        .then_with(|| a.name.cmp(&b.name))
}

/// Sorts entries into canonical order.
pub fn sort_entries(entries: &mut [DirectoryEntry]) {
    entries.sort_by(compare_entries);
}

// ============================================================================
// EntryFilter
// ============================================================================

/// Which kinds of children a listing includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryFilter {
    /// Include directories.
    pub directories: bool,
    /// Include regular files.
    pub files: bool,
    /// Include names starting with a dot.
    pub hidden: bool,
}

impl EntryFilter {
    /// Everything: directories, files and hidden entries.
    pub const fn all() -> Self {
        Self {
            directories: true,
            files: true,
            hidden: true,
        }
    }

    /// Visible files only.
    pub const fn files_only() -> Self {
        Self {
            directories: false,
            files: true,
            hidden: false,
        }
    }

    /// Visible directories only, as shown in the tree.
    pub const fn directories_only() -> Self {
        Self {
            directories: true,
            files: false,
            hidden: false,
        }
    }

    /// The list filter for the "show all entries" toggle.
    pub const fn for_show_all(show_all: bool) -> Self {
        if show_all {
            Self::all()
        } else {
            Self::files_only()
        }
    }

    /// Whether `entry` passes this filter.
    pub fn matches(&self, entry: &RawEntry) -> bool {
        if entry.is_hidden() && !self.hidden {
            return false;
        }
        if entry.is_dir {
            self.directories
        } else {
            self.files
        }
    }
}

impl Default for EntryFilter {
    fn default() -> Self {
        Self::all()
    }
}

// ============================================================================
// EntryList
// ============================================================================

/// The sorted contents of one directory at the moment it was listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryList {
    path: PathBuf,
    entries: Vec<DirectoryEntry>,
}

impl EntryList {
    /// Builds a list from unsorted entries, imposing canonical order.
    pub fn new(path: impl Into<PathBuf>, mut entries: Vec<DirectoryEntry>) -> Self {
        sort_entries(&mut entries);
        Self {
            path: path.into(),
            entries,
        }
    }

    /// The directory this list describes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the directory listed as empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry at `index`.
    pub fn get(&self, index: usize) -> Option<&DirectoryEntry> {
        self.entries.get(index)
    }

    /// Iterates entries in display order.
    pub fn iter(&self) -> std::slice::Iter<'_, DirectoryEntry> {
        self.entries.iter()
    }

    /// The entries as a slice.
    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    /// The row of the entry named `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    /// The names in display order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a EntryList {
    type Item = &'a DirectoryEntry;
    type IntoIter = std::slice::Iter<'a, DirectoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
