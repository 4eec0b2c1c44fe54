//! The hierarchical directory view.
//!
//! [`NonEmptyDirectoryFilter`] decides whether a node gets an expand
//! affordance. [`DirectoryTree`] keeps the expanded set and the selected
//! node, and lists a node's subdirectories on demand.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use canopy_core::logging::targets;

use crate::entry::{DirectoryEntry, EntryFilter, compare_entries};
use crate::error::BrowseResult;
use crate::fs::FileSystem;

/// Answers "does this directory have at least one child worth expanding".
///
/// The answer is computed on every call and never cached, so it follows
/// filesystem changes. Enumeration errors count as "no children".
pub struct NonEmptyDirectoryFilter {
    fs: Arc<dyn FileSystem>,
    filter: EntryFilter,
}

impl NonEmptyDirectoryFilter {
    /// Creates a filter counting only visible subdirectories.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self::with_filter(fs, EntryFilter::directories_only())
    }

    /// Creates a filter counting children that pass `filter`.
    pub fn with_filter(fs: Arc<dyn FileSystem>, filter: EntryFilter) -> Self {
        Self { fs, filter }
    }

    /// The child filter in use.
    pub fn filter(&self) -> EntryFilter {
        self.filter
    }

    /// Replace the child filter.
    pub fn set_filter(&mut self, filter: EntryFilter) {
        self.filter = filter;
    }

    /// Whether the directory at `path` has a child passing the filter.
    pub fn has_children(&self, path: &Path) -> bool {
        if !self.fs.is_directory(path) {
            return false;
        }
        self.probe(path)
    }

    /// Like [`has_children`](Self::has_children), but answers `false` for a
    /// file entry without touching the filesystem.
    pub fn entry_has_children(&self, entry: &DirectoryEntry) -> bool {
        if !entry.is_directory() {
            return false;
        }
        self.probe(entry.full_path())
    }

    fn probe(&self, path: &Path) -> bool {
        let filter = self.filter;
        match self.fs.any_child(path, &mut |child| filter.matches(child)) {
            Ok(found) => found,
            Err(err) => {
                tracing::debug!(target: targets::TREE, path = %path.display(), %err, "child probe failed");
                false
            }
        }
    }
}

impl std::fmt::Debug for NonEmptyDirectoryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NonEmptyDirectoryFilter")
            .field("filter", &self.filter)
            .finish()
    }
}

/// One child row in the directory tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    /// The directory name.
    pub name: String,
    /// The full path.
    pub path: PathBuf,
    /// Whether to show an expand affordance.
    pub expandable: bool,
}

/// Expansion and selection state of the directory tree.
pub struct DirectoryTree {
    fs: Arc<dyn FileSystem>,
    filter: NonEmptyDirectoryFilter,
    expanded: BTreeSet<PathBuf>,
    selected: Option<PathBuf>,
}

impl DirectoryTree {
    /// Creates a collapsed tree with nothing selected.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            filter: NonEmptyDirectoryFilter::new(fs.clone()),
            fs,
            expanded: BTreeSet::new(),
            selected: None,
        }
    }

    /// The non-empty filter deciding expand affordances.
    pub fn non_empty_filter(&self) -> &NonEmptyDirectoryFilter {
        &self.filter
    }

    /// The subdirectories of `path` in display order.
    pub fn children(&self, path: &Path) -> BrowseResult<Vec<TreeNode>> {
        let child_filter = EntryFilter::directories_only();
        let mut dirs: Vec<DirectoryEntry> = self
            .fs
            .list_directory(path)?
            .into_iter()
            .filter(|raw| child_filter.matches(raw))
            .map(DirectoryEntry::from)
            .collect();
        dirs.sort_by(compare_entries);

        Ok(dirs
            .into_iter()
            .map(|entry| TreeNode {
                expandable: self.filter.entry_has_children(&entry),
                name: entry.name().to_string(),
                path: entry.full_path().to_path_buf(),
            })
            .collect())
    }

    /// Whether `path` can be expanded.
    pub fn has_children(&self, path: &Path) -> bool {
        self.filter.has_children(path)
    }

    /// Expand or collapse one node.
    pub fn set_expanded(&mut self, path: &Path, expanded: bool) {
        if expanded {
            self.expanded.insert(path.to_path_buf());
        } else {
            self.expanded.remove(path);
        }
    }

    /// Whether `path` is expanded.
    pub fn is_expanded(&self, path: &Path) -> bool {
        self.expanded.contains(path)
    }

    /// The expanded nodes, shallowest first.
    pub fn expanded(&self) -> impl Iterator<Item = &Path> {
        self.expanded.iter().map(PathBuf::as_path)
    }

    /// Collapse every node.
    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    /// The selected node.
    pub fn selected(&self) -> Option<&Path> {
        self.selected.as_deref()
    }

    /// Select `path` without changing expansion.
    ///
    /// Returns `true` if the selection changed.
    pub fn select(&mut self, path: &Path) -> bool {
        if self.selected.as_deref() == Some(path) {
            return false;
        }
        self.selected = Some(path.to_path_buf());
        true
    }

    /// Collapse everything, then expand `path` and its ancestors and select
    /// it.
    ///
    /// Returns `true` if the selection changed.
    pub fn reveal(&mut self, path: &Path) -> bool {
        self.collapse_all();
        self.expanded
            .extend(path.ancestors().map(Path::to_path_buf));
        let changed = self.selected.as_deref() != Some(path);
        self.selected = Some(path.to_path_buf());
        tracing::debug!(target: targets::TREE, path = %path.display(), "node revealed");
        changed
    }
}

impl std::fmt::Debug for DirectoryTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryTree")
            .field("expanded", &self.expanded.len())
            .field("selected", &self.selected)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::LocalFileSystem;
    use std::fs;
    use tempfile::TempDir;

    fn setup_test_dir() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("projects/canopy/src")).unwrap();
        fs::create_dir(root.join("Music")).unwrap();
        fs::write(root.join("Music/track.mp3"), "").unwrap();
        fs::create_dir(root.join("empty")).unwrap();
        fs::create_dir_all(root.join("dotted/.cache")).unwrap();
        fs::write(root.join("notes.txt"), "").unwrap();
        temp
    }

    #[test]
    fn test_has_children() {
        let temp = setup_test_dir();
        let filter = NonEmptyDirectoryFilter::new(Arc::new(LocalFileSystem));

        assert!(filter.has_children(&temp.path().join("projects")));
        assert!(!filter.has_children(&temp.path().join("Music")));
        assert!(!filter.has_children(&temp.path().join("empty")));
        assert!(!filter.has_children(&temp.path().join("dotted")));
        assert!(!filter.has_children(&temp.path().join("notes.txt")));
        assert!(!filter.has_children(&temp.path().join("missing")));
    }

    #[test]
    fn test_has_children_with_full_filter() {
        let temp = setup_test_dir();
        let filter =
            NonEmptyDirectoryFilter::with_filter(Arc::new(LocalFileSystem), EntryFilter::all());
        assert!(filter.has_children(&temp.path().join("Music")));
        assert!(filter.has_children(&temp.path().join("dotted")));
        assert!(!filter.has_children(&temp.path().join("empty")));
    }

    #[test]
    fn test_file_entry_short_circuits() {
        let filter = NonEmptyDirectoryFilter::new(Arc::new(LocalFileSystem));
        let entry = DirectoryEntry::new("x", "/definitely/not/here/x", false);
        assert!(!filter.entry_has_children(&entry));
    }

    #[test]
    fn test_children_lists_visible_directories() {
        let temp = setup_test_dir();
        let tree = DirectoryTree::new(Arc::new(LocalFileSystem));

        let nodes = tree.children(temp.path()).unwrap();
        let names: Vec<_> = nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["dotted", "empty", "Music", "projects"]);

        let expandable: Vec<_> = nodes.iter().map(|n| n.expandable).collect();
        assert_eq!(expandable, vec![false, false, false, true]);
    }

    #[test]
    fn test_reveal_expands_ancestors_only() {
        let temp = setup_test_dir();
        let mut tree = DirectoryTree::new(Arc::new(LocalFileSystem));
        let music = temp.path().join("Music");
        let src = temp.path().join("projects/canopy/src");

        tree.set_expanded(&music, true);
        assert!(tree.reveal(&src));

        assert!(!tree.is_expanded(&music));
        assert!(tree.is_expanded(&src));
        assert!(tree.is_expanded(&temp.path().join("projects/canopy")));
        assert!(tree.is_expanded(temp.path()));
        assert_eq!(tree.selected(), Some(src.as_path()));

        assert!(!tree.reveal(&src));
    }

    #[test]
    fn test_set_expanded() {
        let mut tree = DirectoryTree::new(Arc::new(LocalFileSystem));
        let path = Path::new("/tmp/a");
        tree.set_expanded(path, true);
        assert!(tree.is_expanded(path));
        tree.set_expanded(path, false);
        assert!(!tree.is_expanded(path));
        assert_eq!(tree.expanded().count(), 0);
    }
}
