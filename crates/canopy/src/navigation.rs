//! Keeps the directory tree and the entry list in agreement.
//!
//! [`NavigationSynchronizer`] owns the single [`NavigationState`] of a
//! browsing session together with the [`EntryRepository`] and the
//! [`DirectoryTree`]. Every change of directory goes through it.
//!
//! # Consistency
//!
//! A directory is always listed before it becomes current. When listing
//! fails the current path, the displayed list and the tree selection stay
//! as they were, `navigation_failed` is emitted and the error is returned.
//! On success the list is replaced, the path updated and `navigation_changed`
//! emitted, all before the call returns.
//!
//! # File Operations
//!
//! Create, delete and rename go through [`crate::operations`]. The list is
//! rebuilt only after the operation succeeded.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use canopy_core::Signal;
use canopy_core::logging::targets;

use crate::config::SessionSnapshot;
use crate::entry::{DirectoryEntry, EntryFilter, EntryList};
use crate::error::{BrowseError, BrowseResult};
use crate::fs::FileSystem;
use crate::operations;
use crate::repository::{EntryProvider, EntryRepository};
use crate::tree::DirectoryTree;
use crate::viewer::{FileClassifier, FileKind};

/// The browsing state shared by every component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    current_path: PathBuf,
    show_all_entries: bool,
    selection: Option<usize>,
}

impl NavigationState {
    /// The directory on display.
    pub fn current_path(&self) -> &Path {
        &self.current_path
    }

    /// Whether the list shows directories and hidden entries.
    pub fn show_all_entries(&self) -> bool {
        self.show_all_entries
    }

    /// The selected list row.
    pub fn selection(&self) -> Option<usize> {
        self.selection
    }
}

/// Events emitted towards the presentation layer.
pub struct NavigationSignals {
    /// The list now shows `entries` for `path`.
    pub navigation_changed: Signal<(PathBuf, EntryList)>,

    /// Listing `path` failed; the previous view is still on display.
    /// Args: (path, reason)
    pub navigation_failed: Signal<(PathBuf, String)>,

    /// A file was activated and should be shown by the matching viewer.
    pub open_file: Signal<(PathBuf, FileKind)>,

    /// The tree selection moved to a new node.
    pub tree_selection_changed: Signal<PathBuf>,

    /// The list selection changed.
    pub selection_changed: Signal<Option<usize>>,
}

impl Default for NavigationSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationSignals {
    /// Creates a new set of navigation signals.
    pub fn new() -> Self {
        Self {
            navigation_changed: Signal::new(),
            navigation_failed: Signal::new(),
            open_file: Signal::new(),
            tree_selection_changed: Signal::new(),
            selection_changed: Signal::new(),
        }
    }
}

/// What activating a list entry did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// The entry was a directory and is now on display.
    Navigated(PathBuf),
    /// The entry was a file and was handed to a viewer.
    Opened(PathBuf, FileKind),
    /// Nothing happened: the row was invalid, or the file is not viewable.
    Ignored,
}

/// Owns the current path and keeps tree and list in step.
pub struct NavigationSynchronizer {
    fs: Arc<dyn FileSystem>,
    repository: EntryRepository,
    tree: DirectoryTree,
    classifier: FileClassifier,
    state: NavigationState,
    signals: NavigationSignals,
}

impl NavigationSynchronizer {
    /// Opens a session showing `start`.
    ///
    /// Fails if `start` cannot be listed.
    pub fn open(
        fs: Arc<dyn FileSystem>,
        start: &Path,
        show_all_entries: bool,
        classifier: FileClassifier,
    ) -> BrowseResult<Self> {
        let mut repository =
            EntryRepository::new(fs.clone(), EntryFilter::for_show_all(show_all_entries));
        repository.load(start)?;

        let mut tree = DirectoryTree::new(fs.clone());
        tree.reveal(start);
        tracing::debug!(target: targets::NAVIGATION, path = %start.display(), "session opened");

        Ok(Self {
            fs,
            repository,
            tree,
            classifier,
            state: NavigationState {
                current_path: start.to_path_buf(),
                show_all_entries,
                selection: None,
            },
            signals: NavigationSignals::new(),
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The browsing state.
    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    /// The directory on display.
    pub fn current_path(&self) -> &Path {
        &self.state.current_path
    }

    /// The displayed list.
    pub fn entry_list(&self) -> Option<&EntryList> {
        self.repository.current()
    }

    /// The displayed entries.
    pub fn entries(&self) -> &[DirectoryEntry] {
        self.repository
            .current()
            .map(EntryList::entries)
            .unwrap_or_default()
    }

    /// The list data provider.
    pub fn repository(&self) -> &EntryRepository {
        &self.repository
    }

    /// The directory tree.
    pub fn tree(&self) -> &DirectoryTree {
        &self.tree
    }

    /// The directory tree, for expanding and collapsing nodes.
    pub fn tree_mut(&mut self) -> &mut DirectoryTree {
        &mut self.tree
    }

    /// The filesystem in use.
    pub fn file_system(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    /// The outward events.
    pub fn signals(&self) -> &NavigationSignals {
        &self.signals
    }

    /// The current path and filter toggle, for restoring the next run.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            last_path: self.state.current_path.clone(),
            show_all_entries: self.state.show_all_entries,
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// A tree node was activated: show its contents.
    pub fn activate_tree_node(&mut self, path: &Path) -> BrowseResult<()> {
        self.show(path)?;
        if self.tree.select(path) {
            self.signals.tree_selection_changed.emit(path.to_path_buf());
        }
        Ok(())
    }

    /// A list row was activated.
    ///
    /// Directories are entered and revealed in the tree. Viewable files are
    /// announced through `open_file`. Anything else is ignored.
    pub fn activate_list_entry(&mut self, index: usize) -> BrowseResult<Activation> {
        let Some(entry) = self.entries().get(index).cloned() else {
            tracing::debug!(target: targets::NAVIGATION, index, "activation of missing row ignored");
            return Ok(Activation::Ignored);
        };
        let path = entry.full_path().to_path_buf();

        if entry.is_directory() {
            self.show(&path)?;
            self.reveal_in_tree(&path);
            return Ok(Activation::Navigated(path));
        }

        if !self.fs.is_readable(&path) {
            tracing::debug!(target: targets::NAVIGATION, path = %path.display(), "file not readable");
            return Ok(Activation::Ignored);
        }
        match self.classifier.classify(&path) {
            Some(kind) => {
                tracing::debug!(target: targets::NAVIGATION, path = %path.display(), %kind, "open file");
                self.signals.open_file.emit((path.clone(), kind));
                Ok(Activation::Opened(path, kind))
            }
            None => Ok(Activation::Ignored),
        }
    }

    /// Show `path` and reveal it in the tree.
    pub fn navigate_to(&mut self, path: &Path) -> BrowseResult<()> {
        self.show(path)?;
        self.reveal_in_tree(path);
        Ok(())
    }

    /// Switch between "everything" and "visible files only", then re-list.
    ///
    /// The new filter is kept even if the re-list fails.
    pub fn set_filter(&mut self, show_all: bool) -> BrowseResult<()> {
        self.state.show_all_entries = show_all;
        self.repository
            .set_filter(EntryFilter::for_show_all(show_all));
        self.refresh()
    }

    /// Re-list the current directory.
    pub fn refresh(&mut self) -> BrowseResult<()> {
        let path = self.state.current_path.clone();
        self.show(&path)
    }

    /// Re-list `dir` if it is the directory on display.
    ///
    /// Returns whether a refresh happened.
    pub fn refresh_directory(&mut self, dir: &Path) -> BrowseResult<bool> {
        if dir != self.state.current_path {
            return Ok(false);
        }
        self.refresh().map(|()| true)
    }

    /// Select a list row. Rows past the end clear the selection.
    pub fn select(&mut self, index: Option<usize>) {
        let index = index.filter(|&i| i < self.repository.count());
        if self.state.selection != index {
            self.state.selection = index;
            self.signals.selection_changed.emit(index);
        }
    }

    /// The selected list entry.
    pub fn selected_entry(&self) -> Option<&DirectoryEntry> {
        self.repository.get(self.state.selection?)
    }

    fn show(&mut self, path: &Path) -> BrowseResult<()> {
        let list = match self.repository.list(path) {
            Ok(list) => list,
            Err(err) => {
                tracing::warn!(target: targets::NAVIGATION, path = %path.display(), %err, "navigation failed");
                self.signals
                    .navigation_failed
                    .emit((path.to_path_buf(), err.to_string()));
                return Err(err);
            }
        };

        // A refresh of the same directory keeps the selected entry by name.
        let kept = if path == self.state.current_path {
            self.selected_entry().map(|e| e.name().to_string())
        } else {
            None
        };
        let selection = kept.and_then(|name| list.index_of(&name));

        self.repository.replace(list.clone());
        self.state.current_path = path.to_path_buf();
        self.select(selection);
        tracing::debug!(target: targets::NAVIGATION, path = %path.display(), count = list.len(), "navigated");
        self.signals
            .navigation_changed
            .emit((path.to_path_buf(), list));
        Ok(())
    }

    fn reveal_in_tree(&mut self, path: &Path) {
        if self.tree.reveal(path) {
            self.signals.tree_selection_changed.emit(path.to_path_buf());
        }
    }

    // =========================================================================
    // File operations
    // =========================================================================

    /// Where a new folder goes: the selected list entry, else the selected
    /// tree node, else the current directory.
    fn create_target(&self) -> PathBuf {
        if let Some(entry) = self.selected_entry() {
            return entry.full_path().to_path_buf();
        }
        self.tree
            .selected()
            .unwrap_or(&self.state.current_path)
            .to_path_buf()
    }

    /// Create folder `name` in the operation target (or its parent, when the
    /// target is a file).
    pub fn create_folder(&mut self, name: &str) -> BrowseResult<PathBuf> {
        let target = self.create_target();
        let parent = if self.fs.is_directory(&target) {
            target
        } else {
            target
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| BrowseError::not_found(&target))?
        };

        let created = operations::create_folder(self.fs.as_ref(), &parent, name)?;
        self.refresh_after_operation();
        Ok(created)
    }

    /// Delete the selected list entry.
    ///
    /// Only the list selection is considered. With nothing selected this
    /// does nothing and returns `None`.
    pub fn delete_selected(&mut self) -> BrowseResult<Option<PathBuf>> {
        let Some(target) = self.selected_entry().map(|e| e.full_path().to_path_buf()) else {
            tracing::debug!(target: targets::NAVIGATION, "delete without selection ignored");
            return Ok(None);
        };
        operations::delete_entry(self.fs.as_ref(), &target)?;
        self.refresh_after_operation();
        Ok(Some(target))
    }

    /// Rename the entry at `path`, keeping its extension.
    ///
    /// Renaming the directory on display, or one of its ancestors, follows
    /// the move.
    pub fn rename_entry(&mut self, path: &Path, new_base: &str) -> BrowseResult<PathBuf> {
        let renamed = operations::rename_entry(self.fs.as_ref(), path, new_base)?;
        self.follow_rename(path, &renamed);
        Ok(renamed)
    }

    /// Bring the view up to date after `from` was renamed to `to`.
    pub fn follow_rename(&mut self, from: &Path, to: &Path) {
        match self.state.current_path.strip_prefix(from) {
            Ok(rest) => {
                let moved = to.join(rest);
                if self.show(&moved).is_ok() {
                    self.reveal_in_tree(&moved);
                }
            }
            Err(_) => self.refresh_after_operation(),
        }
    }

    fn refresh_after_operation(&mut self) {
        if let Err(err) = self.refresh() {
            tracing::warn!(target: targets::NAVIGATION, %err, "refresh after file operation failed");
        }
    }
}

impl std::fmt::Debug for NavigationSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationSynchronizer")
            .field("state", &self.state)
            .field("tree", &self.tree)
            .finish()
    }
}

static_assertions::assert_impl_all!(NavigationSynchronizer: Send, Sync);
