//! Directory enumeration and the list data provider.
//!
//! [`EntryRepository`] turns a directory path into an [`EntryList`] and owns
//! the list currently on display. It only reads the filesystem; renames,
//! deletes and creates happen elsewhere and call back into
//! [`EntryProvider::refresh`] once they succeed.

use std::path::Path;
use std::sync::Arc;

use canopy_core::logging::targets;
use canopy_core::{PerfSpan, Signal};

use crate::entry::{DirectoryEntry, EntryFilter, EntryList};
use crate::error::BrowseResult;
use crate::fs::FileSystem;

/// Change notifications for an [`EntryProvider`].
pub struct ProviderSignals {
    /// Emitted just before the provider replaces its contents.
    pub model_about_to_reset: Signal<()>,

    /// Emitted after the provider replaced its contents.
    pub model_reset: Signal<()>,
}

impl Default for ProviderSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderSignals {
    /// Creates a new set of provider signals.
    pub fn new() -> Self {
        Self {
            model_about_to_reset: Signal::new(),
            model_reset: Signal::new(),
        }
    }

    /// Emits the reset pair around `reset_fn`.
    pub fn emit_reset<F>(&self, reset_fn: F)
    where
        F: FnOnce(),
    {
        self.model_about_to_reset.emit(());
        reset_fn();
        self.model_reset.emit(());
    }
}

/// A flat, index-addressed source of entries for a rendering layer.
pub trait EntryProvider {
    /// The number of entries on display.
    fn count(&self) -> usize;

    /// The entry at `index`, if any.
    fn get(&self, index: usize) -> Option<&DirectoryEntry>;

    /// Rebuild the contents from the filesystem.
    ///
    /// On failure the previous contents stay in place.
    fn refresh(&mut self) -> BrowseResult<()>;

    /// The provider's change notifications.
    fn signals(&self) -> &ProviderSignals;
}

/// Enumerates directories and holds the displayed [`EntryList`].
pub struct EntryRepository {
    fs: Arc<dyn FileSystem>,
    filter: EntryFilter,
    current: Option<EntryList>,
    signals: ProviderSignals,
}

impl EntryRepository {
    /// Creates a repository with nothing loaded.
    pub fn new(fs: Arc<dyn FileSystem>, filter: EntryFilter) -> Self {
        Self {
            fs,
            filter,
            current: None,
            signals: ProviderSignals::new(),
        }
    }

    /// The filter applied to listings.
    pub fn filter(&self) -> EntryFilter {
        self.filter
    }

    /// Replace the filter. The displayed list is not rebuilt.
    pub fn set_filter(&mut self, filter: EntryFilter) {
        self.filter = filter;
    }

    /// List `path` under the current filter without touching the displayed
    /// list.
    #[tracing::instrument(skip(self), target = "canopy::repository", level = "debug")]
    pub fn list(&self, path: &Path) -> BrowseResult<EntryList> {
        let _perf = PerfSpan::new("list_directory");
        let raw = self.fs.list_directory(path).inspect_err(|err| {
            tracing::warn!(target: targets::REPOSITORY, path = %path.display(), %err, "enumeration failed");
        })?;

        let entries: Vec<DirectoryEntry> = raw
            .into_iter()
            .filter(|entry| self.filter.matches(entry))
            .map(DirectoryEntry::from)
            .collect();
        tracing::trace!(target: targets::REPOSITORY, count = entries.len(), "directory listed");
        Ok(EntryList::new(path, entries))
    }

    /// List `path` and make the result the displayed list.
    ///
    /// If enumeration fails the displayed list is left as it was.
    pub fn load(&mut self, path: &Path) -> BrowseResult<()> {
        let list = self.list(path)?;
        self.replace(list);
        Ok(())
    }

    /// Make `list` the displayed list, emitting the reset pair.
    pub fn replace(&mut self, list: EntryList) {
        let current = &mut self.current;
        self.signals.emit_reset(|| *current = Some(list));
        tracing::debug!(target: targets::REPOSITORY, path = ?self.current_path(), "displayed list replaced");
    }

    /// The displayed list, if anything has been loaded.
    pub fn current(&self) -> Option<&EntryList> {
        self.current.as_ref()
    }

    /// The directory backing the displayed list.
    pub fn current_path(&self) -> Option<&Path> {
        self.current.as_ref().map(EntryList::path)
    }

    /// The filesystem this repository reads.
    pub fn file_system(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }
}

impl EntryProvider for EntryRepository {
    fn count(&self) -> usize {
        self.current.as_ref().map_or(0, EntryList::len)
    }

    fn get(&self, index: usize) -> Option<&DirectoryEntry> {
        self.current.as_ref()?.get(index)
    }

    fn refresh(&mut self) -> BrowseResult<()> {
        let Some(path) = self.current_path().map(Path::to_path_buf) else {
            return Ok(());
        };
        self.load(&path)
    }

    fn signals(&self) -> &ProviderSignals {
        &self.signals
    }
}

impl std::fmt::Debug for EntryRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryRepository")
            .field("filter", &self.filter)
            .field("current_path", &self.current_path())
            .field("count", &self.count())
            .finish()
    }
}
