//! The browsing session: one of each service, wired together.
//!
//! [`BrowserSession`] is the composition root. It owns the timer queue, the
//! [`NavigationSynchronizer`], the [`PressHoldDetector`], the
//! [`RenameController`] and, when enabled, a [`DirectoryWatcher`]. The
//! presentation layer feeds it [`BrowserInput`]s and subscribes to the
//! components' signal sets.
//!
//! # Event Loop
//!
//! The session never blocks or spawns. The host loop is expected to:
//!
//! 1. Wait for input, or at most [`BrowserSession::time_until_next_timer`].
//! 2. Pass input to [`BrowserSession::dispatch`].
//! 3. Call [`BrowserSession::run_pending`] when the wait times out.
//!
//! Expired timers are always handled before new input, so a release that
//! arrives after the hold duration still produces the long click first.
//!
//! # Example
//!
//! ```no_run
//! use canopy::{BrowserConfig, BrowserInput, BrowserSession};
//!
//! let mut session = BrowserSession::new(BrowserConfig::default())?;
//! session.navigator().signals().navigation_changed.connect(|(path, list)| {
//!     println!("{}: {} entries", path.display(), list.len());
//! });
//! session.dispatch(BrowserInput::ListEntryActivated(0))?;
//! # Ok::<(), canopy::BrowseError>(())
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use canopy_core::logging::targets;
use canopy_core::{Clock, SystemClock, TimerQueue};

use crate::config::{BrowserConfig, SessionSnapshot};
use crate::error::{BrowseError, BrowseResult};
use crate::fs::{FileSystem, LocalFileSystem};
use crate::gesture::PressHoldDetector;
use crate::navigation::NavigationSynchronizer;
use crate::rename::RenameController;
use crate::watcher::DirectoryWatcher;

/// Input from the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserInput {
    /// A press landed on a list row.
    PointerDown(usize),
    /// The pointer was released.
    PointerUp,
    /// The pointer left the list.
    PointerLeft,
    /// A tree node was activated.
    TreeNodeActivated(PathBuf),
    /// A list row was activated (double click or enter).
    ListEntryActivated(usize),
    /// The "show everything" toggle changed.
    FilterToggled(bool),
    /// The list selection changed.
    EntrySelected(Option<usize>),
    /// The rename editor text changed.
    RenameEdited(String),
    /// The rename editor was confirmed with this text.
    RenameCommitRequested(String),
    /// The rename editor was dismissed.
    RenameCancelRequested,
    /// The rename editor lost focus.
    RenameFocusLost,
    /// The create-folder dialog was confirmed.
    CreateFolderRequested(String),
    /// The delete dialog was confirmed.
    DeleteRequested,
    /// The rename dialog was confirmed for `path`.
    RenameRequested {
        /// The entry to rename.
        path: PathBuf,
        /// The new base name; the extension is kept.
        new_base: String,
    },
}

/// A browsing session.
pub struct BrowserSession {
    config: BrowserConfig,
    timers: TimerQueue,
    navigator: NavigationSynchronizer,
    gesture: PressHoldDetector,
    rename: RenameController,
    watcher: Option<DirectoryWatcher>,
}

impl BrowserSession {
    /// Opens a session on the local filesystem.
    ///
    /// Starts in the configured directory, falling back to the home
    /// directory and then the filesystem root.
    pub fn new(config: BrowserConfig) -> BrowseResult<Self> {
        Self::with_parts(config, Arc::new(LocalFileSystem), Arc::new(SystemClock))
    }

    /// Opens a session with an explicit filesystem and clock.
    pub fn with_parts(
        config: BrowserConfig,
        fs: Arc<dyn FileSystem>,
        clock: Arc<dyn Clock>,
    ) -> BrowseResult<Self> {
        let navigator = open_first(&config, fs)?;

        let watcher = if config.watch_changes {
            match DirectoryWatcher::new(config.watch_debounce) {
                Ok(watcher) => Some(watcher),
                Err(err) => {
                    tracing::warn!(target: targets::WATCHER, %err, "change notification unavailable");
                    None
                }
            }
        } else {
            None
        };

        let mut session = Self {
            gesture: PressHoldDetector::new(config.long_press),
            timers: TimerQueue::new(clock),
            rename: RenameController::new(),
            navigator,
            watcher,
            config,
        };
        session.sync_watcher();
        Ok(session)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The configuration the session was opened with.
    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    /// The navigation state, list and tree.
    pub fn navigator(&self) -> &NavigationSynchronizer {
        &self.navigator
    }

    /// Mutable access for tree expansion.
    pub fn navigator_mut(&mut self) -> &mut NavigationSynchronizer {
        &mut self.navigator
    }

    /// The press-hold detector.
    pub fn gesture(&self) -> &PressHoldDetector {
        &self.gesture
    }

    /// The rename workflow.
    pub fn rename(&self) -> &RenameController {
        &self.rename
    }

    /// The timer queue.
    pub fn timers(&self) -> &TimerQueue {
        &self.timers
    }

    /// The change watcher, if one is running.
    pub fn watcher(&self) -> Option<&DirectoryWatcher> {
        self.watcher.as_ref()
    }

    /// The directory on display.
    pub fn current_path(&self) -> &Path {
        self.navigator.current_path()
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Handle one input event.
    ///
    /// Errors have already been reported through the matching signal when
    /// this returns; they are returned as well for callers that want them.
    pub fn dispatch(&mut self, input: BrowserInput) -> BrowseResult<()> {
        self.run_pending();
        tracing::trace!(target: targets::NAVIGATION, ?input, "dispatch");

        match input {
            BrowserInput::PointerDown(index) => {
                self.gesture.pointer_down(index, &mut self.timers);
                Ok(())
            }
            BrowserInput::PointerUp => {
                self.gesture.pointer_up(&mut self.timers);
                Ok(())
            }
            BrowserInput::PointerLeft => {
                self.gesture.pointer_left(&mut self.timers);
                Ok(())
            }
            BrowserInput::TreeNodeActivated(path) => {
                self.interrupt();
                let result = self.navigator.activate_tree_node(&path);
                self.sync_watcher();
                result
            }
            BrowserInput::ListEntryActivated(index) => {
                self.interrupt();
                let result = self.navigator.activate_list_entry(index).map(|_| ());
                self.sync_watcher();
                result
            }
            BrowserInput::FilterToggled(show_all) => {
                self.interrupt();
                self.navigator.set_filter(show_all)
            }
            BrowserInput::EntrySelected(index) => {
                self.navigator.select(index);
                Ok(())
            }
            BrowserInput::RenameEdited(text) => {
                self.rename.edit(&text);
                Ok(())
            }
            BrowserInput::RenameCommitRequested(text) => {
                let result = self.rename.commit(Some(&text), &mut self.navigator);
                self.sync_watcher();
                result.map(|_| ())
            }
            BrowserInput::RenameCancelRequested => {
                self.rename.cancel();
                Ok(())
            }
            BrowserInput::RenameFocusLost => {
                let result = self.rename.focus_lost(&mut self.navigator);
                self.sync_watcher();
                result.map(|_| ())
            }
            BrowserInput::CreateFolderRequested(name) => {
                self.interrupt();
                self.navigator.create_folder(&name).map(|_| ())
            }
            BrowserInput::DeleteRequested => {
                self.interrupt();
                let result = self.navigator.delete_selected().map(|_| ());
                self.sync_watcher();
                result
            }
            BrowserInput::RenameRequested { path, new_base } => {
                self.interrupt();
                let result = self.navigator.rename_entry(&path, &new_base).map(|_| ());
                self.sync_watcher();
                result
            }
        }
    }

    /// Handle expired timers.
    ///
    /// Returns how many long clicks fired.
    pub fn run_pending(&mut self) -> usize {
        let mut fired = 0;
        for id in self.timers.process_expired() {
            if let Some(index) = self.gesture.on_timer(id) {
                fired += 1;
                self.rename.begin(index, self.navigator.entries());
            }
        }
        fired
    }

    /// How long the host loop may sleep before [`run_pending`](Self::run_pending)
    /// has work to do.
    pub fn time_until_next_timer(&mut self) -> Option<Duration> {
        self.timers.time_until_next()
    }

    /// Refresh the list if the directory on display changed on disk.
    ///
    /// Returns whether a refresh happened.
    pub fn process_filesystem_events(&mut self) -> BrowseResult<bool> {
        let Some(watcher) = self.watcher.as_mut() else {
            return Ok(false);
        };
        let events = watcher.poll();
        if !events.iter().any(|event| watcher.affects_watched(event)) {
            return Ok(false);
        }

        tracing::debug!(target: targets::WATCHER, count = events.len(), "current directory changed");
        self.refresh().map(|()| true)
    }

    /// Re-list the directory on display.
    ///
    /// An open rename follows its entry to its new row, or is cancelled if
    /// the entry is gone. A held press is dropped, since its row may now
    /// show a different entry.
    pub fn refresh(&mut self) -> BrowseResult<()> {
        self.gesture.reset(&mut self.timers);
        self.navigator.refresh()?;
        self.rename.relocate(self.navigator.entries());
        Ok(())
    }

    // =========================================================================
    // Snapshot
    // =========================================================================

    /// The state to persist for the next run.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.navigator.snapshot()
    }

    /// Go back to a persisted state.
    ///
    /// The filter toggle is applied even if the saved directory is gone.
    pub fn restore(&mut self, snapshot: &SessionSnapshot) -> BrowseResult<()> {
        self.interrupt();
        if snapshot.show_all_entries != self.navigator.state().show_all_entries() {
            if let Err(err) = self.navigator.set_filter(snapshot.show_all_entries) {
                tracing::warn!(target: targets::NAVIGATION, %err, "re-list after restoring filter failed");
            }
        }
        let result = self.navigator.navigate_to(&snapshot.last_path);
        self.sync_watcher();
        result
    }

    /// Drop any open rename and tracked press before the view changes.
    fn interrupt(&mut self) {
        self.rename.cancel();
        self.gesture.reset(&mut self.timers);
    }

    fn sync_watcher(&mut self) {
        let Some(watcher) = self.watcher.as_mut() else {
            return;
        };
        let current = self.navigator.current_path();
        if let Err(err) = watcher.watch_directory(current) {
            tracing::warn!(target: targets::WATCHER, path = %current.display(), %err, "cannot watch directory");
        }
    }
}

fn open_first(
    config: &BrowserConfig,
    fs: Arc<dyn FileSystem>,
) -> BrowseResult<NavigationSynchronizer> {
    let mut first_error: Option<BrowseError> = None;
    for start in config.start_candidates() {
        match NavigationSynchronizer::open(
            fs.clone(),
            &start,
            config.show_all_entries,
            config.classifier(),
        ) {
            Ok(navigator) => return Ok(navigator),
            Err(err) => {
                tracing::warn!(target: targets::NAVIGATION, path = %start.display(), %err, "cannot open start directory");
                first_error.get_or_insert(err);
            }
        }
    }
    Err(first_error.unwrap_or_else(|| BrowseError::not_found(config.resolved_start_path())))
}

impl std::fmt::Debug for BrowserSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserSession")
            .field("navigator", &self.navigator)
            .field("gesture", &self.gesture)
            .field("rename", &self.rename)
            .field("watcher", &self.watcher)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::ManualClock;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Arc<ManualClock>, BrowserSession) {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("photos")).unwrap();
        fs::write(temp.path().join("a.txt"), "a").unwrap();
        let clock = Arc::new(ManualClock::new());
        let config = BrowserConfig::new()
            .start_path(temp.path())
            .watch_changes(false);
        let session =
            BrowserSession::with_parts(config, Arc::new(LocalFileSystem), clock.clone()).unwrap();
        (temp, clock, session)
    }

    #[test]
    fn test_opens_configured_start() {
        let (temp, _clock, session) = setup();
        assert_eq!(session.current_path(), temp.path());
        assert!(session.watcher().is_none());
    }

    #[test]
    fn test_missing_start_falls_back() {
        let temp = TempDir::new().unwrap();
        let config = BrowserConfig::new()
            .start_path(temp.path().join("gone"))
            .watch_changes(false);
        let session = BrowserSession::with_parts(
            config,
            Arc::new(LocalFileSystem),
            Arc::new(ManualClock::new()),
        )
        .unwrap();
        assert_ne!(session.current_path(), temp.path().join("gone"));
    }

    #[test]
    fn test_long_press_opens_rename() {
        let (_temp, clock, mut session) = setup();
        session.dispatch(BrowserInput::PointerDown(1)).unwrap();
        assert_eq!(session.time_until_next_timer(), Some(Duration::from_millis(1000)));

        clock.advance(Duration::from_millis(1000));
        assert_eq!(session.run_pending(), 1);
        assert_eq!(session.rename().session().unwrap().original_name(), "a");
    }

    #[test]
    fn test_navigation_cancels_rename() {
        let (temp, clock, mut session) = setup();
        session.dispatch(BrowserInput::PointerDown(1)).unwrap();
        clock.advance(Duration::from_millis(1000));
        session.dispatch(BrowserInput::PointerUp).unwrap();
        assert!(session.rename().is_editing());

        session
            .dispatch(BrowserInput::TreeNodeActivated(temp.path().join("photos")))
            .unwrap();
        assert!(!session.rename().is_editing());
        assert!(temp.path().join("a.txt").exists());
    }

    #[test]
    fn test_refresh_drops_held_press() {
        let (temp, clock, mut session) = setup();
        session.dispatch(BrowserInput::PointerDown(1)).unwrap();
        fs::write(temp.path().join("0.txt"), "").unwrap();
        session.refresh().unwrap();

        clock.advance(Duration::from_millis(1000));
        assert_eq!(session.run_pending(), 0);
        assert!(!session.rename().is_editing());
    }

    #[test]
    fn test_snapshot_and_restore() {
        let (temp, _clock, mut session) = setup();
        session.dispatch(BrowserInput::ListEntryActivated(0)).unwrap();
        let snapshot = session.snapshot();
        assert_eq!(snapshot.last_path, temp.path().join("photos"));

        session
            .dispatch(BrowserInput::TreeNodeActivated(temp.path().to_path_buf()))
            .unwrap();
        session.restore(&snapshot).unwrap();
        assert_eq!(session.current_path(), temp.path().join("photos"));
        assert!(session.navigator().tree().is_expanded(&temp.path().join("photos")));
    }
}
