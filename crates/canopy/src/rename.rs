//! In-place rename of list entries.
//!
//! A long click opens a [`RenameSession`] over the clicked row. The editor
//! shows the base name only; a file's extension is kept aside and put back
//! when the rename is committed. Committing (confirm key or focus loss) and
//! cancelling both close the session. At most one session is open at a
//! time: opening a second one cancels the first without saving.

use std::ops::Range;
use std::path::PathBuf;

use canopy_core::Signal;
use canopy_core::logging::targets;

use crate::entry::{DirectoryEntry, join_name};
use crate::error::BrowseResult;
use crate::navigation::NavigationSynchronizer;
use crate::operations;

/// What the presentation layer needs to show the rename editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorRequest {
    /// The list row to overlay.
    pub row: usize,
    /// The initial editor text.
    pub text: String,
    /// The pre-selected character range (the whole text).
    pub selection: Range<usize>,
}

/// How a rename session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    /// The entry was renamed.
    Renamed {
        /// The old path.
        from: PathBuf,
        /// The new path.
        to: PathBuf,
    },
    /// The edit was blank or unchanged, so nothing was written. Also
    /// returned when no session was open.
    Unchanged,
    /// The session was cancelled.
    Cancelled,
    /// The rename was attempted and failed.
    Failed,
}

/// An open rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameSession {
    target: DirectoryEntry,
    row: usize,
    original_name: String,
    extension: Option<String>,
    edit_buffer: String,
}

impl RenameSession {
    fn new(target: DirectoryEntry, row: usize) -> Self {
        let (base, extension) = target.split_name();
        let original_name = base.to_string();
        let extension = extension.map(str::to_string);
        Self {
            edit_buffer: original_name.clone(),
            original_name,
            extension,
            target,
            row,
        }
    }

    /// The entry being renamed.
    pub fn target(&self) -> &DirectoryEntry {
        &self.target
    }

    /// The row the editor sits over.
    pub fn row(&self) -> usize {
        self.row
    }

    /// The editable part of the name when the session opened.
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    /// The preserved extension.
    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    /// The current editor text.
    pub fn edit_buffer(&self) -> &str {
        &self.edit_buffer
    }

    /// The full name the edit would produce.
    pub fn proposed_name(&self) -> String {
        join_name(&self.edit_buffer, self.extension.as_deref())
    }

    fn is_unchanged(&self) -> bool {
        self.edit_buffer.trim().is_empty() || self.edit_buffer == self.original_name
    }

    fn editor_request(&self) -> EditorRequest {
        EditorRequest {
            row: self.row,
            text: self.original_name.clone(),
            selection: 0..self.original_name.chars().count(),
        }
    }
}

/// Rename events.
pub struct RenameSignals {
    /// A session opened; show the editor.
    pub session_opened: Signal<EditorRequest>,

    /// The list was rebuilt and the entry under edit moved to another row.
    /// Args: new row
    pub session_moved: Signal<usize>,

    /// The session closed; hide the editor.
    pub session_closed: Signal<RenameOutcome>,

    /// A rename failed. Args: reason
    pub rename_failed: Signal<String>,
}

impl Default for RenameSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl RenameSignals {
    /// Creates a new set of rename signals.
    pub fn new() -> Self {
        Self {
            session_opened: Signal::new(),
            session_moved: Signal::new(),
            session_closed: Signal::new(),
            rename_failed: Signal::new(),
        }
    }
}

/// Runs the in-place rename workflow.
#[derive(Default)]
pub struct RenameController {
    session: Option<RenameSession>,
    signals: RenameSignals,
}

impl RenameController {
    /// Creates a controller with no open session.
    pub fn new() -> Self {
        Self::default()
    }

    /// The open session.
    pub fn session(&self) -> Option<&RenameSession> {
        self.session.as_ref()
    }

    /// Whether a session is open.
    pub fn is_editing(&self) -> bool {
        self.session.is_some()
    }

    /// The rename events.
    pub fn signals(&self) -> &RenameSignals {
        &self.signals
    }

    /// Open a session for row `index` of `entries`.
    ///
    /// An invalid row does nothing. An open session is cancelled first.
    pub fn begin(&mut self, index: usize, entries: &[DirectoryEntry]) -> Option<EditorRequest> {
        let Some(entry) = entries.get(index) else {
            tracing::debug!(target: targets::RENAME, index, "long click on missing row ignored");
            return None;
        };
        self.cancel();

        let session = RenameSession::new(entry.clone(), index);
        let request = session.editor_request();
        tracing::debug!(target: targets::RENAME, name = entry.name(), index, "rename session opened");
        self.session = Some(session);
        self.signals.session_opened.emit(request.clone());
        Some(request)
    }

    /// Find the entry under edit in a rebuilt list.
    ///
    /// The session follows its entry to the new row and `session_moved` is
    /// emitted. If the entry is no longer listed the session is cancelled.
    pub fn relocate(&mut self, entries: &[DirectoryEntry]) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let found = entries
            .iter()
            .position(|e| e.full_path() == session.target.full_path());

        match found {
            Some(row) => {
                session.target = entries[row].clone();
                if row != session.row {
                    session.row = row;
                    tracing::debug!(target: targets::RENAME, row, "rename session moved");
                    self.signals.session_moved.emit(row);
                }
            }
            None => {
                tracing::debug!(target: targets::RENAME, "entry under edit disappeared");
                self.cancel();
            }
        }
    }

    /// The editor text changed.
    pub fn edit(&mut self, text: &str) {
        if let Some(session) = self.session.as_mut() {
            session.edit_buffer = text.to_string();
        }
    }

    /// Close the session without saving.
    ///
    /// Returns `true` if a session was open.
    pub fn cancel(&mut self) -> bool {
        if self.session.take().is_none() {
            return false;
        }
        tracing::debug!(target: targets::RENAME, "rename session cancelled");
        self.signals.session_closed.emit(RenameOutcome::Cancelled);
        true
    }

    /// Finish the session, renaming the entry if the text changed.
    ///
    /// `text` replaces the edit buffer when given. Blank or unchanged text
    /// closes the session without touching the filesystem. On failure the
    /// list is left alone, `rename_failed` is emitted and the error returned.
    pub fn commit(
        &mut self,
        text: Option<&str>,
        navigator: &mut NavigationSynchronizer,
    ) -> BrowseResult<RenameOutcome> {
        let Some(mut session) = self.session.take() else {
            return Ok(RenameOutcome::Unchanged);
        };
        if let Some(text) = text {
            session.edit_buffer = text.to_string();
        }

        if session.is_unchanged() {
            tracing::debug!(target: targets::RENAME, "rename discarded");
            self.signals.session_closed.emit(RenameOutcome::Unchanged);
            return Ok(RenameOutcome::Unchanged);
        }

        let from = session.target.full_path().to_path_buf();
        let new_name = session.proposed_name();
        match operations::rename_to(navigator.file_system().as_ref(), &from, &new_name) {
            Ok(to) => {
                navigator.follow_rename(&from, &to);
                let outcome = RenameOutcome::Renamed { from, to };
                self.signals.session_closed.emit(outcome.clone());
                Ok(outcome)
            }
            Err(err) => {
                tracing::warn!(target: targets::RENAME, from = %from.display(), new_name = %new_name, %err, "rename failed");
                self.signals.rename_failed.emit(err.to_string());
                self.signals.session_closed.emit(RenameOutcome::Failed);
                Err(err)
            }
        }
    }

    /// The editor lost focus: finish the session like a commit.
    pub fn focus_lost(&mut self, navigator: &mut NavigationSynchronizer) -> BrowseResult<RenameOutcome> {
        self.commit(None, navigator)
    }
}

impl std::fmt::Debug for RenameController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenameController")
            .field("session", &self.session)
            .finish()
    }
}

static_assertions::assert_impl_all!(RenameController: Send, Sync);
