//! Change notification for the directory on display.
//!
//! [`DirectoryWatcher`] watches exactly one directory, non-recursively, and
//! is re-targeted whenever the view moves. Events are debounced by the
//! platform watcher thread and collected with [`DirectoryWatcher::poll`] from
//! the event loop, so nothing here runs concurrently with the browsing
//! state.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Duration;

use canopy_core::logging::targets;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use notify_debouncer_mini::{DebouncedEvent, DebouncedEventKind, Debouncer, new_debouncer};

use crate::error::{BrowseError, BrowseResult};

/// What happened to a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatchEventKind {
    /// The path exists and was created or modified.
    Changed,
    /// The path no longer exists.
    Removed,
}

/// A debounced filesystem change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    /// The changed path.
    pub path: PathBuf,
    /// The type of change.
    pub kind: WatchEventKind,
}

struct Watched {
    requested: PathBuf,
    canonical: PathBuf,
}

/// Watches the directory on display.
pub struct DirectoryWatcher {
    debouncer: Debouncer<RecommendedWatcher>,
    rx: Receiver<Result<Vec<DebouncedEvent>, notify::Error>>,
    watched: Option<Watched>,
}

impl DirectoryWatcher {
    /// Creates a watcher that coalesces events within `debounce`.
    pub fn new(debounce: Duration) -> BrowseResult<Self> {
        let (tx, rx) = mpsc::channel();
        let debouncer = new_debouncer(debounce, tx).map_err(|e| BrowseError::Io {
            path: PathBuf::new(),
            source: io::Error::other(e.to_string()),
        })?;
        Ok(Self {
            debouncer,
            rx,
            watched: None,
        })
    }

    /// The watched directory, as it was requested.
    pub fn watched(&self) -> Option<&Path> {
        self.watched.as_ref().map(|w| w.requested.as_path())
    }

    /// Watch `dir` instead of whatever was watched before.
    #[tracing::instrument(skip(self), target = "canopy::watcher", level = "debug")]
    pub fn watch_directory(&mut self, dir: &Path) -> BrowseResult<()> {
        if self.watched() == Some(dir) {
            return Ok(());
        }
        self.unwatch();

        let canonical = dir
            .canonicalize()
            .map_err(|e| BrowseError::from_io(e, dir))?;
        self.debouncer
            .watcher()
            .watch(&canonical, RecursiveMode::NonRecursive)
            .map_err(|e| BrowseError::Io {
                path: dir.to_path_buf(),
                source: io::Error::other(e.to_string()),
            })?;

        self.watched = Some(Watched {
            requested: dir.to_path_buf(),
            canonical,
        });
        Ok(())
    }

    /// Stop watching.
    pub fn unwatch(&mut self) {
        if let Some(watched) = self.watched.take() {
            // The directory may already be gone.
            let _ = self.debouncer.watcher().unwatch(&watched.canonical);
        }
    }

    /// Collect the events received since the last poll, one per path.
    pub fn poll(&mut self) -> Vec<WatchEvent> {
        let mut events: Vec<WatchEvent> = Vec::new();

        loop {
            match self.rx.try_recv() {
                Ok(Ok(batch)) => {
                    events.extend(batch.iter().filter_map(convert_event));
                }
                Ok(Err(err)) => {
                    tracing::warn!(target: targets::WATCHER, %err, "watcher error");
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    tracing::error!(target: targets::WATCHER, "watcher disconnected");
                    break;
                }
            }
        }

        // Keep the last event for each path.
        let mut deduped: Vec<WatchEvent> = Vec::with_capacity(events.len());
        for event in events.into_iter().rev() {
            if !deduped.iter().any(|e| e.path == event.path) {
                deduped.push(event);
            }
        }
        deduped.reverse();
        deduped
    }

    /// Whether `event` concerns the watched directory or one of its children.
    pub fn affects_watched(&self, event: &WatchEvent) -> bool {
        let Some(watched) = self.watched.as_ref() else {
            return false;
        };
        event.path == watched.canonical || event.path.parent() == Some(watched.canonical.as_path())
    }
}

fn convert_event(event: &DebouncedEvent) -> Option<WatchEvent> {
    if event.kind != DebouncedEventKind::Any {
        return None;
    }
    let kind = if event.path.exists() {
        WatchEventKind::Changed
    } else {
        WatchEventKind::Removed
    };
    tracing::trace!(target: targets::WATCHER, path = %event.path.display(), ?kind, "change");
    Some(WatchEvent {
        path: event.path.clone(),
        kind,
    })
}

impl std::fmt::Debug for DirectoryWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryWatcher")
            .field("watched", &self.watched())
            .finish()
    }
}
