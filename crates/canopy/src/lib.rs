//! Canopy - the engine behind a two-pane file browser.
//!
//! Canopy keeps a directory tree and an entry list in step, detects
//! press-and-hold gestures on list rows, and runs an in-place rename
//! workflow on top of them. It draws nothing: a presentation layer feeds it
//! input and listens to its signals.
//!
//! # Components
//!
//! - [`EntryRepository`]: lists a directory in display order
//! - [`NonEmptyDirectoryFilter`]: decides which tree nodes are expandable
//! - [`PressHoldDetector`]: turns a held press into a long click
//! - [`RenameController`]: edits an entry's base name in place
//! - [`NavigationSynchronizer`]: owns the current path and the displayed list
//! - [`BrowserSession`]: owns one of each and routes input to them
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//! use canopy::{BrowserConfig, BrowserInput, BrowserSession};
//!
//! let config = BrowserConfig::default().start_path("/srv/share");
//! let mut session = BrowserSession::new(config)?;
//!
//! session.rename().signals().rename_failed.connect(|reason| {
//!     eprintln!("rename failed: {reason}");
//! });
//!
//! session.dispatch(BrowserInput::TreeNodeActivated(PathBuf::from("/srv/share/photos")))?;
//! # Ok::<(), canopy::BrowseError>(())
//! ```

pub mod config;
pub mod entry;
pub mod error;
pub mod fs;
pub mod gesture;
pub mod navigation;
pub mod operations;
pub mod rename;
pub mod repository;
pub mod session;
pub mod tree;
pub mod viewer;
pub mod watcher;

pub use config::{BrowserConfig, ConfigFormat, SessionSnapshot};
pub use entry::{DirectoryEntry, EntryFilter, EntryList};
pub use error::{BrowseError, BrowseResult, ConfigError, ConfigResult};
pub use fs::{FileSystem, LocalFileSystem, RawEntry};
pub use gesture::{GesturePhase, GestureState, PressHoldDetector};
pub use navigation::{Activation, NavigationSignals, NavigationState, NavigationSynchronizer};
pub use rename::{EditorRequest, RenameController, RenameOutcome, RenameSession, RenameSignals};
pub use repository::{EntryProvider, EntryRepository, ProviderSignals};
pub use session::{BrowserInput, BrowserSession};
pub use tree::{DirectoryTree, NonEmptyDirectoryFilter, TreeNode};
pub use viewer::{FileClassifier, FileKind};
pub use watcher::{DirectoryWatcher, WatchEvent, WatchEventKind};

pub use canopy_core::{Clock, ManualClock, Signal, SystemClock, TimerId, TimerQueue};
