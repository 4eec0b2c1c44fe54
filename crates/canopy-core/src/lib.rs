//! Core plumbing for Canopy.
//!
//! This crate provides the event primitives the browsing engine is built on.
//! It knows nothing about files or directories:
//!
//! - **Signals**: typed observer channels with synchronous, in-order delivery
//! - **Timers**: one-shot and repeating timers driven by an injectable clock
//! - **Logging**: tracing targets and a performance span guard
//!
//! # Signal Example
//!
//! ```
//! use canopy_core::Signal;
//!
//! let path_changed = Signal::<String>::new();
//!
//! let id = path_changed.connect(|path| {
//!     println!("now showing {path}");
//! });
//!
//! path_changed.emit("/home".to_string());
//! path_changed.disconnect(id);
//! ```
//!
//! # Timer Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use canopy_core::{ManualClock, TimerQueue};
//!
//! let clock = Arc::new(ManualClock::new());
//! let mut timers = TimerQueue::new(clock.clone());
//!
//! let id = timers.start_one_shot(Duration::from_millis(1000));
//! assert!(timers.process_expired().is_empty());
//!
//! clock.advance(Duration::from_millis(1000));
//! assert_eq!(timers.process_expired(), vec![id]);
//! ```

mod error;
pub mod logging;
pub mod signal;
pub mod timer;

pub use error::{CoreError, Result};
pub use logging::{PerfSpan, init_tracing};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use timer::{Clock, ManualClock, SystemClock, TimerId, TimerKind, TimerQueue};
