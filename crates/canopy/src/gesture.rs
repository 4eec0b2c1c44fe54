//! Press-and-hold detection on the entry list.
//!
//! [`PressHoldDetector`] turns a pointer press held for the hold duration
//! into a `long_clicked(index)` event. It runs on a [`TimerQueue`] owned by
//! the caller: a press starts a one-shot timer, and whoever drains the queue
//! hands the expired [`TimerId`]s back through
//! [`PressHoldDetector::on_timer`].
//!
//! # States
//!
//! ```text
//! Idle --pointer_down(i)--> Pressed --timer--> Fired --> Idle
//!                              |
//!                              +--pointer_up / pointer_left--> Idle
//! ```
//!
//! Leaving `Pressed` for any reason other than the timer stops the timer.
//! A timer ID that no longer matches the pending press is ignored, so a
//! stopped or superseded timer can never fire late.

use std::time::{Duration, Instant};

use canopy_core::logging::targets;
use canopy_core::{Signal, TimerId, TimerQueue};

/// Default hold duration before a press becomes a long click.
pub const DEFAULT_LONG_PRESS_MS: u64 = 1000;

/// Phase of the press-hold state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GesturePhase {
    /// No press is being tracked.
    #[default]
    Idle,
    /// A press is held and the timer is running.
    Pressed,
    /// The hold elapsed; observed only while `long_clicked` is being emitted.
    Fired,
}

/// Snapshot of the detector state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GestureState {
    /// Current phase.
    pub phase: GesturePhase,
    /// When the current press started.
    pub armed_at: Option<Instant>,
    /// The list row under the press.
    pub target_index: Option<usize>,
}

/// Detects a pointer press held for a fixed duration.
pub struct PressHoldDetector {
    hold: Duration,
    state: GestureState,
    pending: Option<TimerId>,
    /// Emitted with the pressed row once the hold duration elapses.
    pub long_clicked: Signal<usize>,
}

impl Default for PressHoldDetector {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_LONG_PRESS_MS))
    }
}

impl PressHoldDetector {
    /// Creates a detector with the given hold duration.
    pub fn new(hold: Duration) -> Self {
        Self {
            hold,
            state: GestureState::default(),
            pending: None,
            long_clicked: Signal::new(),
        }
    }

    /// The hold duration.
    pub fn hold_duration(&self) -> Duration {
        self.hold
    }

    /// Change the hold duration. Takes effect from the next press.
    pub fn set_hold_duration(&mut self, hold: Duration) {
        self.hold = hold;
    }

    /// The current state.
    pub fn state(&self) -> GestureState {
        self.state
    }

    /// The current phase.
    pub fn phase(&self) -> GesturePhase {
        self.state.phase
    }

    /// Whether a press is being held.
    pub fn is_pressed(&self) -> bool {
        self.state.phase == GesturePhase::Pressed
    }

    /// A press landed on row `index`.
    ///
    /// A press while another is held replaces the target and restarts the
    /// hold.
    pub fn pointer_down(&mut self, index: usize, timers: &mut TimerQueue) {
        self.cancel_timer(timers);

        let timer = timers.start_one_shot(self.hold);
        self.pending = Some(timer);
        self.state = GestureState {
            phase: GesturePhase::Pressed,
            armed_at: Some(timers.now()),
            target_index: Some(index),
        };
        tracing::trace!(target: targets::GESTURE, index, ?timer, "press armed");
    }

    /// The pointer was released.
    pub fn pointer_up(&mut self, timers: &mut TimerQueue) {
        if self.is_pressed() {
            tracing::trace!(target: targets::GESTURE, index = ?self.state.target_index, "press released before hold");
        }
        self.reset(timers);
    }

    /// The pointer left the tracked surface.
    pub fn pointer_left(&mut self, timers: &mut TimerQueue) {
        if self.is_pressed() {
            tracing::trace!(target: targets::GESTURE, "pointer left surface");
        }
        self.reset(timers);
    }

    /// Return to `Idle`, stopping any pending timer.
    pub fn reset(&mut self, timers: &mut TimerQueue) {
        self.cancel_timer(timers);
        self.state = GestureState::default();
    }

    /// Route an expired timer to the detector.
    ///
    /// Returns the long-clicked row if `id` is the pending hold timer;
    /// `long_clicked` has been emitted by the time this returns.
    pub fn on_timer(&mut self, id: TimerId) -> Option<usize> {
        if self.pending != Some(id) || !self.is_pressed() {
            return None;
        }
        self.pending = None;

        let index = self.state.target_index?;
        self.state.phase = GesturePhase::Fired;
        tracing::debug!(target: targets::GESTURE, index, "long click");
        self.long_clicked.emit(index);

        self.state = GestureState::default();
        Some(index)
    }

    fn cancel_timer(&mut self, timers: &mut TimerQueue) {
        if let Some(id) = self.pending.take() {
            // A timer that already expired is gone from the queue.
            let _ = timers.stop(id);
        }
    }
}

impl std::fmt::Debug for PressHoldDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PressHoldDetector")
            .field("hold", &self.hold)
            .field("state", &self.state)
            .field("pending", &self.pending)
            .finish()
    }
}

static_assertions::assert_impl_all!(PressHoldDetector: Send, Sync);
