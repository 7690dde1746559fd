//! Focus violation tracking
//!
//! Observes visibility/fullscreen transitions during an active session
//! and records a violation on each loss of focus, with a debounce window
//! suppressing duplicate counts from rapid flicker. Both host triggers
//! (visibilitychange, fullscreenchange) feed the same entry point, so two
//! raw events inside one window never double-count.

use crate::types::FocusSignal;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Minimum interval between two counted violations (milliseconds)
pub const VIOLATION_DEBOUNCE_MS: i64 = 5_000;

/// Focus state of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusState {
    /// Visible AND fullscreen
    Focused,
    /// Not visible OR not fullscreen
    Unfocused,
}

impl From<FocusSignal> for FocusState {
    fn from(signal: FocusSignal) -> Self {
        if signal.is_focused() {
            FocusState::Focused
        } else {
            FocusState::Unfocused
        }
    }
}

/// Per-session violation state.
///
/// Owned exclusively by the active session: reset at session start,
/// mutated only through [`ViolationTracker::observe`], read by the guard
/// at end-of-session time, and discarded with the session.
#[derive(Debug, Clone)]
pub struct ViolationTracker {
    state: FocusState,
    violation_count: u32,
    last_violation_at: Option<DateTime<Utc>>,
}

impl Default for ViolationTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ViolationTracker {
    /// Fresh tracker: focused, zero violations, no prior violation
    pub fn new() -> Self {
        Self {
            state: FocusState::Focused,
            violation_count: 0,
            last_violation_at: None,
        }
    }

    /// Feed one raw visibility/fullscreen event into the tracker.
    ///
    /// Only the Focused -> Unfocused transition can record a violation,
    /// and only when more than [`VIOLATION_DEBOUNCE_MS`] has passed since
    /// the last one (the first always counts). Regaining focus and
    /// same-state observations have no counter effect.
    pub fn observe(&mut self, signal: FocusSignal, now: DateTime<Utc>) {
        let next = FocusState::from(signal);

        if self.state == FocusState::Focused && next == FocusState::Unfocused {
            let debounced = self
                .last_violation_at
                .map_or(true, |last| now - last > Duration::milliseconds(VIOLATION_DEBOUNCE_MS));
            if debounced {
                self.violation_count += 1;
                self.last_violation_at = Some(now);
            }
        }

        self.state = next;
    }

    /// Current focus state
    pub fn state(&self) -> FocusState {
        self.state
    }

    /// Violations recorded so far (monotonically non-decreasing)
    pub fn violation_count(&self) -> u32 {
        self.violation_count
    }

    /// When the last counted violation happened, if any
    pub fn last_violation_at(&self) -> Option<DateTime<Utc>> {
        self.last_violation_at
    }
}
