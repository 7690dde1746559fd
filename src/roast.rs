//! Roast message emission
//!
//! A companion concern to violation tracking: on the same loss-of-focus
//! transition, pick a canned admonishment to show the user. Runs on its
//! own debounce clock (10s, vs. 5s for violation accounting) so chat spam
//! suppression never distorts the violation count, and vice versa.

use crate::tracker::FocusState;
use crate::types::FocusSignal;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;

/// Minimum interval between two emitted roasts (milliseconds)
pub const ROAST_DEBOUNCE_MS: i64 = 10_000;

/// The fixed set of focus-loss roast lines
pub const ROAST_LINES: [&str; 6] = [
    "Hey! Eyes back on the screen. That notification can wait! 👀",
    "Focus slipping? Remember why you started this session!",
    "Distraction detected! Your future self will thank you for staying focused.",
    "Come on, you've got this! Don't let that tab switch break your flow.",
    "Focus mode activated... or was it? Get back in there!",
    "That was a quick break! Ready to dive back into deep work?",
];

/// Debounced roast dispenser.
///
/// Tracks focus transitions independently of the violation tracker. The
/// random source is injected per call so callers (and tests) control
/// selection determinism.
#[derive(Debug, Clone)]
pub struct RoastDispenser {
    state: FocusState,
    last_roast_at: Option<DateTime<Utc>>,
}

impl Default for RoastDispenser {
    fn default() -> Self {
        Self::new()
    }
}

impl RoastDispenser {
    /// Fresh dispenser: focused, never roasted
    pub fn new() -> Self {
        Self {
            state: FocusState::Focused,
            last_roast_at: None,
        }
    }

    /// Feed one raw focus event; returns a roast line when one fires.
    ///
    /// A roast fires on a Focused -> Unfocused transition while `armed`,
    /// at most once per [`ROAST_DEBOUNCE_MS`]. The session passes
    /// `armed = false` until its clock has ticked, so a session that
    /// never really started stays quiet. State tracking continues either
    /// way, so arming later never misreads an old transition.
    pub fn observe<R: Rng>(
        &mut self,
        signal: FocusSignal,
        armed: bool,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Option<&'static str> {
        let next = FocusState::from(signal);
        let lost_focus = self.state == FocusState::Focused && next == FocusState::Unfocused;
        self.state = next;

        if !lost_focus || !armed {
            return None;
        }

        let debounced = self
            .last_roast_at
            .map_or(true, |last| now - last > Duration::milliseconds(ROAST_DEBOUNCE_MS));
        if !debounced {
            return None;
        }

        self.last_roast_at = Some(now);
        Some(ROAST_LINES[rng.gen_range(0..ROAST_LINES.len())])
    }

    /// When the last roast was emitted, if any
    pub fn last_roast_at(&self) -> Option<DateTime<Utc>> {
        self.last_roast_at
    }
}
