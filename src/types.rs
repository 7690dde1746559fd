//! Core types for the Lock-In session engine
//!
//! This module defines the data structures that flow through a session:
//! the plan declared at setup, the host focus signals observed while the
//! session runs, and the metrics/verdict pair exchanged with the guard
//! evaluator at end-of-session time.

use crate::error::GuardError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single pre-declared checklist item for a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    /// Item identifier, unique within the session
    pub id: String,
    /// Item text as entered by the user
    pub text: String,
    /// Whether the user has marked this item done
    #[serde(default)]
    pub completed: bool,
}

/// Session plan declared at setup time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionPlan {
    /// Free-form session goal
    pub goal: String,
    /// Target duration in minutes
    pub goal_minutes: f64,
    /// Pre-declared checklist items
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
}

impl SessionPlan {
    /// Convenience constructor for a plan without a checklist
    pub fn new(goal: impl Into<String>, goal_minutes: f64) -> Self {
        Self {
            goal: goal.into(),
            goal_minutes,
            checklist: Vec::new(),
        }
    }
}

/// The two host booleans that determine focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusSignal {
    /// Document is visible (tab in foreground)
    pub visible: bool,
    /// Document is in fullscreen
    pub fullscreen: bool,
}

impl FocusSignal {
    /// A session is focused only while visible AND fullscreen
    pub fn is_focused(&self) -> bool {
        self.visible && self.fullscreen
    }
}

/// Which host notification a focus event came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusEventKind {
    /// visibilitychange notification; `value` is "document is visible"
    Visibility,
    /// fullscreenchange notification; `value` is "document is fullscreen"
    Fullscreen,
}

/// A focus change notification, as delivered by the host environment.
///
/// Replay input is a stream of these (NDJSON, one per line).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusEvent {
    /// When the host delivered the notification
    pub timestamp: DateTime<Utc>,
    /// Which signal changed
    pub kind: FocusEventKind,
    /// New value of the signal
    pub value: bool,
}

/// Session metrics submitted to the guard evaluator.
///
/// Field names follow the original guard request wire shape (camelCase).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetrics {
    /// User-declared target duration in minutes
    pub goal_minutes: f64,
    /// Wall-clock seconds since session start
    pub elapsed_seconds: f64,
    /// Count of debounced focus-loss events
    pub violations: u32,
    /// Free-form end-of-session writeup
    pub reflection: String,
    /// Whether all pre-declared checklist items are marked done
    pub checklist_complete: bool,
    /// focused_seconds / elapsed_seconds * 100; 100 when nothing has elapsed
    pub focus_percentage: f64,
}

impl SessionMetrics {
    /// Validate metrics before evaluation.
    ///
    /// A degenerate goal (zero, negative, or non-finite minutes) is
    /// rejected here rather than producing an undefined time-goal
    /// percentage downstream.
    pub fn validate(&self) -> Result<(), GuardError> {
        if !self.goal_minutes.is_finite() || self.goal_minutes <= 0.0 {
            return Err(GuardError::InvalidGoal(self.goal_minutes));
        }
        if !self.elapsed_seconds.is_finite() || self.elapsed_seconds < 0.0 {
            return Err(GuardError::InvalidMetrics(format!(
                "elapsed_seconds must be non-negative, got {}",
                self.elapsed_seconds
            )));
        }
        if !self.focus_percentage.is_finite()
            || !(0.0..=100.0).contains(&self.focus_percentage)
        {
            return Err(GuardError::InvalidMetrics(format!(
                "focus_percentage must be within 0-100, got {}",
                self.focus_percentage
            )));
        }
        Ok(())
    }
}

/// Guard verdict on an end-of-session request.
///
/// Produced fresh per evaluation; `roast` is empty when the end is allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    /// Whether the user may end the session
    pub allow: bool,
    /// Feedback shown to the user
    pub feedback: String,
    /// Admonishing one-liner accompanying a denial
    pub roast: String,
}

impl Verdict {
    /// An allowing verdict (no roast)
    pub fn allow(feedback: impl Into<String>) -> Self {
        Self {
            allow: true,
            feedback: feedback.into(),
            roast: String::new(),
        }
    }

    /// A denying verdict with feedback and roast
    pub fn deny(feedback: impl Into<String>, roast: impl Into<String>) -> Self {
        Self {
            allow: false,
            feedback: feedback.into(),
            roast: roast.into(),
        }
    }
}

/// End-of-session summary produced when a session context is torn down
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    /// Unique session identifier
    pub session_id: String,
    /// Session goal text
    pub goal: String,
    /// Target duration in minutes
    pub goal_minutes: f64,
    /// Session start time
    pub started_at: DateTime<Utc>,
    /// Session end time
    pub ended_at: DateTime<Utc>,
    /// Total elapsed seconds
    pub elapsed_seconds: u64,
    /// Seconds spent focused (visible AND fullscreen)
    pub focused_seconds: u64,
    /// Focus percentage over the whole session
    pub focus_percentage: f64,
    /// Debounced focus violations recorded
    pub violations: u32,
    /// Roast lines emitted during the session, in order
    pub roasts: Vec<String>,
    /// Final guard verdict
    pub verdict: Verdict,
}
