//! Session context
//!
//! An explicit context object owning all per-session mutable state: the
//! plan, the one-second clock, the current host signals, the violation
//! tracker, and the roast dispenser. Created at session start, passed by
//! handle to every handler, consumed when the session ends — replacing
//! the ambient component state of the original UI.
//!
//! All handlers run to completion on a single thread; the host delivers
//! timer ticks and focus events serially.

use crate::error::GuardError;
use crate::guard;
use crate::metrics;
use crate::roast::RoastDispenser;
use crate::tracker::ViolationTracker;
use crate::types::{FocusSignal, SessionMetrics, SessionPlan, SessionReport, Verdict};
use chrono::{DateTime, Utc};
use rand::Rng;
use uuid::Uuid;

/// Active session state.
///
/// Lifecycle: [`SessionContext::start`] -> any number of `tick` /
/// `handle_*` calls -> [`SessionContext::request_end`] ->
/// [`SessionContext::finish`] (or drop, when the user abandons a denied
/// session).
#[derive(Debug, Clone)]
pub struct SessionContext {
    session_id: String,
    plan: SessionPlan,
    started_at: DateTime<Utc>,
    elapsed_seconds: u64,
    focused_seconds: u64,
    visible: bool,
    fullscreen: bool,
    /// False when the host refused the fullscreen request; the session
    /// then proceeds without fullscreen enforcement (non-fatal).
    fullscreen_enforced: bool,
    tracker: ViolationTracker,
    roaster: RoastDispenser,
    roasts: Vec<String>,
}

impl SessionContext {
    /// Start a session. Counters are zeroed and the session begins
    /// focused (visible, fullscreen).
    pub fn start(plan: SessionPlan, fullscreen_enforced: bool, now: DateTime<Utc>) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            plan,
            started_at: now,
            elapsed_seconds: 0,
            focused_seconds: 0,
            visible: true,
            fullscreen: true,
            fullscreen_enforced,
            tracker: ViolationTracker::new(),
            roaster: RoastDispenser::new(),
            roasts: Vec::new(),
        }
    }

    /// Unique session identifier
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// The declared plan
    pub fn plan(&self) -> &SessionPlan {
        &self.plan
    }

    /// Wall-clock seconds accumulated so far
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    /// Seconds accumulated while focused
    pub fn focused_seconds(&self) -> u64 {
        self.focused_seconds
    }

    /// Violations recorded so far
    pub fn violations(&self) -> u32 {
        self.tracker.violation_count()
    }

    /// The signal the tracker sees: an unenforced fullscreen requirement
    /// is treated as satisfied.
    fn effective_signal(&self) -> FocusSignal {
        FocusSignal {
            visible: self.visible,
            fullscreen: self.fullscreen || !self.fullscreen_enforced,
        }
    }

    /// Whether the session currently counts as focused
    pub fn is_focused(&self) -> bool {
        self.effective_signal().is_focused()
    }

    /// One-second clock callback: accumulate elapsed time, and focused
    /// time while focused. Invoked serially, never concurrently.
    pub fn tick(&mut self) {
        self.elapsed_seconds += 1;
        if self.is_focused() {
            self.focused_seconds += 1;
        }
    }

    /// Host visibilitychange handler. Returns a roast line when the
    /// dispenser fires.
    pub fn handle_visibility<R: Rng>(
        &mut self,
        visible: bool,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Option<&'static str> {
        self.visible = visible;
        self.apply_signal(now, rng)
    }

    /// Host fullscreenchange handler. Returns a roast line when the
    /// dispenser fires.
    pub fn handle_fullscreen<R: Rng>(
        &mut self,
        fullscreen: bool,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Option<&'static str> {
        self.fullscreen = fullscreen;
        self.apply_signal(now, rng)
    }

    fn apply_signal<R: Rng>(&mut self, now: DateTime<Utc>, rng: &mut R) -> Option<&'static str> {
        let signal = self.effective_signal();
        self.tracker.observe(signal, now);

        // Roasts stay quiet until the clock has actually ticked
        let armed = self.elapsed_seconds > 0;
        let roast = self.roaster.observe(signal, armed, now, rng);
        if let Some(line) = roast {
            self.roasts.push(line.to_string());
        }
        roast
    }

    /// Mark a checklist item done or not done; returns false when no
    /// item has the given id.
    pub fn set_checklist_item(&mut self, id: &str, completed: bool) -> bool {
        match self.plan.checklist.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.completed = completed;
                true
            }
            None => false,
        }
    }

    /// Whether every pre-declared checklist item is done (vacuously true
    /// for an empty checklist)
    pub fn checklist_complete(&self) -> bool {
        self.plan.checklist.iter().all(|item| item.completed)
    }

    /// Focus percentage so far; 100 before the first tick
    pub fn focus_percentage(&self) -> f64 {
        metrics::focus_percentage(self.focused_seconds, self.elapsed_seconds)
    }

    /// Assemble the guard request for the current state
    pub fn metrics(&self, reflection: &str) -> SessionMetrics {
        SessionMetrics {
            goal_minutes: self.plan.goal_minutes,
            elapsed_seconds: self.elapsed_seconds as f64,
            violations: self.tracker.violation_count(),
            reflection: reflection.to_string(),
            checklist_complete: self.checklist_complete(),
            focus_percentage: self.focus_percentage(),
        }
    }

    /// Ask the guard whether the session may end now
    pub fn request_end(&self, reflection: &str) -> Result<Verdict, GuardError> {
        guard::evaluate(&self.metrics(reflection))
    }

    /// Tear the session down, producing a report. Consumes the context;
    /// tracker and dispenser state are destroyed whether the verdict
    /// allowed the end or the user abandoned a denial.
    pub fn finish(self, verdict: Verdict, now: DateTime<Utc>) -> SessionReport {
        SessionReport {
            session_id: self.session_id,
            goal: self.plan.goal,
            goal_minutes: self.plan.goal_minutes,
            started_at: self.started_at,
            ended_at: now,
            elapsed_seconds: self.elapsed_seconds,
            focused_seconds: self.focused_seconds,
            focus_percentage: metrics::focus_percentage(
                self.focused_seconds,
                self.elapsed_seconds,
            ),
            violations: self.tracker.violation_count(),
            roasts: self.roasts,
            verdict,
        }
    }
}
