//! Lock-In Core - Deterministic engine for accountable focus sessions
//!
//! Lock-In turns raw session signals into an end-of-session verdict through
//! a deterministic pipeline: focus events → violation tracking → derived
//! metrics → rule-based guard evaluation.
//!
//! ## Modules
//!
//! - **Guard**: Rule-based evaluator deciding whether a session may end
//! - **Session**: Context object owning the clock, signals, and trackers
//! - **Tracker / Roast**: Debounced violation counting and admonishments
//! - **Buddy**: Scripted in-session study companion

pub mod buddy;
pub mod error;
pub mod guard;
pub mod metrics;
pub mod roast;
pub mod session;
pub mod tracker;
pub mod types;

pub use error::GuardError;
pub use guard::{evaluate, evaluate_json};
pub use session::SessionContext;
pub use tracker::ViolationTracker;
pub use types::{SessionMetrics, SessionPlan, SessionReport, Verdict};

/// Engine version embedded in reports and diagnostics
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports and diagnostics
pub const PRODUCER_NAME: &str = "lockin-core";
