//! Session guard evaluator
//!
//! A pure decision function over end-of-session metrics: may the user end
//! the session now? Rules are checked in a fixed priority order and the
//! first match wins; the order is a load-bearing contract, since the
//! rules are not mutually exclusive by construction.

use crate::error::GuardError;
use crate::metrics::{
    display_pct, reflection_bullets, reflection_words, time_goal_percentage,
};
use crate::types::{SessionMetrics, Verdict};

/// Time-goal progress required for the primary allow rule
pub const TIME_GOAL_MET_PCT: f64 = 80.0;

/// Focus percentage counted as "decent"
pub const DECENT_FOCUS_PCT: f64 = 60.0;

/// Focus percentage counted as "excellent"
pub const EXCELLENT_FOCUS_PCT: f64 = 85.0;

/// Maximum violations still counted as "low"
pub const LOW_VIOLATIONS_MAX: u32 = 3;

/// Bullets required for a good reflection
pub const MIN_REFLECTION_BULLETS: u32 = 3;

/// Words required for a good reflection
pub const MIN_REFLECTION_WORDS: u32 = 30;

/// Below this time-goal progress the shortfall is called out as an issue
const TIME_SHORTFALL_PCT: f64 = 50.0;

/// Above this many violations the distraction count is called out
const DISTRACTED_VIOLATIONS: u32 = 5;

/// Below this many words the reflection is called out as thin
const THIN_REFLECTION_WORDS: u32 = 20;

/// Below this time-goal progress the session counts as barely started
const BARELY_STARTED_PCT: f64 = 30.0;

/// Below this focus percentage attention counts as scattered
const SCATTERED_FOCUS_PCT: f64 = 40.0;

/// Evaluate an end-of-session request.
///
/// Deterministic and side-effect free: identical metrics always produce
/// an identical verdict. Metrics are validated first; a degenerate goal
/// or out-of-range focus yields an error and no partial verdict.
pub fn evaluate(metrics: &SessionMetrics) -> Result<Verdict, GuardError> {
    metrics.validate()?;

    let time_goal_pct = time_goal_percentage(metrics.elapsed_seconds, metrics.goal_minutes);
    let bullets = reflection_bullets(&metrics.reflection);
    let words = reflection_words(&metrics.reflection);
    let focus_pct = metrics.focus_percentage;

    // Evaluation criteria
    let time_goal_met = time_goal_pct >= TIME_GOAL_MET_PCT;
    let good_reflection = bullets >= MIN_REFLECTION_BULLETS && words >= MIN_REFLECTION_WORDS;
    let excellent_focus = focus_pct >= EXCELLENT_FOCUS_PCT;
    let decent_focus = focus_pct >= DECENT_FOCUS_PCT;
    let low_violations = metrics.violations <= LOW_VIOLATIONS_MAX;

    // Rule 1: time goal met with decent focus and few violations
    if time_goal_met && decent_focus && low_violations {
        return Ok(Verdict::allow(format!(
            "Excellent! You completed {}% of your time goal with {}% focus. Well done!",
            display_pct(time_goal_pct),
            display_pct(focus_pct)
        )));
    }

    // Rule 2: a substantial reflection with decent focus
    if good_reflection && decent_focus {
        return Ok(Verdict::allow(
            "Great reflection! You've clearly thought about your learning process. \
             Your detailed insights show real engagement with the material.",
        ));
    }

    // Rule 3: everything checked off with excellent focus
    if metrics.checklist_complete && excellent_focus {
        return Ok(Verdict::allow(
            "Outstanding focus and task completion! You've demonstrated excellent \
             self-discipline and productivity.",
        ));
    }

    // Rule 4: deny, with specific feedback on what's missing
    let mut issues: Vec<String> = Vec::new();

    if time_goal_pct < TIME_SHORTFALL_PCT {
        issues.push(format!(
            "only {}% of your time goal",
            display_pct(time_goal_pct)
        ));
    }
    if focus_pct < DECENT_FOCUS_PCT {
        issues.push(format!("low focus rate ({}%)", display_pct(focus_pct)));
    }
    if metrics.violations > DISTRACTED_VIOLATIONS {
        issues.push(format!(
            "too many distractions ({} violations)",
            metrics.violations
        ));
    }
    if words < THIN_REFLECTION_WORDS {
        issues.push("insufficient reflection detail".to_string());
    }

    let mut feedback = if issues.is_empty() {
        String::new()
    } else {
        format!("Not quite ready to end: {}. ", issues.join(", "))
    };

    // Exactly one refinement message + roast, first match wins
    let roast;
    if bullets < MIN_REFLECTION_BULLETS {
        feedback.push_str(
            "Please provide at least 3 detailed points about what you learned or accomplished.",
        );
        roast = "Come on, give me more than that! What did you actually learn or struggle with?";
    } else if time_goal_pct < BARELY_STARTED_PCT {
        feedback.push_str("You've barely started! Try to reach at least 50% of your time goal.");
        roast = "That was quick! Are you sure you gave it your best effort?";
    } else if focus_pct < SCATTERED_FOCUS_PCT {
        feedback.push_str("Your focus was quite scattered. What kept distracting you?");
        roast = "Looks like your attention was everywhere except your work!";
    } else {
        feedback.push_str("You're close! Just need a bit more effort or reflection.");
        roast = "Almost there! Don't give up when you're so close to the finish line.";
    }

    Ok(Verdict::deny(feedback, roast))
}

/// Evaluate a JSON guard request and return the verdict as JSON.
///
/// Malformed or missing fields produce an error; no partial verdict is
/// ever returned.
pub fn evaluate_json(request_json: &str) -> Result<String, GuardError> {
    let metrics: SessionMetrics = serde_json::from_str(request_json)
        .map_err(|e| GuardError::ParseError(format!("Failed to parse guard request: {}", e)))?;
    let verdict = evaluate(&metrics)?;
    serde_json::to_string(&verdict).map_err(GuardError::JsonError)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn metrics(
        goal_minutes: f64,
        elapsed_seconds: f64,
        violations: u32,
        focus_percentage: f64,
        reflection: &str,
        checklist_complete: bool,
    ) -> SessionMetrics {
        SessionMetrics {
            goal_minutes,
            elapsed_seconds,
            violations,
            reflection: reflection.to_string(),
            checklist_complete,
            focus_percentage,
        }
    }

    fn good_reflection() -> String {
        [
            "- worked through the whole chapter on ownership and borrowing rules",
            "- solved four practice problems without looking anything up at all",
            "- wrote detailed notes on where move semantics still confuse me today",
        ]
        .join("\n")
    }

    #[test]
    fn test_rule_1_time_goal_with_decent_focus() {
        // Scenario A: 1300s of a 25min goal -> 86.7%, 1 violation, 90% focus
        let m = metrics(25.0, 1300.0, 1, 90.0, "short", false);
        let verdict = evaluate(&m).unwrap();

        assert!(verdict.allow);
        assert_eq!(
            verdict.feedback,
            "Excellent! You completed 87% of your time goal with 90% focus. Well done!"
        );
        assert!(verdict.roast.is_empty());
    }

    #[test]
    fn test_rule_1_dominates_regardless_of_reflection() {
        // Empty reflection, incomplete checklist: rule 1 still allows
        let m = metrics(25.0, 1500.0, 0, 95.0, "", false);
        assert!(evaluate(&m).unwrap().allow);
    }

    #[test]
    fn test_rule_2_good_reflection_with_decent_focus() {
        // Time goal missed (20%), but 3 bullets / 30+ words and 70% focus
        let m = metrics(25.0, 300.0, 0, 70.0, &good_reflection(), false);
        let verdict = evaluate(&m).unwrap();

        assert!(verdict.allow);
        assert!(verdict.feedback.starts_with("Great reflection!"));
    }

    #[test]
    fn test_rule_3_checklist_with_excellent_focus() {
        // Rules 1-2 fail (short session, thin reflection); checklist + 90% focus
        let m = metrics(25.0, 300.0, 4, 90.0, "done", true);
        let verdict = evaluate(&m).unwrap();

        assert!(verdict.allow);
        assert!(verdict.feedback.starts_with("Outstanding focus"));
    }

    #[test]
    fn test_rule_3_requires_excellent_not_decent_focus() {
        let m = metrics(25.0, 300.0, 4, 84.9, "done", true);
        assert!(!evaluate(&m).unwrap().allow);
    }

    #[test]
    fn test_scenario_b_all_issues_fire() {
        // 5min of 25 -> 20%, 8 violations, 30% focus, one-word reflection
        let m = metrics(25.0, 300.0, 8, 30.0, "x", false);
        let verdict = evaluate(&m).unwrap();

        assert!(!verdict.allow);
        assert_eq!(
            verdict.feedback,
            "Not quite ready to end: only 20% of your time goal, low focus rate (30%), \
             too many distractions (8 violations), insufficient reflection detail. \
             Please provide at least 3 detailed points about what you learned or accomplished."
        );
        assert_eq!(
            verdict.roast,
            "Come on, give me more than that! What did you actually learn or struggle with?"
        );
    }

    #[test]
    fn test_scenario_c_decent_focus_boundary_sends_to_rule_4() {
        // 100% time goal but 50% focus: rule 1 fails on focus, rule 2 fails
        // on focus despite a good reflection, rule 3 fails on focus
        let m = metrics(25.0, 1500.0, 2, 50.0, &good_reflection(), false);
        let verdict = evaluate(&m).unwrap();

        assert!(!verdict.allow);
        // Good bullets and time, focus 50 is not scattered (<40): fallback branch
        assert_eq!(
            verdict.feedback,
            "Not quite ready to end: low focus rate (50%). \
             You're close! Just need a bit more effort or reflection."
        );
        assert_eq!(
            verdict.roast,
            "Almost there! Don't give up when you're so close to the finish line."
        );
    }

    #[test]
    fn test_decent_focus_boundary_exact() {
        // focus 60 satisfies decentFocus, 59 does not
        let at = metrics(25.0, 1500.0, 0, 60.0, "", false);
        assert!(evaluate(&at).unwrap().allow);

        let below = metrics(25.0, 1500.0, 0, 59.0, "", false);
        assert!(!evaluate(&below).unwrap().allow);
    }

    #[test]
    fn test_time_goal_boundary_exact() {
        // 80% of a 25min goal is exactly 1200s
        let at = metrics(25.0, 1200.0, 0, 90.0, "", false);
        assert!(evaluate(&at).unwrap().allow);

        let below = metrics(25.0, 1199.0, 0, 90.0, "", false);
        // Falls through rule 1 on time; rule 2 fails (no reflection);
        // rule 3 fails (no checklist)
        assert!(!evaluate(&below).unwrap().allow);
    }

    #[test]
    fn test_barely_started_refinement() {
        // Bullets fine, 20% time goal -> "barely started" branch
        let m = metrics(25.0, 300.0, 0, 55.0, &good_reflection(), false);
        let verdict = evaluate(&m).unwrap();

        assert!(!verdict.allow);
        assert!(verdict
            .feedback
            .ends_with("You've barely started! Try to reach at least 50% of your time goal."));
        assert_eq!(
            verdict.roast,
            "That was quick! Are you sure you gave it your best effort?"
        );
    }

    #[test]
    fn test_scattered_focus_refinement() {
        // Bullets fine, time goal fine (60% >= 30), focus 35 -> scattered branch
        let m = metrics(25.0, 900.0, 0, 35.0, &good_reflection(), false);
        let verdict = evaluate(&m).unwrap();

        assert!(!verdict.allow);
        assert!(verdict
            .feedback
            .ends_with("Your focus was quite scattered. What kept distracting you?"));
        assert_eq!(
            verdict.roast,
            "Looks like your attention was everywhere except your work!"
        );
    }

    #[test]
    fn test_no_issues_prefix_when_none_trigger() {
        // Denied by 4 violations (rule 1), a single-line reflection (rule 2),
        // and no checklist (rule 3), yet clear of every issue threshold:
        // 100% time goal, 70% focus, 4 <= 5 violations, 25+ words.
        let reflection = "a long single line reflection with plenty of words to stay above \
                          the twenty word issue threshold for sure, definitely enough here \
                          to count twenty distinct words overall";
        let m = metrics(25.0, 1500.0, 4, 70.0, reflection, false);
        let verdict = evaluate(&m).unwrap();

        assert!(!verdict.allow);
        // No "Not quite ready" prefix; single-bullet refinement only
        assert_eq!(
            verdict.feedback,
            "Please provide at least 3 detailed points about what you learned or accomplished."
        );
    }

    #[test]
    fn test_idempotent() {
        let m = metrics(25.0, 300.0, 8, 30.0, "x", false);
        let first = evaluate(&m).unwrap();
        let second = evaluate(&m).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_degenerate_goal_rejected() {
        let m = metrics(0.0, 300.0, 0, 80.0, "", false);
        assert!(matches!(evaluate(&m), Err(GuardError::InvalidGoal(_))));
    }

    #[test]
    fn test_evaluate_json_round_trip() {
        let request = r#"{
            "goalMinutes": 25,
            "elapsedSeconds": 1300,
            "violations": 1,
            "reflection": "short",
            "checklistComplete": false,
            "focusPercentage": 90
        }"#;

        let response = evaluate_json(request).unwrap();
        let verdict: serde_json::Value = serde_json::from_str(&response).unwrap();
        assert_eq!(verdict["allow"], true);
        assert_eq!(verdict["roast"], "");
    }

    #[test]
    fn test_evaluate_json_rejects_malformed_input() {
        assert!(evaluate_json("not valid json").is_err());
        assert!(evaluate_json(r#"{"goalMinutes": 25}"#).is_err());
    }
}
