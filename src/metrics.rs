//! Derived session quantities
//!
//! Small pure helpers shared by the guard evaluator and the session
//! context: time-goal progress, reflection statistics, and display
//! rounding.

/// A reflection line only counts as a bullet when its trimmed length
/// exceeds this many characters
pub const BULLET_MIN_CHARS: usize = 10;

/// Elapsed minutes from elapsed seconds
pub fn elapsed_minutes(elapsed_seconds: f64) -> f64 {
    elapsed_seconds / 60.0
}

/// Progress toward the time goal as a percentage.
///
/// Callers must guarantee `goal_minutes > 0`; the guard validates this
/// before evaluation.
pub fn time_goal_percentage(elapsed_seconds: f64, goal_minutes: f64) -> f64 {
    elapsed_minutes(elapsed_seconds) / goal_minutes * 100.0
}

/// Count reflection bullets: lines whose trimmed length exceeds
/// [`BULLET_MIN_CHARS`]
pub fn reflection_bullets(reflection: &str) -> u32 {
    reflection
        .lines()
        .filter(|line| line.trim().chars().count() > BULLET_MIN_CHARS)
        .count() as u32
}

/// Count whitespace-delimited words in the reflection (0 for blank text)
pub fn reflection_words(reflection: &str) -> u32 {
    reflection.split_whitespace().count() as u32
}

/// Focus percentage over a session; defined as 100 when nothing has
/// elapsed yet
pub fn focus_percentage(focused_seconds: u64, elapsed_seconds: u64) -> f64 {
    if elapsed_seconds == 0 {
        return 100.0;
    }
    focused_seconds as f64 / elapsed_seconds as f64 * 100.0
}

/// Round a percentage for display (half away from zero)
pub fn display_pct(pct: f64) -> i64 {
    pct.round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_goal_percentage() {
        // 1300 seconds of a 25 minute goal -> 86.67%
        let pct = time_goal_percentage(1300.0, 25.0);
        assert!((pct - 86.666_666).abs() < 0.001);

        assert!((time_goal_percentage(1500.0, 25.0) - 100.0).abs() < f64::EPSILON);
        assert!((time_goal_percentage(0.0, 25.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reflection_bullets_counts_long_lines_only() {
        let reflection = "learned about borrow checking today\n\
                          ok\n\
                          \n\
                          practiced lifetimes with three examples\n\
                          \t  padded but still a real line here  ";
        assert_eq!(reflection_bullets(reflection), 3);

        // Exactly 10 trimmed chars does not count; 11 does
        assert_eq!(reflection_bullets("abcdefghij"), 0);
        assert_eq!(reflection_bullets("abcdefghijk"), 1);
    }

    #[test]
    fn test_reflection_words() {
        assert_eq!(reflection_words(""), 0);
        assert_eq!(reflection_words("   \n  "), 0);
        assert_eq!(reflection_words("one two  three\nfour"), 4);
    }

    #[test]
    fn test_focus_percentage_defined_at_zero_elapsed() {
        assert!((focus_percentage(0, 0) - 100.0).abs() < f64::EPSILON);
        assert!((focus_percentage(45, 60) - 75.0).abs() < f64::EPSILON);
        assert!((focus_percentage(0, 60)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_display_rounding_half_away_from_zero() {
        assert_eq!(display_pct(86.666), 87);
        assert_eq!(display_pct(86.5), 87);
        assert_eq!(display_pct(86.4), 86);
        assert_eq!(display_pct(0.0), 0);
    }
}
