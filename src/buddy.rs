//! Scripted study buddy
//!
//! Deterministic keyword-matched responses to in-session questions.
//! Matching is case-insensitive substring search in a fixed branch order;
//! the first matching branch wins, so a question mentioning both focus
//! and motivation gets the focus answer.

/// Session snapshot the responder conditions on
#[derive(Debug, Clone, Copy)]
pub struct BuddyContext {
    /// Whole minutes elapsed in the current session
    pub session_minutes: u64,
    /// Focus percentage so far
    pub focus_rate: f64,
}

/// Answer a study-buddy question.
pub fn respond(question: &str, ctx: &BuddyContext) -> String {
    let q = question.to_lowercase();

    if q.contains("focus") || q.contains("concentrate") || q.contains("distracted") {
        if ctx.focus_rate < 70.0 {
            return "I notice your focus rate is lower today. Try the 2-minute rule: \
                    commit to just 2 minutes of focused work. Often, starting is the \
                    hardest part, and you'll naturally continue beyond 2 minutes."
                .to_string();
        }
        return "Great focus so far! To maintain it, try the 20-20-20 rule: every 20 \
                minutes, look at something 20 feet away for 20 seconds. This prevents \
                eye strain and mental fatigue."
            .to_string();
    }

    if q.contains("motivation") || q.contains("tired") || q.contains("energy") || q.contains("lazy")
    {
        return format!(
            "You've been working for {} minutes - that's already progress! Try a \
             30-second desk stretch or take 3 deep breaths. Small energy boosts can \
             make a big difference.",
            ctx.session_minutes
        );
    }

    if q.contains("study") || q.contains("learn") || q.contains("remember") || q.contains("memorize")
    {
        return "Try active recall: close your materials and write down everything you \
                remember, then check what you missed. This is more effective than \
                re-reading. What subject are you working on?"
            .to_string();
    }

    if q.contains("time") || q.contains("schedule") || q.contains("plan") {
        return "Time-blocking works well: assign specific time slots to specific \
                tasks. You're already doing great by using focused sessions! Consider \
                planning your next session's goals now."
            .to_string();
    }

    if q.contains("stress") || q.contains("anxious") || q.contains("overwhelmed")
        || q.contains("pressure")
    {
        return "Feeling overwhelmed is normal. Break your work into smaller, specific \
                tasks. Instead of 'study math,' try 'complete 5 algebra problems.' \
                Small wins build momentum and reduce stress."
            .to_string();
    }

    if ctx.focus_rate >= 80.0 {
        return "You're doing excellent work! Your focus rate is strong. Keep up this \
                momentum and remember to take breaks when needed."
            .to_string();
    }
    if ctx.focus_rate >= 60.0 {
        return "Good progress! If you're getting distracted, try the Pomodoro \
                technique: 25 minutes focused work, 5 minute break. What's your \
                biggest distraction right now?"
            .to_string();
    }

    "I'm here to help with your study session! I can assist with focus techniques, \
     motivation, study strategies, or just provide encouragement. What would be most \
     helpful right now?"
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(session_minutes: u64, focus_rate: f64) -> BuddyContext {
        BuddyContext {
            session_minutes,
            focus_rate,
        }
    }

    #[test]
    fn test_focus_branch_depends_on_focus_rate() {
        let low = respond("I keep getting distracted", &ctx(10, 50.0));
        assert!(low.contains("2-minute rule"));

        let high = respond("how do I stay focused?", &ctx(10, 90.0));
        assert!(high.contains("20-20-20 rule"));
    }

    #[test]
    fn test_motivation_branch_cites_session_minutes() {
        let reply = respond("I'm so tired", &ctx(17, 90.0));
        assert!(reply.contains("working for 17 minutes"));
    }

    #[test]
    fn test_study_branch() {
        let reply = respond("how do I remember all this?", &ctx(5, 90.0));
        assert!(reply.contains("active recall"));
    }

    #[test]
    fn test_time_branch() {
        let reply = respond("help me plan my evening", &ctx(5, 90.0));
        assert!(reply.contains("Time-blocking"));
    }

    #[test]
    fn test_stress_branch() {
        let reply = respond("feeling overwhelmed by exams", &ctx(5, 90.0));
        assert!(reply.contains("smaller, specific tasks"));
    }

    #[test]
    fn test_branch_order_is_first_match() {
        // Mentions both focus and motivation: the focus branch wins
        let reply = respond("no focus and no motivation", &ctx(10, 90.0));
        assert!(reply.contains("20-20-20 rule"));
    }

    #[test]
    fn test_case_insensitive_matching() {
        let reply = respond("FOCUS please", &ctx(10, 90.0));
        assert!(reply.contains("20-20-20 rule"));
    }

    #[test]
    fn test_encouragement_tiers() {
        let excellent = respond("hello", &ctx(10, 85.0));
        assert!(excellent.contains("excellent work"));

        let decent = respond("hello", &ctx(10, 65.0));
        assert!(decent.contains("Pomodoro"));

        let fallback = respond("hello", &ctx(10, 30.0));
        assert!(fallback.contains("here to help"));
    }

    #[test]
    fn test_responses_are_deterministic() {
        let c = ctx(12, 72.0);
        assert_eq!(respond("anything", &c), respond("anything", &c));
    }
}
