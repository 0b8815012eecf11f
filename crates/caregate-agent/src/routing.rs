//! Specialist selection.
//!
//! Which specialist should answer is an intent-classification problem that
//! belongs to the language engine, not to the control protocol. The
//! `IntentRouter` trait is the seam; `KeywordRouter` is the built-in
//! fallback classifier used when no external one is wired in.

use crate::specialist::Specialist;

/// Chooses a specialist for an utterance. Must always pick one; routing
/// never fails a turn.
pub trait IntentRouter: Send + Sync {
    fn select<'a>(&self, utterance: &str, roster: &'a [Specialist]) -> &'a Specialist;
}

/// Simple keyword-scored routing over the roster's topic hints. The last
/// roster entry is the catch-all when nothing scores.
#[derive(Default)]
pub struct KeywordRouter;

impl KeywordRouter {
    pub fn new() -> Self {
        Self
    }
}

impl IntentRouter for KeywordRouter {
    fn select<'a>(&self, utterance: &str, roster: &'a [Specialist]) -> &'a Specialist {
        assert!(!roster.is_empty(), "specialist roster must not be empty");
        let lowered = utterance.to_lowercase();

        let mut best: Option<(&Specialist, usize)> = None;
        for specialist in roster {
            let score = specialist
                .topics
                .iter()
                .filter(|topic| lowered.contains(**topic))
                .count();
            if score > 0 && best.map_or(true, |(_, s)| score > s) {
                best = Some((specialist, score));
            }
        }

        match best {
            Some((specialist, _)) => specialist,
            // Catch-all: the general physician sits last in the roster.
            None => roster.last().unwrap(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ear_complaint_routes_to_ent() {
        let roster = Specialist::roster();
        let router = KeywordRouter::new();
        let chosen = router.select("My ear hurts and I can't hear well", &roster);
        assert_eq!(chosen.name, "ent_specialist");
    }

    #[test]
    fn menstrual_question_routes_to_gynecology() {
        let roster = Specialist::roster();
        let router = KeywordRouter::new();
        let chosen = router.select("I have questions about my menstrual cycle", &roster);
        assert_eq!(chosen.name, "gynecology_specialist");
    }

    #[test]
    fn unmatched_input_falls_back_to_general_physician() {
        let roster = Specialist::roster();
        let router = KeywordRouter::new();
        let chosen = router.select("I feel a bit off lately", &roster);
        assert_eq!(chosen.name, "general_physician");
    }

    #[test]
    fn higher_score_wins() {
        let roster = Specialist::roster();
        let router = KeywordRouter::new();
        // "pain" scores the general physician, but ear+hearing outscore it.
        let chosen = router.select("ear pain and hearing loss", &roster);
        assert_eq!(chosen.name, "ent_specialist");
    }
}
