//! Specialist personas.
//!
//! A specialist is immutable once constructed: its instruction is fully
//! composed here, with the sentinel clause as a fixed suffix. There is no
//! post-construction mutation path, so the security routing rule cannot be
//! lost or duplicated by later instruction edits.

use caregate_core::SENTINEL_FORWARD;

/// A delegate conversational persona bound to a medical sub-domain.
pub struct Specialist {
    pub name: &'static str,
    pub description: &'static str,
    /// Keyword hints consumed by the fallback router; the real intent
    /// classification is the language engine's job.
    pub topics: &'static [&'static str],
    pub instruction: String,
}

/// Compose a specialist instruction from its intro and domain body.
/// The sentinel clause and the session-context clause are always appended,
/// idempotently: a body that already carries the sentinel rule is left
/// untouched.
pub fn compose_instruction(intro: &str, body: &str) -> String {
    let mut instruction = format!("{}\n\n{}", intro.trim(), body.trim());
    if !instruction.contains(SENTINEL_FORWARD) {
        instruction.push_str(&sentinel_clause());
    }
    if !instruction.contains("Session context:") {
        instruction.push_str(SESSION_CONTEXT_CLAUSE);
    }
    instruction
}

fn sentinel_clause() -> String {
    format!(
        "\n\nSecurity routing rule: if the user requests 'show records', \
         'display records', or 'view records', do NOT attempt to access or \
         describe records. Respond with exactly the single token \
         '{}' and nothing else (no extra text, no explanation).",
        SENTINEL_FORWARD
    )
}

const SESSION_CONTEXT_CLAUSE: &str = "\n\nSession context: the context block above your conversation may carry \
     the patient's name, age, and weight, and the name of the person \
     speaking. Greet and address the speaker by their name; use the \
     patient's details when giving medical guidance. The speaker may be \
     calling on the patient's behalf.";

impl Specialist {
    pub fn ent() -> Self {
        Self {
            name: "ent_specialist",
            description: "Ear, nose, and throat medical assistance",
            topics: &[
                "ear", "nose", "throat", "sinus", "hearing", "tonsil", "voice", "snoring",
                "smell",
            ],
            instruction: compose_instruction(
                "Hello — I'm the ENT specialist. I can help with ear, nose, and throat concerns.",
                "You are an ENT (ear, nose, and throat) medical assistant. Explain \
                 common ENT conditions, symptoms, and home care in plain language, \
                 and say when a symptom needs in-person medical attention. Never \
                 diagnose or prescribe; always recommend a consultation with a \
                 healthcare professional for anything serious. Be warm, patient, \
                 and concrete.",
            ),
        }
    }

    pub fn gynecology() -> Self {
        Self {
            name: "gynecology_specialist",
            description: "Gynecology and women's health assistance",
            topics: &[
                "period",
                "menstrual",
                "pregnan",
                "gynec",
                "ovar",
                "uterus",
                "cervical",
                "contracepti",
                "menopause",
            ],
            instruction: compose_instruction(
                "Hello — I'm the gynecology specialist. I can help with women's health questions.",
                "You are a gynecology medical assistant. Answer questions about \
                 menstrual health, pregnancy, contraception, and related concerns \
                 with clarity and discretion. Never diagnose or prescribe; \
                 recommend an in-person consultation for anything urgent or \
                 uncertain. Be respectful of sensitive topics.",
            ),
        }
    }

    pub fn general_physician() -> Self {
        Self {
            name: "general_physician",
            description: "General medical assistance and triage",
            topics: &["fever", "cough", "pain", "fatigue", "headache", "cold", "flu"],
            instruction: compose_instruction(
                "Hello — I'm the general physician. I can help with everyday health concerns.",
                "You are a general physician's assistant. Help with everyday \
                 symptoms, preventive care, and guidance on when to see a doctor. \
                 Keep answers short and practical. Never diagnose or prescribe; \
                 urgent symptoms always warrant an in-person visit.",
            ),
        }
    }

    /// The standard roster, in router priority order.
    pub fn roster() -> Vec<Specialist> {
        vec![
            Specialist::ent(),
            Specialist::gynecology(),
            Specialist::general_physician(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_specialist_carries_the_sentinel_clause() {
        for specialist in Specialist::roster() {
            assert!(
                specialist.instruction.contains(SENTINEL_FORWARD),
                "{} is missing the sentinel clause",
                specialist.name
            );
        }
    }

    #[test]
    fn composition_is_idempotent() {
        let once = compose_instruction("Intro.", "Body.");
        // Re-compose with an already-composed body: clauses must not duplicate.
        let twice = compose_instruction("Intro.", &once);
        assert_eq!(
            once.matches(SENTINEL_FORWARD).count(),
            1,
            "sentinel clause appended exactly once"
        );
        assert_eq!(twice.matches(SENTINEL_FORWARD).count(), 1);
        assert_eq!(twice.matches("Session context:").count(), 1);
    }

    #[test]
    fn instruction_keeps_intro_first() {
        let specialist = Specialist::ent();
        assert!(specialist.instruction.starts_with("Hello — I'm the ENT specialist"));
    }

    #[test]
    fn roster_names_are_distinct() {
        let roster = Specialist::roster();
        let mut names: Vec<&str> = roster.iter().map(|s| s.name).collect();
        names.dedup();
        assert_eq!(names.len(), roster.len());
    }
}
