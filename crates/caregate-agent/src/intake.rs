//! First-turn intake: speaker identification, patient details, validation.
//!
//! Validation failures are recovered locally by re-prompting the same
//! sub-step; they never surface past intake. The 0-150 age bound is policy
//! enforced here at the intake boundary; the record store only rejects
//! negative ages.

use caregate_core::SessionState;

pub const AGE_MIN: i64 = 0;
pub const AGE_MAX: i64 = 150;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("age must be a number")]
    AgeNotNumeric,

    #[error("age must be between {AGE_MIN} and {AGE_MAX}")]
    AgeOutOfRange,

    #[error("weight must be a number, or blank to skip")]
    WeightNotNumeric,

    #[error("name must not be empty")]
    EmptyName,
}

/// Parse and policy-validate an age entry.
pub fn parse_age(input: &str) -> Result<i64, ValidationError> {
    let age: i64 = input
        .trim()
        .parse()
        .map_err(|_| ValidationError::AgeNotNumeric)?;
    if !(AGE_MIN..=AGE_MAX).contains(&age) {
        return Err(ValidationError::AgeOutOfRange);
    }
    Ok(age)
}

/// Parse a weight entry. Blank means "unknown" and is accepted.
pub fn parse_weight(input: &str) -> Result<Option<f64>, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse()
        .map(Some)
        .map_err(|_| ValidationError::WeightNotNumeric)
}

/// Parse a required name entry.
pub fn parse_name(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(trimmed.to_string())
}

/// A completed intake interview.
#[derive(Clone, Debug, PartialEq)]
pub struct IntakeForm {
    pub patient_name: String,
    pub patient_age: i64,
    pub patient_weight: Option<f64>,
    /// The person speaking. Mirrors `patient_name` when the speaker is
    /// the patient; otherwise the proxy caller's name.
    pub interactant_name: String,
}

impl IntakeForm {
    /// The speaker is the patient.
    pub fn for_patient(name: impl Into<String>, age: i64, weight: Option<f64>) -> Self {
        let name = name.into();
        Self {
            interactant_name: name.clone(),
            patient_name: name,
            patient_age: age,
            patient_weight: weight,
        }
    }

    /// A proxy is calling on the patient's behalf.
    pub fn for_proxy(
        patient_name: impl Into<String>,
        age: i64,
        weight: Option<f64>,
        caller_name: impl Into<String>,
    ) -> Self {
        Self {
            patient_name: patient_name.into(),
            patient_age: age,
            patient_weight: weight,
            interactant_name: caller_name.into(),
        }
    }

    pub fn speaker_is_patient(&self) -> bool {
        self.interactant_name == self.patient_name
    }

    /// The session-state entries this intake establishes.
    pub fn session_state(&self) -> SessionState {
        SessionState {
            patient_name: Some(self.patient_name.clone()),
            patient_age: Some(self.patient_age),
            patient_weight: self.patient_weight,
            interactant_name: Some(self.interactant_name.clone()),
        }
    }

    /// Compose the first utterance forwarded to a specialist, prefixed
    /// with who is speaking and on whose behalf.
    pub fn enriched_query(&self, query: &str) -> String {
        if self.speaker_is_patient() {
            format!(
                "My name is {}. I am {} years old. {}",
                self.patient_name, self.patient_age, query
            )
        } else {
            let weight_part = self
                .patient_weight
                .map(|w| format!(", weight {}kg", w))
                .unwrap_or_default();
            format!(
                "This is {} calling on behalf of {} (age {}{}). {}",
                self.interactant_name, self.patient_name, self.patient_age, weight_part, query
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_parses_within_policy_bounds() {
        assert_eq!(parse_age("29"), Ok(29));
        assert_eq!(parse_age(" 0 "), Ok(0));
        assert_eq!(parse_age("150"), Ok(150));
    }

    #[test]
    fn age_rejects_non_numeric() {
        assert_eq!(parse_age("twenty"), Err(ValidationError::AgeNotNumeric));
        assert_eq!(parse_age(""), Err(ValidationError::AgeNotNumeric));
        assert_eq!(parse_age("29.5"), Err(ValidationError::AgeNotNumeric));
    }

    #[test]
    fn age_rejects_out_of_range() {
        assert_eq!(parse_age("-1"), Err(ValidationError::AgeOutOfRange));
        assert_eq!(parse_age("151"), Err(ValidationError::AgeOutOfRange));
    }

    #[test]
    fn weight_blank_means_unknown() {
        assert_eq!(parse_weight(""), Ok(None));
        assert_eq!(parse_weight("   "), Ok(None));
    }

    #[test]
    fn weight_parses_or_rejects() {
        assert_eq!(parse_weight("60.5"), Ok(Some(60.5)));
        assert_eq!(parse_weight("abc"), Err(ValidationError::WeightNotNumeric));
    }

    #[test]
    fn name_must_not_be_empty() {
        assert_eq!(parse_name("  Jane Doe "), Ok("Jane Doe".to_string()));
        assert_eq!(parse_name("   "), Err(ValidationError::EmptyName));
    }

    #[test]
    fn patient_intake_mirrors_interactant() {
        let form = IntakeForm::for_patient("Jane Doe", 29, Some(60.5));
        assert!(form.speaker_is_patient());
        let state = form.session_state();
        assert_eq!(state.patient_name.as_deref(), Some("Jane Doe"));
        assert_eq!(state.interactant_name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn proxy_intake_keeps_both_names() {
        let form = IntakeForm::for_proxy("Jane Doe", 82, None, "Mark Doe");
        assert!(!form.speaker_is_patient());
        let state = form.session_state();
        assert_eq!(state.patient_name.as_deref(), Some("Jane Doe"));
        assert_eq!(state.interactant_name.as_deref(), Some("Mark Doe"));
    }

    #[test]
    fn enriched_query_for_patient() {
        let form = IntakeForm::for_patient("Jane Doe", 29, None);
        let query = form.enriched_query("My throat hurts.");
        assert_eq!(
            query,
            "My name is Jane Doe. I am 29 years old. My throat hurts."
        );
    }

    #[test]
    fn enriched_query_for_proxy_mentions_weight_when_known() {
        let form = IntakeForm::for_proxy("Jane Doe", 82, Some(55.0), "Mark Doe");
        let query = form.enriched_query("She feels dizzy.");
        assert!(query.starts_with("This is Mark Doe calling on behalf of Jane Doe"));
        assert!(query.contains("age 82"));
        assert!(query.contains("weight 55kg"));
        assert!(query.ends_with("She feels dizzy."));
    }

    #[test]
    fn enriched_query_for_proxy_omits_unknown_weight() {
        let form = IntakeForm::for_proxy("Jane Doe", 82, None, "Mark Doe");
        assert!(!form.enriched_query("Hello.").contains("weight"));
    }
}
