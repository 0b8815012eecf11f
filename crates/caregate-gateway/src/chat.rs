//! Interactive terminal conversation.
//!
//! Drives the coordinator one utterance per turn. The first real query
//! triggers the intake interview: speaker identification, patient
//! name/age/optional weight with local re-prompting, persistence, and
//! session-state population, all before the query reaches a specialist.

use caregate_agent::{
    parse_age, parse_name, parse_weight, AuditAgent, Coordinator, IntakeForm,
};
use caregate_core::{Requester, SessionKey};
use dialoguer::{Confirm, Input};
use std::sync::Arc;
use tracing::warn;

const EXIT_WORDS: [&str; 4] = ["exit", "quit", "bye", "tata"];

pub async fn run_chat(
    coordinator: Arc<Coordinator>,
    session: SessionKey,
    secret: String,
) -> anyhow::Result<()> {
    coordinator.ensure_session(&session);

    println!("============================================================");
    println!("Welcome to Caregate!");
    println!("Type 'exit', 'quit', 'bye', or 'tata' to end the session.");
    println!("Type 'show records' to view patient records (requires the security code).");
    println!("Type 'audit' to run the A2A government audit exchange.");
    println!("Type 'show session' to inspect the current session state.");
    println!("============================================================");

    let mut intake_done = false;

    loop {
        let utterance: String = Input::new()
            .with_prompt("You")
            .allow_empty(true)
            .interact_text()?;
        let trimmed = utterance.trim();

        if trimmed.is_empty() {
            println!("Please enter a question.");
            continue;
        }

        if EXIT_WORDS.contains(&trimmed.to_lowercase().as_str()) {
            println!("Thank you for using Caregate. Goodbye!");
            break;
        }

        if trimmed.eq_ignore_ascii_case("audit") {
            println!("Starting A2A communication with the government audit agent...");
            let audit = AuditAgent::new(secret.clone());
            match audit.run(coordinator.clone()).await {
                Ok(reply) => {
                    println!("\nAudit agent received:\n{}", reply);
                    println!("The audit report is also served at /audit-report when `caregate serve` is running.");
                }
                Err(e) => println!("A2A communication error: {}", e),
            }
            continue;
        }

        if trimmed.eq_ignore_ascii_case("show session") {
            let state = coordinator.session_state(&session);
            println!("{}", serde_json::to_string_pretty(&state)?);
            continue;
        }

        // First real query: run the intake interview, then forward the
        // enriched query.
        if !intake_done {
            match run_intake(&coordinator, &session).await? {
                Some(form) => {
                    intake_done = true;
                    let enriched = form.enriched_query(trimmed);
                    dispatch(&coordinator, &session, &enriched).await;
                }
                // Intake persistence failed; the session stays usable and
                // the query is forwarded as-is.
                None => {
                    intake_done = true;
                    dispatch(&coordinator, &session, trimmed).await;
                }
            }
            continue;
        }

        dispatch(&coordinator, &session, trimmed).await;
    }

    Ok(())
}

async fn dispatch(coordinator: &Arc<Coordinator>, session: &SessionKey, input: &str) {
    match coordinator.handle_turn(session, input, Requester::Human).await {
        Ok(reply) => println!("\nAgent:\n{}\n", reply),
        Err(e) => {
            warn!(session = %session, error = %e, "turn failed");
            println!("Error: {}. The session is still active; please try again.", e);
        }
    }
}

/// Collect and validate intake details. Returns `Ok(None)` when the record
/// insert fails; validation failures never escape, each sub-step re-prompts
/// until it parses. Terminal I/O errors propagate.
async fn run_intake(
    coordinator: &Arc<Coordinator>,
    session: &SessionKey,
) -> anyhow::Result<Option<IntakeForm>> {
    let is_patient = Confirm::new()
        .with_prompt("Are you the patient?")
        .default(true)
        .interact()?;

    let subject = if is_patient { "your" } else { "the patient's" };

    let patient_name = prompt_name(&format!("Please enter {} full name", subject))?;
    let patient_age = prompt_age(&format!("Please enter {} age", subject))?;
    let patient_weight = prompt_weight(&format!(
        "Please enter {} weight in kg (or leave blank to skip)",
        subject
    ))?;

    let form = if is_patient {
        IntakeForm::for_patient(patient_name, patient_age, patient_weight)
    } else {
        let caller_name = prompt_name("Please enter your name (calling on the patient's behalf)")?;
        IntakeForm::for_proxy(patient_name, patient_age, patient_weight, caller_name)
    };

    match coordinator.complete_intake(session, &form).await {
        Ok(record) => {
            println!(
                "Patient record saved: id={}, name={}, age={}",
                record.id, record.name, record.age
            );
            Ok(Some(form))
        }
        Err(e) => {
            println!(
                "Could not save the patient record: {}. Continuing without it.",
                e
            );
            Ok(None)
        }
    }
}

fn prompt_name(prompt: &str) -> anyhow::Result<String> {
    loop {
        let input: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        match parse_name(&input) {
            Ok(name) => return Ok(name),
            Err(e) => println!("{}. Please try again.", e),
        }
    }
}

fn prompt_age(prompt: &str) -> anyhow::Result<i64> {
    loop {
        let input: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        match parse_age(&input) {
            Ok(age) => return Ok(age),
            Err(e) => println!("{}. Please try again.", e),
        }
    }
}

fn prompt_weight(prompt: &str) -> anyhow::Result<Option<f64>> {
    loop {
        let input: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        match parse_weight(&input) {
            Ok(weight) => return Ok(weight),
            Err(e) => println!("{}. Please try again.", e),
        }
    }
}
