//! Core types for Caregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Session identifier - cheaply cloneable
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct SessionKey(Arc<str>);

impl SessionKey {
    pub fn new(s: impl Into<String>) -> Self {
        Self(Arc::from(s.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SessionKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Message role
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single turn in a conversation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A persisted patient intake record.
///
/// `id` and `created_at` are assigned by the record store at insert time;
/// records are never updated or deleted after creation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PatientRecord {
    pub id: i64,
    pub name: String,
    pub age: i64,
    pub weight: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Per-session conversational context.
///
/// An absent field means "unknown"; callers never treat absence as an error.
/// `interactant_name` is the person speaking, which mirrors `patient_name`
/// when the speaker is the patient and differs when a proxy is calling on
/// the patient's behalf.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_age: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interactant_name: Option<String>,
}

impl SessionState {
    pub fn is_empty(&self) -> bool {
        self.patient_name.is_none()
            && self.patient_age.is_none()
            && self.patient_weight.is_none()
            && self.interactant_name.is_none()
    }

    /// Merge another state into this one. Last write wins per field; fields
    /// the other state does not carry are left untouched.
    pub fn merge(&mut self, other: SessionState) {
        if other.patient_name.is_some() {
            self.patient_name = other.patient_name;
        }
        if other.patient_age.is_some() {
            self.patient_age = other.patient_age;
        }
        if other.patient_weight.is_some() {
            self.patient_weight = other.patient_weight;
        }
        if other.interactant_name.is_some() {
            self.interactant_name = other.interactant_name;
        }
    }

    /// Render the known context as a short prose block for a specialist's
    /// system prompt. Returns `None` when nothing is known yet.
    pub fn context_summary(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let mut lines = Vec::new();
        if let Some(name) = &self.patient_name {
            lines.push(format!("Patient name: {}", name));
        }
        if let Some(age) = self.patient_age {
            lines.push(format!("Patient age: {}", age));
        }
        if let Some(weight) = self.patient_weight {
            lines.push(format!("Patient weight: {} kg", weight));
        }
        if let Some(caller) = &self.interactant_name {
            lines.push(format!("Speaking with: {}", caller));
        }
        Some(lines.join("\n"))
    }
}
