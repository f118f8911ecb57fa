//! Critic review output.

use serde::{Deserialize, Serialize};

/// Severity of a single structured weakness the Critic identified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// One specific weakness the Critic found, optionally tied to an argument
/// node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredWeakness {
    #[serde(default)]
    pub node_id: Option<String>,
    pub severity: Severity,
    pub category: String,
    pub description: String,
    pub suggested_fix: String,
}

/// The Critic's verdict on a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CriticStatus {
    Approve,
    Warn,
    Reject,
}

impl CriticStatus {
    pub fn to_confidence_level(self) -> crate::writer::ConfidenceLevel {
        match self {
            CriticStatus::Approve => crate::writer::ConfidenceLevel::High,
            CriticStatus::Warn => crate::writer::ConfidenceLevel::Medium,
            CriticStatus::Reject => crate::writer::ConfidenceLevel::Low,
        }
    }
}

/// Full Critic review. `structured_weaknesses` is always present (empty
/// when the `structured_critique` feature is disabled) rather than being a
/// separate "enhanced" schema, collapsing the dynamic-schema split the
/// original code performs at the type level into one type gated by a
/// feature flag at the call site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriticReview {
    pub status: CriticStatus,
    pub critique: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub mode_compliance: bool,
    #[serde(default)]
    pub logical_gaps: Vec<String>,
    #[serde(default)]
    pub source_issues: Vec<String>,
    #[serde(default)]
    pub structured_weaknesses: Vec<StructuredWeakness>,
}

impl CriticReview {
    pub fn critical_weakness_count(&self) -> usize {
        self.structured_weaknesses
            .iter()
            .filter(|w| w.severity == Severity::Critical)
            .count()
    }
}
