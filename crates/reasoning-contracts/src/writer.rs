//! Writer agent output and long-form planning types.

use serde::{Deserialize, Serialize};

/// The confidence label attached to the final report. Derived from Critic
/// status; the Writer may downgrade but never upgrade it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

/// Outline produced by the plan step of plan-and-write (long-form) mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriterPlan {
    pub outline: String,
    pub estimated_length: u32,
    pub key_arguments: Vec<String>,
}

/// The Writer's final, validated output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriterOutput {
    pub final_report: String,
    pub sources_used: Vec<i32>,
    pub confidence_level: ConfidenceLevel,
    pub methodology_note: String,
}

impl WriterOutput {
    /// `sources_used ⊆ whitelist` — the anti-hallucination invariant.
    /// Returns the offending ids, if any.
    pub fn whitelist_violations(&self, whitelist: &[i32]) -> Vec<i32> {
        self.sources_used
            .iter()
            .copied()
            .filter(|id| !whitelist.contains(id))
            .collect()
    }
}
