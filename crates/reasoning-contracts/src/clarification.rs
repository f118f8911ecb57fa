//! Clarification questions and the binding time-range constraint.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The three ambiguity dimensions the Clarification agent detects. Time
/// and scope are commonly detected jointly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClarificationType {
    Time,
    Scope,
    Entity,
}

/// A concrete date range. For `time`-type options this is a **binding
/// constraint**: once chosen, the pipeline must honor it exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

/// One selectable clarification option.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClarificationOption {
    pub label: String,
    pub intent: String,
    #[serde(default)]
    pub query_modifier: Option<String>,
    #[serde(default)]
    pub time_range: Option<TimeRange>,
    #[serde(default)]
    pub is_comprehensive: bool,
}

impl ClarificationOption {
    pub fn comprehensive(label: impl Into<String>, intent: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            intent: intent.into(),
            query_modifier: Some(String::new()),
            time_range: None,
            is_comprehensive: true,
        }
    }
}

/// A single clarification question with its option set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub clarification_type: ClarificationType,
    pub question: String,
    pub required: bool,
    pub options: Vec<ClarificationOption>,
}

impl Question {
    /// Every question dimension must include a comprehensive fallback
    /// option; this is checked rather than assumed so malformed LLM output
    /// is caught before it reaches the user.
    pub fn has_comprehensive_option(&self) -> bool {
        self.options.iter().any(|o| o.is_comprehensive)
    }

    /// Time-type questions must carry a concrete `time_range` on every
    /// non-comprehensive option (the binding-constraint invariant).
    pub fn time_ranges_are_bound(&self) -> bool {
        if self.clarification_type != ClarificationType::Time {
            return true;
        }
        self.options
            .iter()
            .filter(|o| !o.is_comprehensive)
            .all(|o| o.time_range.is_some())
    }
}

/// The full clarification result: an empty vec means "no clarification
/// needed".
pub type Questions = Vec<Question>;
