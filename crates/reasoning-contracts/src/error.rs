//! Error taxonomy for the reasoning core.
//!
//! One `thiserror` enum per concern, composed by callers with `anyhow` at
//! the orchestration boundary rather than flattened into a single type.

use std::fmt;

use crate::Mode;

/// Errors surfaced by the reasoning pipeline and its components.
#[derive(Debug, thiserror::Error)]
pub enum ReasoningError {
    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("no valid sources available in any mode")]
    NoValidSources,

    #[error("{agent} LLM call timed out after {timeout_secs}s")]
    LlmTimeout { agent: String, timeout_secs: u64 },

    #[error("{agent} failed schema validation after {attempts} attempt(s): {message}")]
    Validation {
        agent: String,
        attempts: u32,
        message: String,
    },

    #[error("writer cited id(s) not in analyst whitelist: {invalid_ids:?}")]
    WhitelistViolation { invalid_ids: Vec<i32> },

    #[error("graph anomaly detected: {message}")]
    GraphAnomaly { message: String },

    #[error("{agent} received an empty LLM response")]
    EmptyResponse { agent: String },
}

impl ReasoningError {
    /// A short, mode/stage-aware message safe to show to an end user.
    ///
    /// Internal diagnostic detail (retry counts, raw LLM text, stack-like
    /// context) belongs in the `tracing::error!` call site, not here.
    pub fn user_message(&self, mode: Mode) -> String {
        match self {
            ReasoningError::NoValidSources => match mode {
                Mode::Strict => {
                    "No sources met the strict-mode authority bar for this query.".to_string()
                }
                _ => "No sources were available for this query.".to_string(),
            },
            ReasoningError::LlmTimeout { agent, .. } => {
                format!("The {agent} stage took too long to respond. Please try again.")
            }
            ReasoningError::Validation { agent, .. } => {
                format!("The {agent} stage returned a malformed response.")
            }
            ReasoningError::WhitelistViolation { .. } => {
                "The report cited a source that was not part of the research draft.".to_string()
            }
            ReasoningError::Config { .. } => "The reasoning pipeline is misconfigured.".to_string(),
            ReasoningError::GraphAnomaly { message } => {
                format!("Reasoning chain anomaly: {message}")
            }
            ReasoningError::EmptyResponse { agent } => {
                format!("The {agent} stage produced no usable output.")
            }
        }
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ReasoningError::LlmTimeout { .. } | ReasoningError::Validation { .. }
        )
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Mode::Strict => "strict",
            Mode::Discovery => "discovery",
            Mode::Monitor => "monitor",
        };
        write!(f, "{label}")
    }
}
