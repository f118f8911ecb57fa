//! Prompt builders for each stage of the reasoning pipeline: Clarification,
//! Chain-of-Verification, Critic, and Writer.

pub mod analyst;
pub mod clarification;
pub mod cov;
pub mod critic;
pub mod writer;

pub use analyst::AnalystPromptBuilder;
pub use clarification::ClarificationPromptBuilder;
pub use cov::CoVPromptBuilder;
pub use critic::CriticPromptBuilder;
pub use writer::WriterPromptBuilder;
