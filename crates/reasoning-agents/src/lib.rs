//! The four LLM-calling agents of the Actor-Critic pipeline: Clarification,
//! Analyst, Critic, and Writer. Each composes [`base::BaseAgent`] rather
//! than inheriting a shared base type.

pub mod analyst;
pub mod base;
pub mod clarification;
pub mod critic;
pub mod writer;

pub use analyst::AnalystAgent;
pub use base::BaseAgent;
pub use clarification::ClarificationAgent;
pub use critic::CriticAgent;
pub use writer::WriterAgent;
