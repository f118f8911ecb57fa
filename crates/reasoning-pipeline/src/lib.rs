//! Top-level orchestration crate: wires Clarification, the Source-Tier
//! Filter, the Analyst, Chain-of-Verification, the Reasoning-Chain
//! Analyzer, the Critic, Post-Ranking, and the Writer into one pipeline run
//! per query.

pub mod ambiguity;
pub mod pipeline;
pub mod query_log;

pub use pipeline::{PipelineOutcome, PipelineResult, QueryRequest, ReasoningPipeline};
pub use query_log::{QueryLog, StageTiming};
