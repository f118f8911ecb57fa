//! Shared data contracts for the Actor-Critic reasoning pipeline.
//!
//! Provides the typed request/response shapes every stage (filters,
//! analyzer, CoV, agents, post-ranking, pipeline) exchanges, plus the error
//! taxonomy, operating-mode gates, and the trait boundaries to the
//! surrounding application (retrieval, LLM SDK, prompt templates).

pub mod analysis;
pub mod argument;
pub mod claim;
pub mod clarification;
pub mod config;
pub mod critic;
pub mod error;
pub mod json_repair;
pub mod mode;
pub mod ports;
pub mod source;
pub mod writer;

pub use analysis::{NodeImpactAnalysis, ReasoningChainAnalysis};
pub use argument::{AnalystOutput, ArgumentNode, Confidence, GapResolution, KnowledgeGraph, KnowledgeTriple};
pub use claim::{
    Claim, ClaimType, ClaimsList, VerificationOutcome, VerificationResult, VerificationStatus,
};
pub use clarification::{ClarificationOption, ClarificationType, Question, Questions, TimeRange};
pub use config::{AgentTimeouts, CritiqueThresholds, FeaturesConfig, MmrParams, PipelineConfig, ReasoningParams};
pub use critic::{CriticReview, CriticStatus, Severity, StructuredWeakness};
pub use error::ReasoningError;
pub use json_repair::{parse_json_with_repair, safe_parse_llm_json};
pub use mode::{Mode, ModeConfig, ModeConfigs};
pub use ports::{LlmClient, LlmError, LlmLevel, LlmResponse, PromptResolver, Retriever, RetrievalError, RetrievalParams};
pub use source::{
    LegacySourceTuple, RawSourceItem, ReasoningMetadata, SourceItem, Tier6Source, TierInfo, TIER_6,
    UNKNOWN_TIER,
};
pub use writer::{ConfidenceLevel, WriterOutput, WriterPlan};
