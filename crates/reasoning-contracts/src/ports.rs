//! Trait boundaries for the external collaborators named in SPEC_FULL.md
//! §1/§6: retrieval, the LLM SDK, and the prompt template resolver. These
//! are the only things the reasoning core treats as I/O.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::source::RawSourceItem;

/// LLM quality tier, mirroring `ask_llm(..., level="high"|"low", ...)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmLevel {
    Low,
    High,
}

/// What an `LlmClient` hands back. The base agent tries `Json` directly;
/// `Text` goes through the JSON repair cascade first.
#[derive(Debug, Clone)]
pub enum LlmResponse {
    Json(Value),
    Text(String),
}

impl LlmResponse {
    /// An empty JSON object is treated as an LLM failure, never a valid
    /// payload.
    pub fn is_empty_object(&self) -> bool {
        matches!(self, LlmResponse::Json(Value::Object(map)) if map.is_empty())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("LLM call timed out")]
    Timeout,
    #[error("LLM provider error: {0}")]
    Provider(String),
}

#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("retrieval backend error: {0}")]
    Backend(String),
}

/// Parameters forwarded to a retriever, opaque to the reasoning core beyond
/// the fields it reads directly (query string is passed separately).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetrievalParams {
    pub top_k: Option<usize>,
    #[serde(default)]
    pub extra: Value,
}

/// External dense/keyword retrieval interface. Implemented upstream
/// (vector store, BM25, crawlers); this crate only depends on the trait.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(
        &self,
        query: &str,
        params: &RetrievalParams,
    ) -> Result<Vec<RawSourceItem>, RetrievalError>;
}

/// External LLM SDK wrapper interface: `ask_llm(prompt, schema, level,
/// timeout) -> dict|str`.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn ask(
        &self,
        prompt: &str,
        schema: &Value,
        level: LlmLevel,
        timeout: Duration,
        max_length: Option<usize>,
        query_params: &Value,
    ) -> Result<LlmResponse, LlmError>;
}

/// Named prompt template resolver: `find_prompt(name, site) /
/// fill_prompt(template, vars)`.
pub trait PromptResolver: Send + Sync {
    fn find_prompt(&self, name: &str, site: &str) -> Option<String>;
    fn fill_prompt(&self, template: &str, vars: &Value) -> String;
}
