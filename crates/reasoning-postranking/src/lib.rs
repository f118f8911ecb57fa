//! Post-ranking: optional MMR diversity re-ranking followed by a
//! length-bounded Summarize step, run after the Critic and before the
//! Writer sees the final citation list.

pub mod mmr;
pub mod summarize;

pub use mmr::{apply_mmr_reranking, attach_vectors, strip_vectors, MmrReranker, MmrScoreLogEntry, RankedResult};
pub use summarize::{SummarizeOutput, SummarizePromptBuilder, Summarizer};

use std::time::Duration;

use reasoning_contracts::{LlmClient, MmrParams, ReasoningError};

/// What, if anything, post-ranking should do with the final result list —
/// the Rust equivalent of the original's `generate_mode` string switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateMode {
    /// Nothing to do.
    None,
    /// Run MMR re-ranking (if applicable) then summarize.
    Summarize,
}

/// Orchestrates the post-ranking step: MMR re-ranking (subject to its three
/// skip conditions) followed by summarization, mirroring `PostRanking.do` /
/// `SummarizeResults.do` from the upstream ranking pipeline.
pub struct PostRanking<'a> {
    llm: &'a dyn LlmClient,
    timeout: Duration,
}

impl<'a> PostRanking<'a> {
    pub fn new(llm: &'a dyn LlmClient, timeout: Duration) -> Self {
        Self { llm, timeout }
    }

    /// Runs the configured post-ranking mode. Returns `None` when
    /// `mode == GenerateMode::None`. The caller supplies a `query_id` used
    /// only for the MMR score log lines.
    pub async fn run(
        &self,
        mode: GenerateMode,
        query: &str,
        query_id: &str,
        ranked: Vec<RankedResult>,
        mmr_params: &MmrParams,
        max_summary_length: usize,
    ) -> Result<Option<SummarizeOutput>, ReasoningError> {
        if mode == GenerateMode::None {
            return Ok(None);
        }

        let reranked = apply_mmr_reranking(ranked, mmr_params, query_id);
        let summarizer = Summarizer::new(self.llm, self.timeout);
        let output = summarizer.summarize(query, &reranked, max_summary_length).await?;
        Ok(Some(output))
    }
}
