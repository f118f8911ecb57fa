//! Writer agent: composes the final report, optionally via a plan-and-write
//! outline step, enforcing the citation whitelist on its own output.

use std::time::Duration;

use reasoning_contracts::{
    CriticReview, LlmClient, LlmLevel, Mode, ReasoningError, WriterOutput, WriterPlan,
};
use reasoning_prompts::WriterPromptBuilder;

use crate::base::BaseAgent;

pub struct WriterAgent<'a> {
    base: BaseAgent<'a>,
    prompts: WriterPromptBuilder,
}

impl<'a> WriterAgent<'a> {
    pub fn new(llm: &'a dyn LlmClient, timeout: Duration) -> Self {
        Self {
            base: BaseAgent::new(llm, "writer", timeout, 3),
            prompts: WriterPromptBuilder::new(),
        }
    }

    pub async fn plan(
        &self,
        analyst_draft: &str,
        critic_review: &CriticReview,
        user_query: &str,
        target_length: u32,
    ) -> Result<WriterPlan, ReasoningError> {
        let prompt = self
            .prompts
            .build_plan_prompt(analyst_draft, critic_review, user_query, target_length);
        self.base.call_llm_validated(&prompt, LlmLevel::High).await
    }

    /// Composes the final report and enforces `sources_used ⊆ analyst_citations`
    /// before returning — the Writer's own output is re-checked, not just
    /// trusted from the LLM response.
    pub async fn compose(
        &self,
        analyst_draft: &str,
        critic_review: &CriticReview,
        analyst_citations: &[i32],
        mode: Mode,
        user_query: &str,
        plan: Option<&WriterPlan>,
    ) -> Result<WriterOutput, ReasoningError> {
        let suggested_confidence = self.prompts.map_status_to_confidence(critic_review.status);
        let prompt = self.prompts.build_compose_prompt(
            analyst_draft,
            critic_review,
            analyst_citations,
            mode,
            user_query,
            suggested_confidence,
            plan,
        );

        let mut output: WriterOutput = self.base.call_llm_validated(&prompt, LlmLevel::High).await?;

        let violations = output.whitelist_violations(analyst_citations);
        if !violations.is_empty() {
            return Err(ReasoningError::WhitelistViolation { invalid_ids: violations });
        }

        // The Writer may downgrade confidence but never upgrade it past what
        // the Critic status warrants.
        output.confidence_level = output.confidence_level.min(suggested_confidence);

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reasoning_contracts::{CriticStatus, LlmError, LlmResponse};
    use serde_json::{json, Value};

    struct StubLlm {
        sources_used: Vec<i32>,
    }

    #[async_trait]
    impl LlmClient for StubLlm {
        async fn ask(
            &self,
            _prompt: &str,
            _schema: &Value,
            _level: LlmLevel,
            _timeout: Duration,
            _max_length: Option<usize>,
            _query_params: &Value,
        ) -> Result<LlmResponse, LlmError> {
            Ok(LlmResponse::Json(json!({
                "final_report": "# Report",
                "sources_used": self.sources_used,
                "confidence_level": "High",
                "methodology_note": "based on cited sources"
            })))
        }
    }

    fn review() -> CriticReview {
        CriticReview {
            status: CriticStatus::Approve,
            critique: "fine".to_string(),
            suggestions: vec![],
            mode_compliance: true,
            logical_gaps: vec![],
            source_issues: vec![],
            structured_weaknesses: vec![],
        }
    }

    fn reject_review() -> CriticReview {
        CriticReview {
            status: CriticStatus::Reject,
            ..review()
        }
    }

    #[tokio::test]
    async fn compose_succeeds_when_citations_are_in_whitelist() {
        let llm = StubLlm { sources_used: vec![1] };
        let agent = WriterAgent::new(&llm, Duration::from_secs(5));
        let out = agent
            .compose("draft", &review(), &[1, 2], Mode::Strict, "query", None)
            .await
            .unwrap();
        assert_eq!(out.sources_used, vec![1]);
    }

    #[tokio::test]
    async fn compose_rejects_citations_outside_whitelist() {
        let llm = StubLlm { sources_used: vec![1, 9] };
        let agent = WriterAgent::new(&llm, Duration::from_secs(5));
        let err = agent
            .compose("draft", &review(), &[1, 2], Mode::Strict, "query", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ReasoningError::WhitelistViolation { invalid_ids } if invalid_ids == vec![9]));
    }

    #[tokio::test]
    async fn compose_clamps_confidence_down_to_reject_level_even_if_llm_says_high() {
        let llm = StubLlm { sources_used: vec![1] };
        let agent = WriterAgent::new(&llm, Duration::from_secs(5));
        let out = agent
            .compose("draft", &reject_review(), &[1, 2], Mode::Strict, "query", None)
            .await
            .unwrap();
        assert_eq!(out.confidence_level, reasoning_contracts::ConfidenceLevel::Low);
    }
}
