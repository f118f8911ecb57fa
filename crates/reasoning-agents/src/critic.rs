//! Critic agent: reviews a draft for logical gaps and source issues, with
//! automatic escalation to REJECT when critical weaknesses pile up.

use std::time::Duration;

use reasoning_contracts::{
    ArgumentNode, CriticReview, CriticStatus, GapResolution, KnowledgeGraph, LlmClient, LlmLevel,
    Mode, ReasoningError, Severity,
};
use reasoning_prompts::CriticPromptBuilder;

use crate::base::BaseAgent;

pub struct CriticAgent<'a> {
    base: BaseAgent<'a>,
    prompts: CriticPromptBuilder,
}

impl<'a> CriticAgent<'a> {
    pub fn new(llm: &'a dyn LlmClient, timeout: Duration) -> Self {
        Self {
            base: BaseAgent::new(llm, "critic", timeout, 3),
            prompts: CriticPromptBuilder::new(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn review(
        &self,
        draft: &str,
        query: &str,
        mode: Mode,
        argument_graph: Option<&[ArgumentNode]>,
        knowledge_graph: Option<&KnowledgeGraph>,
        gap_resolutions: Option<&[GapResolution]>,
        enable_structured_weaknesses: bool,
        critical_weakness_threshold: u32,
        cov_summary: Option<&str>,
    ) -> Result<CriticReview, ReasoningError> {
        let prompt = self.prompts.build_review_prompt(
            draft,
            query,
            mode,
            argument_graph,
            knowledge_graph,
            enable_structured_weaknesses,
            gap_resolutions,
            cov_summary,
        );

        let mut result: CriticReview = self.base.call_llm_validated(&prompt, LlmLevel::High).await?;

        let critical_count = result
            .structured_weaknesses
            .iter()
            .filter(|w| w.severity == Severity::Critical)
            .count() as u32;

        if critical_count >= critical_weakness_threshold && result.status != CriticStatus::Reject {
            tracing::warn!(
                critical_count,
                threshold = critical_weakness_threshold,
                "auto-escalating critic verdict to REJECT"
            );
            result.status = CriticStatus::Reject;
            result.critique = format!(
                "{}\n\n[自動升級至 REJECT：{critical_count} 個嚴重問題]",
                result.critique
            );
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reasoning_contracts::{LlmError, LlmResponse};
    use serde_json::{json, Value};

    struct StubLlm {
        critical_weaknesses: usize,
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
            let weaknesses: Vec<Value> = (0..self.critical_weaknesses)
                .map(|i| {
                    json!({
                        "node_id": null,
                        "severity": "critical",
                        "category": "unsupported-claim",
                        "description": format!("issue {i}"),
                        "suggested_fix": "cite a source"
                    })
                })
                .collect();
            Ok(LlmResponse::Json(json!({
                "status": "APPROVE",
                "critique": "looks mostly fine",
                "suggestions": [],
                "mode_compliance": true,
                "logical_gaps": [],
                "source_issues": [],
                "structured_weaknesses": weaknesses
            })))
        }
    }

    #[tokio::test]
    async fn escalates_to_reject_when_critical_threshold_met() {
        let llm = StubLlm { critical_weaknesses: 2 };
        let agent = CriticAgent::new(&llm, Duration::from_secs(5));
        let review = agent
            .review("draft", "query", Mode::Strict, None, None, None, true, 2, None)
            .await
            .unwrap();
        assert_eq!(review.status, CriticStatus::Reject);
        assert!(review.critique.contains("自動升級至 REJECT"));
    }

    #[tokio::test]
    async fn leaves_status_alone_below_threshold() {
        let llm = StubLlm { critical_weaknesses: 1 };
        let agent = CriticAgent::new(&llm, Duration::from_secs(5));
        let review = agent
            .review("draft", "query", Mode::Discovery, None, None, None, true, 2, None)
            .await
            .unwrap();
        assert_eq!(review.status, CriticStatus::Approve);
    }
}
