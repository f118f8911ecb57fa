//! Analyst agent: turns filtered sources into a draft, an argument graph,
//! and a citation whitelist.

use std::time::Duration;

use reasoning_contracts::{AnalystOutput, LlmClient, LlmLevel, Mode, ReasoningError, SourceItem};
use reasoning_prompts::AnalystPromptBuilder;

use crate::base::BaseAgent;

pub struct AnalystAgent<'a> {
    base: BaseAgent<'a>,
    prompts: AnalystPromptBuilder,
}

impl<'a> AnalystAgent<'a> {
    pub fn new(llm: &'a dyn LlmClient, timeout: Duration) -> Self {
        Self {
            base: BaseAgent::new(llm, "analyst", timeout, 3),
            prompts: AnalystPromptBuilder::new(),
        }
    }

    pub async fn analyze(
        &self,
        query: &str,
        mode: Mode,
        sources: &[SourceItem],
    ) -> Result<AnalystOutput, ReasoningError> {
        let prompt = self.prompts.build_analysis_prompt(query, mode, sources);
        self.base.call_llm_validated(&prompt, LlmLevel::High).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reasoning_contracts::{LlmError, LlmResponse};
    use serde_json::{json, Value};

    struct StubLlm;

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
                "draft": "the draft",
                "argument_graph": [],
                "citations": [1],
                "gap_resolutions": null
            })))
        }
    }

    #[tokio::test]
    async fn analyze_returns_validated_output() {
        let llm = StubLlm;
        let agent = AnalystAgent::new(&llm, Duration::from_secs(5));
        let sources = vec![SourceItem::new("u", "t", "d")];
        let out = agent.analyze("q", Mode::Discovery, &sources).await.unwrap();
        assert_eq!(out.citations, vec![1]);
    }
}
