//! Length-bounded Summarize step run over the (possibly MMR re-ranked)
//! result list, the last stage of post-ranking before the results are
//! handed to the Writer.

use std::time::Duration;

use reasoning_contracts::{
    parse_json_with_repair, LlmClient, LlmError, LlmLevel, LlmResponse, ReasoningError,
};
use serde::Deserialize;
use serde_json::Value;

use crate::mmr::RankedResult;

const MAX_RETRIES: u32 = 3;

#[derive(Debug, Deserialize)]
pub struct SummarizeOutput {
    pub summary: String,
}

#[derive(Debug, Default)]
pub struct SummarizePromptBuilder;

impl SummarizePromptBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build_prompt(&self, query: &str, results: &[RankedResult], max_length: usize) -> String {
        let lines: Vec<String> = results
            .iter()
            .enumerate()
            .map(|(i, r)| format!("[{}] {} — {} ({})", i + 1, r.title, r.description, r.site))
            .collect();

        format!(
            r#"Summarize the following search results in at most {max_length} characters.
Be concise and factual; do not invent information not present in the results.

## Query

{query}

## Results

{}

## Output format

Return JSON: {{"summary": "..."}}"#,
            lines.join("\n")
        )
    }
}

/// Runs the Summarize prompt against the LLM with the same retry-and-repair
/// discipline as every other LLM-calling stage, bounded by `max_length`.
pub struct Summarizer<'a> {
    llm: &'a dyn LlmClient,
    timeout: Duration,
    prompts: SummarizePromptBuilder,
}

impl<'a> Summarizer<'a> {
    pub fn new(llm: &'a dyn LlmClient, timeout: Duration) -> Self {
        Self {
            llm,
            timeout,
            prompts: SummarizePromptBuilder::new(),
        }
    }

    pub async fn summarize(
        &self,
        query: &str,
        results: &[RankedResult],
        max_length: usize,
    ) -> Result<SummarizeOutput, ReasoningError> {
        let prompt = self.prompts.build_prompt(query, results, max_length);

        let mut last_err: Option<ReasoningError> = None;
        for attempt in 0..MAX_RETRIES {
            match self.call_once(&prompt, max_length).await {
                Ok(value) => match serde_json::from_value::<SummarizeOutput>(value) {
                    Ok(out) => return Ok(out),
                    Err(e) => {
                        last_err = Some(ReasoningError::Validation {
                            agent: "summarize".to_string(),
                            attempts: attempt + 1,
                            message: e.to_string(),
                        })
                    }
                },
                Err(e) => last_err = Some(e),
            }

            if attempt + 1 < MAX_RETRIES {
                tokio::time::sleep(Duration::from_secs(2u64.pow(attempt))).await;
            }
        }

        Err(last_err.unwrap_or(ReasoningError::EmptyResponse {
            agent: "summarize".to_string(),
        }))
    }

    async fn call_once(&self, prompt: &str, max_length: usize) -> Result<Value, ReasoningError> {
        let response = tokio::time::timeout(
            self.timeout,
            self.llm.ask(
                prompt,
                &Value::Null,
                LlmLevel::Low,
                self.timeout,
                Some(max_length),
                &Value::Null,
            ),
        )
        .await
        .map_err(|_| ReasoningError::LlmTimeout {
            agent: "summarize".to_string(),
            timeout_secs: self.timeout.as_secs(),
        })?;

        match response {
            Ok(LlmResponse::Json(value)) => {
                if matches!(&value, Value::Object(map) if map.is_empty()) {
                    Err(ReasoningError::EmptyResponse {
                        agent: "summarize".to_string(),
                    })
                } else {
                    Ok(value)
                }
            }
            Ok(LlmResponse::Text(text)) => {
                parse_json_with_repair(&text).ok_or_else(|| ReasoningError::Validation {
                    agent: "summarize".to_string(),
                    attempts: 1,
                    message: "failed to parse or repair JSON response".to_string(),
                })
            }
            Err(LlmError::Timeout) => Err(ReasoningError::LlmTimeout {
                agent: "summarize".to_string(),
                timeout_secs: self.timeout.as_secs(),
            }),
            Err(LlmError::Provider(message)) => Err(ReasoningError::Validation {
                agent: "summarize".to_string(),
                attempts: 1,
                message,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

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
            Ok(LlmResponse::Json(json!({"summary": "a short summary"})))
        }
    }

    #[tokio::test]
    async fn summarize_returns_validated_output() {
        let llm = StubLlm;
        let summarizer = Summarizer::new(&llm, Duration::from_secs(5));
        let results = vec![RankedResult::new("u", "t", "s", 1.0)];
        let out = summarizer.summarize("q", &results, 1024).await.unwrap();
        assert_eq!(out.summary, "a short summary");
    }

    #[test]
    fn prompt_embeds_query_and_bounds_length() {
        let builder = SummarizePromptBuilder::new();
        let results = vec![RankedResult::new("u", "title one", "site.example", 1.0)];
        let prompt = builder.build_prompt("my query", &results, 256);
        assert!(prompt.contains("my query"));
        assert!(prompt.contains("256"));
        assert!(prompt.contains("title one"));
    }
}
