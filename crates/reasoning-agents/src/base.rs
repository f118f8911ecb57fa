//! Common LLM interaction pattern shared by every agent: retry logic,
//! timeout handling, and JSON repair on malformed responses.

use std::time::Duration;

use reasoning_contracts::{
    parse_json_with_repair, LlmClient, LlmError, LlmLevel, LlmResponse, PromptResolver,
    ReasoningError,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Base LLM-calling behavior, parameterized per agent by name, timeout, and
/// retry budget. Agents compose this rather than inheriting from it.
pub struct BaseAgent<'a> {
    llm: &'a dyn LlmClient,
    agent_name: String,
    timeout: Duration,
    max_retries: u32,
}

impl<'a> BaseAgent<'a> {
    pub fn new(llm: &'a dyn LlmClient, agent_name: impl Into<String>, timeout: Duration, max_retries: u32) -> Self {
        Self {
            llm,
            agent_name: agent_name.into(),
            timeout,
            max_retries,
        }
    }

    /// Look up a named prompt template, fill it with `vars`, and call the
    /// LLM — returning the raw JSON value without schema validation.
    pub async fn ask(
        &self,
        resolver: &dyn PromptResolver,
        prompt_name: &str,
        site: &str,
        vars: &Value,
        level: LlmLevel,
    ) -> Result<Value, ReasoningError> {
        let template = resolver.find_prompt(prompt_name, site).ok_or_else(|| {
            ReasoningError::Config {
                message: format!("prompt '{prompt_name}' not found"),
            }
        })?;
        let filled = resolver.fill_prompt(&template, vars);
        self.call_raw(&filled, level).await
    }

    /// Call the LLM with a direct prompt string and validate the response
    /// against `T`, retrying on timeout, empty response, or parse/validation
    /// failure with exponential backoff (`2^attempt` seconds). JSON repair is
    /// attempted before the validation failure is counted against the
    /// attempt budget.
    pub async fn call_llm_validated<T: DeserializeOwned>(
        &self,
        prompt: &str,
        level: LlmLevel,
    ) -> Result<T, ReasoningError> {
        let mut last_err: Option<ReasoningError> = None;

        for attempt in 0..self.max_retries {
            tracing::info!(
                agent = %self.agent_name,
                attempt = attempt + 1,
                max = self.max_retries,
                "calling LLM with validation"
            );

            match self.call_raw(prompt, level).await {
                Ok(value) => match serde_json::from_value::<T>(value.clone()) {
                    Ok(validated) => {
                        tracing::info!(agent = %self.agent_name, "response validated");
                        return Ok(validated);
                    }
                    Err(e) => {
                        tracing::error!(agent = %self.agent_name, error = %e, "validation failed");
                        last_err = Some(ReasoningError::Validation {
                            agent: self.agent_name.clone(),
                            attempts: attempt + 1,
                            message: e.to_string(),
                        });
                    }
                },
                Err(ReasoningError::LlmTimeout { agent, timeout_secs }) => {
                    return Err(ReasoningError::LlmTimeout { agent, timeout_secs });
                }
                Err(e) => {
                    last_err = Some(e);
                }
            }

            if attempt + 1 < self.max_retries {
                tokio::time::sleep(Duration::from_secs(2u64.pow(attempt))).await;
            }
        }

        tracing::error!(agent = %self.agent_name, "max retries exceeded");
        Err(last_err.unwrap_or(ReasoningError::EmptyResponse {
            agent: self.agent_name.clone(),
        }))
    }

    async fn call_raw(&self, prompt: &str, level: LlmLevel) -> Result<Value, ReasoningError> {
        let response = tokio::time::timeout(
            self.timeout,
            self.llm.ask(
                prompt,
                &Value::Null,
                level,
                self.timeout,
                Some(16_384),
                &Value::Null,
            ),
        )
        .await
        .map_err(|_| ReasoningError::LlmTimeout {
            agent: self.agent_name.clone(),
            timeout_secs: self.timeout.as_secs(),
        })?;

        match response {
            Ok(LlmResponse::Json(value)) => {
                if matches!(&value, Value::Object(map) if map.is_empty()) {
                    Err(ReasoningError::EmptyResponse {
                        agent: self.agent_name.clone(),
                    })
                } else {
                    Ok(value)
                }
            }
            Ok(LlmResponse::Text(text)) => {
                parse_json_with_repair(&text).ok_or_else(|| ReasoningError::Validation {
                    agent: self.agent_name.clone(),
                    attempts: 1,
                    message: "failed to parse or repair JSON response".to_string(),
                })
            }
            Err(LlmError::Timeout) => Err(ReasoningError::LlmTimeout {
                agent: self.agent_name.clone(),
                timeout_secs: self.timeout.as_secs(),
            }),
            Err(LlmError::Provider(message)) => Err(ReasoningError::Validation {
                agent: self.agent_name.clone(),
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
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakyLlm {
        calls: AtomicU32,
        fail_times: u32,
    }

    #[async_trait]
    impl LlmClient for FlakyLlm {
        async fn ask(
            &self,
            _prompt: &str,
            _schema: &Value,
            _level: LlmLevel,
            _timeout: Duration,
            _max_length: Option<usize>,
            _query_params: &Value,
        ) -> Result<LlmResponse, LlmError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_times {
                Ok(LlmResponse::Json(serde_json::json!({})))
            } else {
                Ok(LlmResponse::Json(serde_json::json!({"value": 42})))
            }
        }
    }

    #[derive(serde::Deserialize, Debug, PartialEq)]
    struct Payload {
        value: u32,
    }

    #[tokio::test]
    async fn retries_until_non_empty_response_then_succeeds() {
        let llm = FlakyLlm {
            calls: AtomicU32::new(0),
            fail_times: 2,
        };
        let agent = BaseAgent::new(&llm, "test-agent", Duration::from_secs(5), 3);
        let result: Payload = agent.call_llm_validated("prompt", LlmLevel::High).await.unwrap();
        assert_eq!(result, Payload { value: 42 });
    }

    #[tokio::test]
    async fn gives_up_after_max_retries_exhausted() {
        let llm = FlakyLlm {
            calls: AtomicU32::new(0),
            fail_times: 10,
        };
        let agent = BaseAgent::new(&llm, "test-agent", Duration::from_secs(5), 2);
        let result: Result<Payload, _> = agent.call_llm_validated("prompt", LlmLevel::High).await;
        assert!(result.is_err());
    }

    struct StubResolver;
    impl PromptResolver for StubResolver {
        fn find_prompt(&self, name: &str, _site: &str) -> Option<String> {
            if name == "known" {
                Some("hello {{name}}".to_string())
            } else {
                None
            }
        }
        fn fill_prompt(&self, template: &str, vars: &Value) -> String {
            let name = vars.get("name").and_then(|v| v.as_str()).unwrap_or("");
            template.replace("{{name}}", name)
        }
    }

    #[tokio::test]
    async fn ask_errors_on_unknown_prompt_name() {
        let llm = FlakyLlm {
            calls: AtomicU32::new(0),
            fail_times: 0,
        };
        let agent = BaseAgent::new(&llm, "test-agent", Duration::from_secs(5), 1);
        let resolver = StubResolver;
        let result = agent
            .ask(&resolver, "missing", "reasoning", &serde_json::json!({}), LlmLevel::Low)
            .await;
        assert!(matches!(result, Err(ReasoningError::Config { .. })));
    }
}
