//! Chain-of-Verification orchestration: extract claims from a draft, then
//! verify each against the formatted source set. Unlike Clarification,
//! Analyst, Critic, and Writer, CoV has no dedicated agent wrapper upstream
//! — it is invoked directly against the LLM port with its own small retry
//! loop rather than going through the shared base-agent machinery.

use std::time::Duration;

use reasoning_contracts::{
    parse_json_with_repair, Claim, ClaimsList, LlmClient, LlmError, LlmLevel, LlmResponse,
    ReasoningError, SourceItem, VerificationOutcome, VerificationResult,
};
use reasoning_prompts::CoVPromptBuilder;

/// How many times a malformed LLM response is retried before the stage
/// gives up, mirroring the agents' default `max_retries`.
const MAX_RETRIES: u32 = 3;

pub struct ChainOfVerificationRunner<'a> {
    llm: &'a dyn LlmClient,
    timeout: Duration,
    prompts: CoVPromptBuilder,
}

impl<'a> ChainOfVerificationRunner<'a> {
    pub fn new(llm: &'a dyn LlmClient, timeout: Duration) -> Self {
        Self {
            llm,
            timeout,
            prompts: CoVPromptBuilder::new(),
        }
    }

    /// Run the full two-stage protocol. A draft with no extractable claims
    /// is not an error: it yields a `VerificationOutcome` with all counts
    /// zero per the documented boundary behavior.
    pub async fn verify_draft(
        &self,
        draft: &str,
        sources: &[SourceItem],
    ) -> Result<VerificationOutcome, ReasoningError> {
        let claims = self.extract_claims(draft).await?;
        if claims.claims.is_empty() {
            return Ok(VerificationOutcome::from_results(Vec::new()));
        }

        let formatted_context = format_sources_for_verification(sources);
        let results = self.verify_claims(&claims.claims, &formatted_context).await?;
        Ok(VerificationOutcome::from_results(results))
    }

    async fn extract_claims(&self, draft: &str) -> Result<ClaimsList, ReasoningError> {
        let prompt = self.prompts.build_claim_extraction_prompt(draft);
        let value = self
            .call_with_retry("cov.extract_claims", &prompt)
            .await?;
        serde_json::from_value(value).map_err(|e| ReasoningError::Validation {
            agent: "cov.extract_claims".to_string(),
            attempts: MAX_RETRIES,
            message: e.to_string(),
        })
    }

    async fn verify_claims(
        &self,
        claims: &[Claim],
        formatted_context: &str,
    ) -> Result<Vec<VerificationResult>, ReasoningError> {
        let prompt = self
            .prompts
            .build_claim_verification_prompt(claims, formatted_context);
        let value = self
            .call_with_retry("cov.verify_claims", &prompt)
            .await?;

        #[derive(serde::Deserialize)]
        struct VerificationPayload {
            results: Vec<VerificationResult>,
        }
        let payload: VerificationPayload =
            serde_json::from_value(value).map_err(|e| ReasoningError::Validation {
                agent: "cov.verify_claims".to_string(),
                attempts: MAX_RETRIES,
                message: e.to_string(),
            })?;
        Ok(payload.results)
    }

    async fn call_with_retry(
        &self,
        stage: &str,
        prompt: &str,
    ) -> Result<serde_json::Value, ReasoningError> {
        let mut last_err: Option<ReasoningError> = None;

        for attempt in 0..MAX_RETRIES {
            let response = tokio::time::timeout(
                self.timeout,
                self.llm.ask(
                    prompt,
                    &serde_json::Value::Null,
                    LlmLevel::High,
                    self.timeout,
                    Some(16_384),
                    &serde_json::Value::Null,
                ),
            )
            .await
            .map_err(|_| ReasoningError::LlmTimeout {
                agent: stage.to_string(),
                timeout_secs: self.timeout.as_secs(),
            })?;

            match response {
                Ok(LlmResponse::Json(value)) if !value_is_empty_object(&value) => {
                    return Ok(value);
                }
                Ok(LlmResponse::Json(_)) => {
                    last_err = Some(ReasoningError::EmptyResponse {
                        agent: stage.to_string(),
                    });
                }
                Ok(LlmResponse::Text(text)) => match parse_json_with_repair(&text) {
                    Some(value) => return Ok(value),
                    None => {
                        last_err = Some(ReasoningError::Validation {
                            agent: stage.to_string(),
                            attempts: attempt + 1,
                            message: "failed to parse or repair JSON response".to_string(),
                        });
                    }
                },
                Err(LlmError::Timeout) => {
                    return Err(ReasoningError::LlmTimeout {
                        agent: stage.to_string(),
                        timeout_secs: self.timeout.as_secs(),
                    });
                }
                Err(LlmError::Provider(message)) => {
                    last_err = Some(ReasoningError::Validation {
                        agent: stage.to_string(),
                        attempts: attempt + 1,
                        message,
                    });
                }
            }

            if attempt + 1 < MAX_RETRIES {
                tracing::warn!(stage, attempt, "retrying after malformed CoV response");
                tokio::time::sleep(Duration::from_secs(2u64.pow(attempt))).await;
            }
        }

        Err(last_err.unwrap_or(ReasoningError::EmptyResponse {
            agent: stage.to_string(),
        }))
    }
}

fn value_is_empty_object(value: &serde_json::Value) -> bool {
    matches!(value, serde_json::Value::Object(map) if map.is_empty())
}

/// Format the citation-marked source context the verification prompt
/// matches claims against: `[N] title — description (site)`.
pub fn format_sources_for_verification(sources: &[SourceItem]) -> String {
    sources
        .iter()
        .enumerate()
        .map(|(i, s)| format!("[{}] {} — {} ({})", i + 1, s.title, s.description, s.site))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Applies the Critic-escalation guidance literally: any contradiction
/// suggests REJECT, three or more unverified claims suggest WARN.
pub fn escalation_hint(outcome: &VerificationOutcome) -> Option<&'static str> {
    if outcome.has_contradictions() {
        Some("reject")
    } else if outcome.suggests_warn() {
        Some("warn")
    } else {
        None
    }
}
