//! Clarification agent: detects query ambiguity and proposes selectable
//! options across the time/scope/entity dimensions, falling back to a
//! fixed time-range menu when the LLM call fails validation.

use std::time::Duration;

use chrono::NaiveDate;
use reasoning_contracts::{
    ClarificationOption, ClarificationType, LlmClient, LlmLevel, Question, Questions, TimeRange,
};
use reasoning_prompts::ClarificationPromptBuilder;
use serde::Deserialize;

use crate::base::BaseAgent;

#[derive(Debug, Deserialize)]
struct QuestionsResponse {
    questions: Questions,
}

pub struct ClarificationAgent<'a> {
    base: BaseAgent<'a>,
    prompts: ClarificationPromptBuilder,
}

impl<'a> ClarificationAgent<'a> {
    pub fn new(llm: &'a dyn LlmClient, timeout: Duration) -> Self {
        Self {
            base: BaseAgent::new(llm, "clarification", timeout, 3),
            prompts: ClarificationPromptBuilder::new(),
        }
    }

    /// Detects ambiguity and returns the questions to ask the user. An
    /// empty vec means no clarification is needed. On LLM failure, falls
    /// back to a fixed time-range menu rather than surfacing the error,
    /// since clarification is advisory and should never block the pipeline.
    pub async fn generate_options(
        &self,
        query: &str,
        has_time_ambiguity: bool,
        today: NaiveDate,
    ) -> Questions {
        let prompt = self.prompts.build_prompt(query, has_time_ambiguity, today);

        match self
            .base
            .call_llm_validated::<QuestionsResponse>(&prompt, LlmLevel::Low)
            .await
        {
            Ok(response) => response.questions,
            Err(e) => {
                tracing::warn!(error = %e, "clarification generation failed, using fallback options");
                fallback_questions(today)
            }
        }
    }
}

/// Mirrors the original's fixed fallback: "recent month" / "recent year" /
/// "all time", each bound to a concrete end date.
fn fallback_questions(today: NaiveDate) -> Questions {
    vec![Question {
        clarification_type: ClarificationType::Time,
        question: "請選擇你想了解的時間範圍：".to_string(),
        required: true,
        options: vec![
            ClarificationOption {
                label: "最近一個月".to_string(),
                intent: "recent_month".to_string(),
                query_modifier: Some(String::new()),
                time_range: Some(TimeRange {
                    start: None,
                    end: Some(today),
                }),
                is_comprehensive: false,
            },
            ClarificationOption {
                label: "最近一年".to_string(),
                intent: "recent_year".to_string(),
                query_modifier: Some(String::new()),
                time_range: Some(TimeRange {
                    start: None,
                    end: Some(today),
                }),
                is_comprehensive: false,
            },
            ClarificationOption::comprehensive("不限時間", "all_time"),
        ],
    }]
}
