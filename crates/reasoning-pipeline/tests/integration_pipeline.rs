//! End-to-end scenarios over [`ReasoningPipeline::run`], stubbing the LLM
//! and retrieval ports the way the per-crate unit tests stub [`LlmClient`].

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reasoning_contracts::{
    LlmClient, LlmError, LlmLevel, LlmResponse, Mode, PipelineConfig, RawSourceItem,
    RetrievalError, RetrievalParams, Retriever, SourceItem, TierInfo,
};
use reasoning_pipeline::{PipelineOutcome, QueryRequest, ReasoningPipeline};
use serde_json::{json, Value};

struct ScriptedLlm {
    contradicted: bool,
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn ask(
        &self,
        prompt: &str,
        _schema: &Value,
        _level: LlmLevel,
        _timeout: Duration,
        _max_length: Option<usize>,
        _query_params: &Value,
    ) -> Result<LlmResponse, LlmError> {
        if prompt.contains("查詢歧義分析助手") {
            // No ambiguity detected: empty questions list short-circuits clarification.
            return Ok(LlmResponse::Json(json!({ "questions": [] })));
        }

        if prompt.contains("## User query") {
            return Ok(LlmResponse::Json(json!({
                "draft": "## Summary\n台積電 2024 年第三季營收創新高。\n\n## Analysis\n主要受惠於先進製程需求。[1]\n\n## Conclusion\n展望第四季持續成長。",
                "argument_graph": [
                    {
                        "node_id": "n1",
                        "claim": "台積電 2024 年第三季營收創新高",
                        "confidence": "high",
                        "confidence_score": 8.0,
                        "depends_on": []
                    }
                ],
                "knowledge_graph": null,
                "citations": [1],
                "gap_resolutions": null
            })));
        }

        if prompt.contains("事實宣稱提取器") {
            return Ok(LlmResponse::Json(json!({
                "claims": [
                    {
                        "claim": "台積電 2024 年第三季營收創新高",
                        "claim_type": "statistic",
                        "source_reference": 1,
                        "context": "受惠於先進製程需求"
                    }
                ],
                "extraction_notes": "共提取 1 個可驗證宣稱"
            })));
        }

        if prompt.contains("事實驗證器") {
            let status = if self.contradicted { "contradicted" } else { "verified" };
            return Ok(LlmResponse::Json(json!({
                "results": [
                    {
                        "claim": "台積電 2024 年第三季營收創新高",
                        "status": status,
                        "evidence": "official filing",
                        "source_id": 1,
                        "explanation": "matches cited source",
                        "confidence": "high"
                    }
                ]
            })));
        }

        if prompt.contains("fact-checking and quality-review editor") {
            return Ok(LlmResponse::Json(json!({
                "status": "APPROVE",
                "critique": "well supported",
                "suggestions": [],
                "mode_compliance": true,
                "logical_gaps": [],
                "source_issues": [],
                "structured_weaknesses": []
            })));
        }

        if prompt.contains("你是報告撰寫專家") {
            return Ok(LlmResponse::Json(json!({
                "final_report": "# 台積電 2024 Q3 營收分析\n\n台積電第三季營收創新高 [1]。",
                "sources_used": [1],
                "confidence_level": "High",
                "methodology_note": "based on a single cited filing"
            })));
        }

        panic!("unexpected prompt in test stub: {prompt}");
    }
}

struct StubRetriever;

#[async_trait]
impl Retriever for StubRetriever {
    async fn retrieve(&self, _query: &str, _params: &RetrievalParams) -> Result<Vec<RawSourceItem>, RetrievalError> {
        Ok(vec![RawSourceItem::Structured(
            SourceItem::new("https://www.gov.tw/tsmc-q3", "TSMC Q3 filing", "gov.tw")
                .with_description("official quarterly filing"),
        )])
    }
}

fn strict_config() -> PipelineConfig {
    let mut config = PipelineConfig::default();
    let mut tiers = HashMap::new();
    tiers.insert(
        "gov.tw".to_string(),
        TierInfo {
            tier: 1,
            source_type: "government".to_string(),
        },
    );
    config.source_tiers = tiers;
    config
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 7, 27).unwrap()
}

#[tokio::test]
async fn strict_legal_query_approves_a_well_supported_draft() {
    let llm = ScriptedLlm { contradicted: false };
    let retriever = StubRetriever;
    let config = strict_config();
    let pipeline = ReasoningPipeline::new(&llm, &retriever, config);

    let mut request = QueryRequest::new("q1", "台積電 2024 年第三季營收", Mode::Strict, today());
    request.skip_clarification = true;

    let outcome = pipeline.run(request).await.unwrap();
    match outcome {
        PipelineOutcome::Completed(result) => {
            assert_eq!(result.critic.status, reasoning_contracts::CriticStatus::Approve);
            assert_eq!(result.writer.sources_used, vec![1]);
            assert!(!result.chain_analysis.has_cycles);
            let cov = result.cov.expect("cov should have run");
            assert_eq!(cov.contradicted_count, 0);
        }
        PipelineOutcome::NeedsClarification { .. } => panic!("did not expect a clarification round"),
    }
}

#[tokio::test]
async fn strict_mode_forces_reject_when_a_claim_is_contradicted() {
    let llm = ScriptedLlm { contradicted: true };
    let retriever = StubRetriever;
    let config = strict_config();
    let pipeline = ReasoningPipeline::new(&llm, &retriever, config);

    let mut request = QueryRequest::new("q2", "台積電 2024 年第三季營收", Mode::Strict, today());
    request.skip_clarification = true;

    let outcome = pipeline.run(request).await.unwrap();
    match outcome {
        PipelineOutcome::Completed(result) => {
            assert_eq!(result.critic.status, reasoning_contracts::CriticStatus::Reject);
            let cov = result.cov.expect("cov should have run");
            assert!(cov.has_contradictions());
            assert_eq!(result.writer.confidence_level, reasoning_contracts::ConfidenceLevel::Low);
        }
        PipelineOutcome::NeedsClarification { .. } => panic!("did not expect a clarification round"),
    }
}
