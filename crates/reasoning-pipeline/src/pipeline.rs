//! Wires every stage into one query run: Clarification, retrieval,
//! Source-Tier Filter, Analyst, Chain-of-Verification, the Reasoning-Chain
//! Analyzer, Critic, Post-Ranking, and Writer, in that order.

use std::time::Instant;

use chrono::NaiveDate;
use reasoning_agents::{AnalystAgent, ClarificationAgent, CriticAgent, WriterAgent};
use reasoning_analyzer::ReasoningChainAnalyzer;
use reasoning_contracts::{
    AnalystOutput, CriticReview, CriticStatus, LlmClient, Mode, ModeConfigs, PipelineConfig, Questions,
    ReasoningChainAnalysis, ReasoningError, Retriever, RetrievalParams, SourceItem,
    VerificationOutcome, WriterOutput,
};
use reasoning_cov::ChainOfVerificationRunner;
use reasoning_filters::SourceTierFilter;
use reasoning_postranking::{GenerateMode, PostRanking, RankedResult, SummarizeOutput};
use reasoning_prompts::CoVPromptBuilder;

use crate::ambiguity::detect_time_ambiguity;
use crate::query_log::QueryLog;

/// One query's worth of input to the pipeline.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub query_id: String,
    pub query: String,
    pub mode: Mode,
    pub today: NaiveDate,
    pub retrieval_params: RetrievalParams,
    /// Set once the caller already resolved a clarification round (or the
    /// caller's surface has no clarification UI at all).
    pub skip_clarification: bool,
    /// When set and `reasoning_params.features.plan_and_write` is enabled,
    /// the Writer runs its plan-then-compose path.
    pub target_length: Option<u32>,
    pub generate_mode: GenerateMode,
}

impl QueryRequest {
    pub fn new(query_id: impl Into<String>, query: impl Into<String>, mode: Mode, today: NaiveDate) -> Self {
        Self {
            query_id: query_id.into(),
            query: query.into(),
            mode,
            today,
            retrieval_params: RetrievalParams::default(),
            skip_clarification: false,
            target_length: None,
            generate_mode: GenerateMode::None,
        }
    }
}

/// A run either stops to ask the user a clarifying question, or completes.
pub enum PipelineOutcome {
    NeedsClarification { questions: Questions, query_log: QueryLog },
    Completed(Box<PipelineResult>),
}

pub struct PipelineResult {
    pub analyst: AnalystOutput,
    pub cov: Option<VerificationOutcome>,
    pub chain_analysis: ReasoningChainAnalysis,
    pub critic: CriticReview,
    pub writer: WriterOutput,
    pub summary: Option<SummarizeOutput>,
    pub query_log: QueryLog,
}

/// Orchestrates one query end to end. Owns no mutable state across calls;
/// every [`Self::run`] is an independent pass over a shared, read-only
/// [`PipelineConfig`] and the two external ports (`llm`, `retriever`).
pub struct ReasoningPipeline<'a> {
    llm: &'a dyn LlmClient,
    retriever: &'a dyn Retriever,
    config: PipelineConfig,
    tier_filter: SourceTierFilter,
}

impl<'a> ReasoningPipeline<'a> {
    pub fn new(llm: &'a dyn LlmClient, retriever: &'a dyn Retriever, config: PipelineConfig) -> Self {
        let tier_filter = SourceTierFilter::new(config.source_tiers.clone());
        Self {
            llm,
            retriever,
            config,
            tier_filter,
        }
    }

    pub async fn run(&self, request: QueryRequest) -> Result<PipelineOutcome, ReasoningError> {
        let mut log = QueryLog::new(request.query_id.clone(), request.mode);

        if !request.skip_clarification {
            let t0 = Instant::now();
            let clarifier = ClarificationAgent::new(self.llm, self.config.timeouts.clarification());
            let has_time_ambiguity = detect_time_ambiguity(&request.query);
            let questions = clarifier
                .generate_options(&request.query, has_time_ambiguity, request.today)
                .await;
            log.record_stage("clarification", t0.elapsed());
            if !questions.is_empty() {
                return Ok(PipelineOutcome::NeedsClarification { questions, query_log: log });
            }
        }

        let t0 = Instant::now();
        let raw_items = self
            .retriever
            .retrieve(&request.query, &request.retrieval_params)
            .await
            .map_err(|e| ReasoningError::Config {
                message: format!("retrieval failed: {e}"),
            })?;
        log.record_stage("retrieval", t0.elapsed());

        let t0 = Instant::now();
        let sources = self
            .tier_filter
            .filter_and_enrich(raw_items, request.mode, &self.config.mode_configs)?;
        log.record_stage("source_filter", t0.elapsed());
        log.fallback_used = sources.iter().any(|s| {
            s.reasoning_metadata
                .as_ref()
                .and_then(|m| m.fallback_warning.as_ref())
                .is_some()
        });

        let t0 = Instant::now();
        let analyst = AnalystAgent::new(self.llm, self.config.timeouts.analyst());
        let analyst_output = analyst.analyze(&request.query, request.mode, &sources).await?;
        log.record_stage("analyst", t0.elapsed());

        let t0 = Instant::now();
        let cov_outcome = self.run_cov(&analyst_output.draft, &sources).await?;
        log.record_stage("cov", t0.elapsed());
        if let Some(outcome) = &cov_outcome {
            log.cov_verified_count = Some(outcome.verified_count);
            log.cov_unverified_count = Some(outcome.unverified_count);
            log.cov_contradicted_count = Some(outcome.contradicted_count);
        }

        let t0 = Instant::now();
        let preliminary_analysis =
            ReasoningChainAnalyzer::new(analyst_output.argument_graph.clone(), Vec::new()).analyze();
        log.record_stage("chain_analysis_pre", t0.elapsed());

        let cov_prompts = CoVPromptBuilder::new();
        let cov_summary_block = cov_outcome
            .as_ref()
            .map(|o| cov_prompts.build_verification_summary_for_critic(o));
        let chain_summary_block = build_chain_summary(&preliminary_analysis);
        let critic_context = match &cov_summary_block {
            Some(cov_block) => format!("{chain_summary_block}\n\n{cov_block}"),
            None => chain_summary_block,
        };

        let t0 = Instant::now();
        let mut critic_review = self.run_critic(&request, &analyst_output, &critic_context).await?;
        log.record_stage("critic", t0.elapsed());

        apply_mode_specific_rules(
            request.mode,
            &cov_outcome,
            &analyst_output.draft,
            &self.config.mode_configs,
            &mut critic_review,
        );
        log.critic_status = Some(critic_review.status);

        let t0 = Instant::now();
        let chain_analysis = ReasoningChainAnalyzer::new(
            analyst_output.argument_graph.clone(),
            critic_review.structured_weaknesses.clone(),
        )
        .analyze();
        log.record_stage("chain_analysis_final", t0.elapsed());
        log.critical_nodes = chain_analysis.critical_nodes.len();
        log.has_cycles = chain_analysis.has_cycles;
        log.logic_inconsistencies = chain_analysis.logic_inconsistencies;

        let t0 = Instant::now();
        let summary = self
            .run_post_ranking(&request, &sources, &critic_review)
            .await?;
        log.record_stage("post_ranking", t0.elapsed());

        let t0 = Instant::now();
        let writer_output = self
            .run_writer(&request, &analyst_output, &critic_review, &mut log)
            .await?;
        log.record_stage("writer", t0.elapsed());
        log.final_confidence = Some(format!("{:?}", writer_output.confidence_level));

        log.emit();

        Ok(PipelineOutcome::Completed(Box::new(PipelineResult {
            analyst: analyst_output,
            cov: cov_outcome,
            chain_analysis,
            critic: critic_review,
            writer: writer_output,
            summary,
            query_log: log,
        })))
    }

    /// CoV is an optional, recoverable stage: a timeout or malformed
    /// response degrades to "no verification ran" rather than failing the
    /// whole query, since the Critic and Writer can still proceed on the
    /// draft alone.
    async fn run_cov(
        &self,
        draft: &str,
        sources: &[SourceItem],
    ) -> Result<Option<VerificationOutcome>, ReasoningError> {
        if !self.config.reasoning_params.features.cov_enabled {
            return Ok(None);
        }

        let cov = ChainOfVerificationRunner::new(self.llm, self.config.timeouts.cov());
        match cov.verify_draft(draft, sources).await {
            Ok(outcome) => Ok(Some(outcome)),
            Err(e) if e.is_recoverable() => {
                tracing::warn!(error = %e, "chain-of-verification degraded, continuing without it");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// The Critic is also recoverable: on a recoverable failure the query
    /// proceeds with a synthetic WARN review rather than aborting, since a
    /// draft that already passed the Analyst is still usable at reduced
    /// confidence.
    async fn run_critic(
        &self,
        request: &QueryRequest,
        analyst_output: &AnalystOutput,
        critic_context: &str,
    ) -> Result<CriticReview, ReasoningError> {
        let critic = CriticAgent::new(self.llm, self.config.timeouts.critic());
        match critic
            .review(
                &analyst_output.draft,
                &request.query,
                request.mode,
                Some(&analyst_output.argument_graph),
                analyst_output.knowledge_graph.as_ref(),
                analyst_output.gap_resolutions.as_deref(),
                self.config.reasoning_params.features.structured_critique,
                self.config.reasoning_params.critique_thresholds.critical_weakness_count,
                Some(critic_context),
            )
            .await
        {
            Ok(review) => Ok(review),
            Err(e) if e.is_recoverable() => {
                tracing::warn!(error = %e, "critic stage degraded, defaulting to WARN");
                Ok(degraded_critic_review(&e))
            }
            Err(e) => Err(e),
        }
    }

    /// MMR re-ranking plus a bounded summary, run after the Critic and
    /// before the Writer so a caller wanting a short answer doesn't have to
    /// wait on the full composed report. No-op unless the request asked for
    /// `GenerateMode::Summarize`.
    async fn run_post_ranking(
        &self,
        request: &QueryRequest,
        sources: &[SourceItem],
        critic_review: &CriticReview,
    ) -> Result<Option<SummarizeOutput>, ReasoningError> {
        if request.generate_mode != GenerateMode::Summarize || critic_review.status == CriticStatus::Reject {
            return Ok(None);
        }

        let ranked = build_ranked_results(sources);
        let post_ranking = PostRanking::new(self.llm, self.config.timeouts.critic());
        post_ranking
            .run(
                GenerateMode::Summarize,
                &request.query,
                &request.query_id,
                ranked,
                &self.config.mmr_params,
                512,
            )
            .await
    }

    /// Plan-and-write (when enabled and a target length was given) then
    /// compose, retrying a handful of times when the Writer cites outside
    /// the Analyst's whitelist. The Writer is not recoverable past this
    /// retry budget: a persistent violation fails the query.
    async fn run_writer(
        &self,
        request: &QueryRequest,
        analyst_output: &AnalystOutput,
        critic_review: &CriticReview,
        log: &mut QueryLog,
    ) -> Result<WriterOutput, ReasoningError> {
        let writer = WriterAgent::new(self.llm, self.config.timeouts.writer());

        let plan = if self.config.reasoning_params.features.plan_and_write {
            match request.target_length {
                Some(target_length) => Some(
                    writer
                        .plan(&analyst_output.draft, critic_review, &request.query, target_length)
                        .await?,
                ),
                None => None,
            }
        } else {
            None
        };

        let mut last_err: Option<ReasoningError> = None;
        for attempt in 0..self.config.max_retries.max(1) {
            if attempt > 0 {
                log.retry_count += 1;
            }
            match writer
                .compose(
                    &analyst_output.draft,
                    critic_review,
                    &analyst_output.citations,
                    request.mode,
                    &request.query,
                    plan.as_ref(),
                )
                .await
            {
                Ok(output) => return Ok(output),
                Err(ReasoningError::WhitelistViolation { invalid_ids }) => {
                    tracing::warn!(?invalid_ids, attempt, "writer cited ids outside whitelist, retrying");
                    last_err = Some(ReasoningError::WhitelistViolation { invalid_ids });
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_err.unwrap_or(ReasoningError::EmptyResponse {
            agent: "writer".to_string(),
        }))
    }
}

fn build_chain_summary(analysis: &ReasoningChainAnalysis) -> String {
    let cycle_line = if analysis.has_cycles {
        format!(
            "cycle detected: {}",
            analysis.cycle_details.clone().unwrap_or_default()
        )
    } else {
        "no cycles detected".to_string()
    };
    format!(
        "## Reasoning-chain analysis\n\n- nodes: {}\n- max depth: {}\n- {cycle_line}\n- logic inconsistencies: {}",
        analysis.total_nodes, analysis.max_depth, analysis.logic_inconsistencies
    )
}

fn degraded_critic_review(err: &ReasoningError) -> CriticReview {
    CriticReview {
        status: CriticStatus::Warn,
        critique: format!(
            "Critic stage degraded after a recoverable error ({err}); proceeding at reduced confidence."
        ),
        suggestions: Vec::new(),
        mode_compliance: false,
        logical_gaps: Vec::new(),
        source_issues: Vec::new(),
        structured_weaknesses: Vec::new(),
    }
}

/// Mode-specific deterministic overrides that the Critic's own prompt
/// cannot be trusted to apply consistently: strict mode forces REJECT on
/// any contradicted claim, and separately on any missing `required_sections`
/// from the mode config; discovery mode never lets an uncontradicted REJECT
/// stand, downgrading it to WARN. Monitor mode's staleness rule is not
/// modeled here: `SourceItem` carries no publish timestamp to check it
/// against.
fn apply_mode_specific_rules(
    mode: Mode,
    cov: &Option<VerificationOutcome>,
    draft: &str,
    mode_configs: &ModeConfigs,
    review: &mut CriticReview,
) {
    match mode {
        Mode::Strict => {
            let contradicted = cov.as_ref().map(|o| o.has_contradictions()).unwrap_or(false);
            if contradicted && review.status != CriticStatus::Reject {
                tracing::warn!("strict mode: contradicted claim forces REJECT");
                review.status = CriticStatus::Reject;
                review.critique =
                    format!("{}\n\n[strict mode: contradicted claim forces REJECT]", review.critique);
            }

            let missing = missing_required_sections(draft, mode_configs, mode);
            if !missing.is_empty() && review.status != CriticStatus::Reject {
                tracing::warn!(?missing, "strict mode: missing required sections force REJECT");
                review.status = CriticStatus::Reject;
                review.critique = format!(
                    "{}\n\n[strict mode: missing required section(s): {}]",
                    review.critique,
                    missing.join(", ")
                );
            }
        }
        Mode::Discovery => {
            let contradicted = cov.as_ref().map(|o| o.has_contradictions()).unwrap_or(false);
            if review.status == CriticStatus::Reject && !contradicted {
                tracing::info!("discovery mode: downgrading REJECT to WARN absent contradictions");
                review.status = CriticStatus::Warn;
            }
        }
        Mode::Monitor => {}
    }
}

/// Required sections are matched as case-insensitive substrings of the
/// draft, since the Analyst writes markdown headings (`## Summary`) rather
/// than a structured section list the Critic could check field-by-field.
fn missing_required_sections(draft: &str, mode_configs: &ModeConfigs, mode: Mode) -> Vec<String> {
    let draft_lower = draft.to_lowercase();
    mode_configs
        .get(mode)
        .map(|config| {
            config
                .required_sections
                .iter()
                .filter(|section| !draft_lower.contains(&section.to_lowercase()))
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

/// Builds the post-ranking input from the enriched source list. Relevance
/// falls off with tier-filtered order since this crate has no retrieval
/// score of its own; vectors are left unset; `apply_mmr_reranking` treats
/// that as its own "no vectors available" skip condition.
fn build_ranked_results(sources: &[SourceItem]) -> Vec<RankedResult> {
    sources
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let relevance = 1.0 / (i as f32 + 1.0);
            let mut result = RankedResult::new(s.url.clone(), s.title.clone(), s.site.clone(), relevance);
            result.description = s.description.clone();
            result
        })
        .collect()
}
