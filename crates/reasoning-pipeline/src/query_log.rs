//! Per-query structured log, emitted as a single `tracing` event at the end
//! of a pipeline run — the idiomatic replacement for `get_query_logger()`.

use std::time::Duration;

use reasoning_contracts::{CriticStatus, Mode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageTiming {
    pub stage: String,
    pub duration_ms: u64,
}

/// Accumulates the fields SPEC_FULL.md §6 lists as the per-query
/// observable artifact, then emits them as one structured `tracing` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryLog {
    pub query_id: String,
    pub mode: Mode,
    pub stage_timings: Vec<StageTiming>,
    pub retry_count: u32,
    pub fallback_used: bool,
    pub cov_verified_count: Option<usize>,
    pub cov_unverified_count: Option<usize>,
    pub cov_contradicted_count: Option<usize>,
    pub critic_status: Option<CriticStatus>,
    pub critical_nodes: usize,
    pub has_cycles: bool,
    pub logic_inconsistencies: usize,
    pub final_confidence: Option<String>,
}

impl QueryLog {
    pub fn new(query_id: impl Into<String>, mode: Mode) -> Self {
        Self {
            query_id: query_id.into(),
            mode,
            stage_timings: Vec::new(),
            retry_count: 0,
            fallback_used: false,
            cov_verified_count: None,
            cov_unverified_count: None,
            cov_contradicted_count: None,
            critic_status: None,
            critical_nodes: 0,
            has_cycles: false,
            logic_inconsistencies: 0,
            final_confidence: None,
        }
    }

    pub fn record_stage(&mut self, stage: &str, duration: Duration) {
        self.stage_timings.push(StageTiming {
            stage: stage.to_string(),
            duration_ms: duration.as_millis() as u64,
        });
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.stage_timings.iter().map(|t| t.duration_ms).sum()
    }

    /// Emits the full log as one structured `tracing::info!` event. Called
    /// once, at the end of [`crate::pipeline::ReasoningPipeline::run`].
    pub fn emit(&self) {
        tracing::info!(
            query_id = %self.query_id,
            mode = %self.mode,
            total_duration_ms = self.total_duration_ms(),
            retry_count = self.retry_count,
            fallback_used = self.fallback_used,
            cov_verified_count = ?self.cov_verified_count,
            cov_unverified_count = ?self.cov_unverified_count,
            cov_contradicted_count = ?self.cov_contradicted_count,
            critic_status = ?self.critic_status,
            critical_nodes = self.critical_nodes,
            has_cycles = self.has_cycles,
            logic_inconsistencies = self.logic_inconsistencies,
            final_confidence = ?self.final_confidence,
            "reasoning pipeline query completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_duration_sums_recorded_stages() {
        let mut log = QueryLog::new("q1", Mode::Strict);
        log.record_stage("analyst", Duration::from_millis(120));
        log.record_stage("critic", Duration::from_millis(80));
        assert_eq!(log.total_duration_ms(), 200);
        assert_eq!(log.stage_timings.len(), 2);
    }
}
