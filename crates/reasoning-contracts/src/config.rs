//! The configuration surface the reasoning core consumes (§6 of
//! SPEC_FULL.md). Scoped to this crate's concerns only — no secrets, TLS,
//! or DB pool settings, which belong to the surrounding application.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::mode::ModeConfigs;
use crate::source::TierInfo;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturesConfig {
    #[serde(default)]
    pub structured_critique: bool,
    #[serde(default = "default_true")]
    pub cov_enabled: bool,
    #[serde(default)]
    pub plan_and_write: bool,
}

fn default_true() -> bool {
    true
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            structured_critique: true,
            cov_enabled: true,
            plan_and_write: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CritiqueThresholds {
    pub critical_weakness_count: u32,
}

impl Default for CritiqueThresholds {
    fn default() -> Self {
        Self {
            critical_weakness_count: 2,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReasoningParams {
    #[serde(default)]
    pub features: FeaturesConfig,
    #[serde(default)]
    pub critique_thresholds: CritiqueThresholds,
}

/// MMR post-ranking parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MmrParams {
    pub enabled: bool,
    pub lambda: f32,
    pub threshold: usize,
}

impl Default for MmrParams {
    fn default() -> Self {
        Self {
            enabled: true,
            lambda: 0.7,
            threshold: 3,
        }
    }
}

/// Per-agent LLM call timeouts, in seconds. Defaults match the values in
/// SPEC_FULL.md §5 (doubled from the original repo's pre-GPT-5.1 values,
/// per its own in-code comments).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentTimeouts {
    pub clarification_secs: u64,
    pub analyst_secs: u64,
    pub critic_secs: u64,
    pub writer_secs: u64,
    pub cov_secs: u64,
}

impl Default for AgentTimeouts {
    fn default() -> Self {
        Self {
            clarification_secs: 30,
            analyst_secs: 120,
            critic_secs: 60,
            writer_secs: 45,
            cov_secs: 60,
        }
    }
}

impl AgentTimeouts {
    pub fn clarification(&self) -> Duration {
        Duration::from_secs(self.clarification_secs)
    }
    pub fn analyst(&self) -> Duration {
        Duration::from_secs(self.analyst_secs)
    }
    pub fn critic(&self) -> Duration {
        Duration::from_secs(self.critic_secs)
    }
    pub fn writer(&self) -> Duration {
        Duration::from_secs(self.writer_secs)
    }
    pub fn cov(&self) -> Duration {
        Duration::from_secs(self.cov_secs)
    }
}

/// The full configuration surface for the reasoning pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub mode_configs: ModeConfigs,
    #[serde(default)]
    pub source_tiers: HashMap<String, TierInfo>,
    #[serde(default)]
    pub reasoning_params: ReasoningParams,
    #[serde(default)]
    pub mmr_params: MmrParams,
    #[serde(default)]
    pub timeouts: AgentTimeouts,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_max_retries() -> u32 {
    3
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mode_configs: ModeConfigs::default(),
            source_tiers: HashMap::new(),
            reasoning_params: ReasoningParams::default(),
            mmr_params: MmrParams::default(),
            timeouts: AgentTimeouts::default(),
            max_retries: 3,
        }
    }
}

impl PipelineConfig {
    /// Load a `PipelineConfig` from a TOML file, layered over defaults for
    /// any key the file omits. Follows `agent-agency-config`'s
    /// layered-loader convention at a scope appropriate to this crate.
    pub fn from_toml_str(contents: &str) -> Result<Self, crate::error::ReasoningError> {
        toml::from_str(contents).map_err(|e| crate::error::ReasoningError::Config {
            message: format!("failed to parse pipeline config: {e}"),
        })
    }
}
