//! Operating mode and per-mode quality gates.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The operating regime for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// High bar, tier <= 2 typical. Any contradiction forces REJECT.
    Strict,
    /// Broad, tier <= 5. Speculation allowed, unverified claims cap at WARN.
    Discovery,
    /// Novelty/temporal-coverage focused. Stale sources force WARN.
    Monitor,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Strict => "strict",
            Mode::Discovery => "discovery",
            Mode::Monitor => "monitor",
        }
    }
}

/// Configuration carried by a single mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeConfig {
    pub max_tier: i32,
    pub required_sections: Vec<String>,
    pub allow_speculation: bool,
    #[serde(default)]
    pub confidence_thresholds: HashMap<String, f32>,
}

/// `mode -> ModeConfig` lookup, the Rust equivalent of
/// `CONFIG.reasoning_mode_configs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeConfigs(pub HashMap<Mode, ModeConfig>);

impl ModeConfigs {
    pub fn get(&self, mode: Mode) -> Option<&ModeConfig> {
        self.0.get(&mode)
    }
}

impl Default for ModeConfigs {
    fn default() -> Self {
        let mut map = HashMap::new();
        map.insert(
            Mode::Strict,
            ModeConfig {
                max_tier: 2,
                required_sections: vec![
                    "summary".to_string(),
                    "analysis".to_string(),
                    "conclusion".to_string(),
                ],
                allow_speculation: false,
                confidence_thresholds: HashMap::new(),
            },
        );
        map.insert(
            Mode::Discovery,
            ModeConfig {
                max_tier: 5,
                required_sections: Vec::new(),
                allow_speculation: true,
                confidence_thresholds: HashMap::new(),
            },
        );
        map.insert(
            Mode::Monitor,
            ModeConfig {
                max_tier: 5,
                required_sections: vec!["summary".to_string()],
                allow_speculation: true,
                confidence_thresholds: HashMap::new(),
            },
        );
        Self(map)
    }
}
