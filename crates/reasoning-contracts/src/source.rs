//! Retrieved source items and their tier enrichment.

use serde::{Deserialize, Serialize};

/// Tier + type classification for a named site, as configured in
/// `reasoning_source_tiers`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierInfo {
    pub tier: i32,
    #[serde(rename = "type")]
    pub source_type: String,
}

/// Sentinel tier for sources with no entry in `reasoning_source_tiers`.
pub const UNKNOWN_TIER: i32 = 999;

/// Tier 6 is reserved for LLM-knowledge / web-reference fallback content.
pub const TIER_6: i32 = 6;

/// The two Tier 6 subtypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier6Source {
    LlmKnowledge,
    WebReference,
}

/// Metadata stamped onto a `SourceItem` by the source-tier filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningMetadata {
    pub tier: i32,
    #[serde(rename = "type")]
    pub source_type: String,
    pub original_source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_warning: Option<String>,
}

/// A retrieved candidate document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceItem {
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub site: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_metadata: Option<ReasoningMetadata>,
}

impl SourceItem {
    pub fn new(url: impl Into<String>, title: impl Into<String>, site: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            description: String::new(),
            site: site.into(),
            reasoning_metadata: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn is_tier_6(&self) -> bool {
        self.reasoning_metadata
            .as_ref()
            .map(|m| m.tier == TIER_6)
            .unwrap_or(false)
    }

    pub fn tier_6_type(&self) -> Option<&str> {
        self.reasoning_metadata.as_ref().and_then(|m| {
            if m.tier == TIER_6 {
                Some(m.source_type.as_str())
            } else {
                None
            }
        })
    }
}

/// Legacy tuple form accepted from older retrieval providers:
/// `(url, schema_json, title, site, vector?)`. The source-tier filter
/// normalizes this into a `SourceItem` before enrichment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacySourceTuple {
    pub url: String,
    pub schema_json: String,
    pub title: String,
    pub site: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector: Option<Vec<f32>>,
}

/// Either representation a retriever may hand back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawSourceItem {
    Structured(SourceItem),
    Legacy(LegacySourceTuple),
}
