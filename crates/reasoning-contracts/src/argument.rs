//! The Analyst's argument graph and research draft.

use serde::{Deserialize, Serialize};

use crate::source::Tier6Source;

/// A confidence label, carried alongside (and sometimes instead of) a
/// numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Numeric score used when the Analyst/LLM did not supply one
    /// (`confidence_score` is `None`). Mirrors the chain analyzer's
    /// `_infer_score` mapping exactly so the two components never drift.
    pub fn inferred_score(&self) -> f32 {
        match self {
            Confidence::Low => 2.0,
            Confidence::Medium => 5.0,
            Confidence::High => 8.0,
        }
    }
}

/// One atomic claim in the Analyst's reasoning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArgumentNode {
    pub node_id: String,
    pub claim: String,
    pub confidence: Confidence,
    #[serde(default)]
    pub confidence_score: Option<f32>,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub logic_warnings: Vec<String>,
}

impl ArgumentNode {
    /// Resolve the effective numeric confidence: the explicit score when
    /// present, otherwise the label's inferred score.
    pub fn effective_score(&self) -> f32 {
        self.confidence_score
            .unwrap_or_else(|| self.confidence.inferred_score())
    }

    pub fn is_axiom(&self) -> bool {
        self.depends_on.is_empty()
    }
}

/// One entity/relationship triple in an optional knowledge graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeTriple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

/// Entity/relationship triples derived by the Analyst; consumed by the
/// Critic as context only, never structurally validated by this crate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeGraph {
    pub triples: Vec<KnowledgeTriple>,
}

/// An information gap the Analyst chose to resolve using Tier-6 (LLM
/// knowledge or web reference) content rather than a ranked source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapResolution {
    pub gap_description: String,
    pub resolved_by: Tier6Source,
    pub confidence: Confidence,
}

/// The Analyst's full output: draft, argument graph, citation whitelist,
/// and optional knowledge graph / gap resolutions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalystOutput {
    pub draft: String,
    pub argument_graph: Vec<ArgumentNode>,
    #[serde(default)]
    pub knowledge_graph: Option<KnowledgeGraph>,
    /// The authoritative citation whitelist. No downstream agent may cite
    /// an id outside this set.
    pub citations: Vec<i32>,
    #[serde(default)]
    pub gap_resolutions: Option<Vec<GapResolution>>,
}
