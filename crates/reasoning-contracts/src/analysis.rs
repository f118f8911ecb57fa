//! Output types for the reasoning-chain graph analyzer.

use serde::{Deserialize, Serialize};

/// Per-node impact and criticality assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeImpactAnalysis {
    pub node_id: String,
    pub affects_count: usize,
    pub affected_node_ids: Vec<String>,
    pub is_critical: bool,
    #[serde(default)]
    pub criticality_reason: Option<String>,
}

/// Complete result of analyzing one argument graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningChainAnalysis {
    pub total_nodes: usize,
    pub max_depth: usize,
    pub topological_order: Vec<String>,
    /// Critical nodes, sorted by `affects_count` descending.
    pub critical_nodes: Vec<NodeImpactAnalysis>,
    pub has_cycles: bool,
    #[serde(default)]
    pub cycle_details: Option<String>,
    pub logic_inconsistencies: usize,
}
