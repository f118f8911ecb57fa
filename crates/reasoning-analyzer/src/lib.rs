//! Reasoning-chain graph analytics: cycle detection, topological ordering,
//! downstream-impact propagation, critical-node detection, and the
//! Weakest-Link logic-inflation check.

pub mod chain_analyzer;

pub use chain_analyzer::ReasoningChainAnalyzer;
