//! Source-tier hard filter for the reasoning pipeline.
//!
//! Sits between retrieval and the Analyst: drops sources below the
//! authority bar for the active mode and stamps survivors with tier
//! metadata the downstream agents and prompts depend on.

pub mod source_tier;

pub use source_tier::SourceTierFilter;
