//! Chain-of-Verification: claim extraction and source verification, run
//! directly against the LLM port ahead of the Critic stage.

pub mod verifier;

pub use verifier::{escalation_hint, format_sources_for_verification, ChainOfVerificationRunner};
