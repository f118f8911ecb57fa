//! Chain-of-Verification (CoV) claim and verification types.

use serde::{Deserialize, Serialize};

use crate::argument::Confidence;

/// The seven verifiable claim categories the extractor is restricted to.
/// Subjective statements are deliberately not representable here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimType {
    Number,
    Date,
    Person,
    Organization,
    Event,
    Statistic,
    Quote,
}

/// A single verifiable claim extracted from a draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    pub claim: String,
    pub claim_type: ClaimType,
    #[serde(default)]
    pub source_reference: Option<i32>,
    #[serde(default)]
    pub context: String,
}

/// The full set of claims extracted from one draft.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClaimsList {
    pub claims: Vec<Claim>,
    #[serde(default)]
    pub extraction_notes: String,
}

/// Verification outcome for a single claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Verified,
    Unverified,
    Contradicted,
    PartiallyVerified,
}

/// The verdict for one claim after matching it against the source set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    pub claim: String,
    pub status: VerificationStatus,
    #[serde(default)]
    pub evidence: Option<String>,
    #[serde(default)]
    pub source_id: Option<i32>,
    pub explanation: String,
    pub confidence: Confidence,
}

/// Aggregate verification output for a whole draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationOutcome {
    pub results: Vec<VerificationResult>,
    pub verified_count: usize,
    pub unverified_count: usize,
    pub contradicted_count: usize,
    pub summary: String,
}

impl VerificationOutcome {
    /// Build the aggregate from a finished result set, deriving the counts
    /// and a default summary. Callers may override `summary` afterward.
    pub fn from_results(results: Vec<VerificationResult>) -> Self {
        if results.is_empty() {
            return Self {
                results,
                verified_count: 0,
                unverified_count: 0,
                contradicted_count: 0,
                summary: "no verifiable claims extracted from the draft".to_string(),
            };
        }

        let verified_count = results
            .iter()
            .filter(|r| r.status == VerificationStatus::Verified)
            .count();
        let unverified_count = results
            .iter()
            .filter(|r| r.status == VerificationStatus::Unverified)
            .count();
        let contradicted_count = results
            .iter()
            .filter(|r| r.status == VerificationStatus::Contradicted)
            .count();

        let summary = format!(
            "verification summary: {} claims, {} verified, {} unverified, {} contradicted",
            results.len(),
            verified_count,
            unverified_count,
            contradicted_count
        );

        Self {
            results,
            verified_count,
            unverified_count,
            contradicted_count,
            summary,
        }
    }

    pub fn has_contradictions(&self) -> bool {
        self.contradicted_count > 0
    }

    /// Escalation guidance threshold: >= 3 unverified claims suggests WARN.
    pub fn suggests_warn(&self) -> bool {
        self.unverified_count >= 3
    }
}
