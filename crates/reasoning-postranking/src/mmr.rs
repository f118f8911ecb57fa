//! Maximal Marginal Relevance diversity re-ranking, applied to the final
//! ranked result list before it reaches the Writer's citation whitelist.
//!
//! Three independent skip conditions mirror `SummarizeResults.apply_mmr_reranking`:
//! MMR disabled in config, the result count at or below `threshold`, or no
//! per-URL vectors available to diversify against.

use std::collections::HashMap;

use reasoning_contracts::MmrParams;
use serde::{Deserialize, Serialize};

/// One entry in the ranked-result list the MMR pass operates over. `vector`
/// is attached from the upstream `url -> vector` map built during dense
/// retrieval/ranking and is never populated by this crate itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedResult {
    pub url: String,
    pub title: String,
    pub description: String,
    pub site: String,
    /// Relevance score from the upstream ranking stage (dense + BM25
    /// fusion). MMR treats this as the "relevance" term; it does not
    /// recompute relevance itself.
    pub relevance: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector: Option<Vec<f32>>,
}

impl RankedResult {
    pub fn new(url: impl Into<String>, title: impl Into<String>, site: impl Into<String>, relevance: f32) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            site: site.into(),
            description: String::new(),
            relevance,
            vector: None,
        }
    }
}

/// One logged MMR decision, emitted as a `tracing` event per
/// `(query_id, url, position)` rather than returned to a bespoke sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MmrScoreLogEntry {
    pub url: String,
    pub mmr_score: f32,
    pub position: usize,
}

/// Attach vectors from a `url -> vector` map onto ranked results that have a
/// match, leaving the rest untouched.
pub fn attach_vectors(results: &mut [RankedResult], url_to_vector: &HashMap<String, Vec<f32>>) {
    for result in results.iter_mut() {
        if let Some(vector) = url_to_vector.get(&result.url) {
            result.vector = Some(vector.clone());
        }
    }
}

/// Strip the vector field from every result. Vectors are large float arrays
/// that must never leak into an LLM prompt; this is called unconditionally
/// after re-ranking, whether or not MMR actually ran.
pub fn strip_vectors(results: &mut [RankedResult]) {
    for result in results.iter_mut() {
        result.vector = None;
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Greedy Maximal Marginal Relevance selector: at each step picks the
/// remaining candidate maximizing `lambda * relevance - (1 - lambda) *
/// max_similarity_to_selected`, trading off relevance against diversity.
pub struct MmrReranker {
    lambda: f32,
}

impl MmrReranker {
    pub fn new(lambda: f32) -> Self {
        Self { lambda }
    }

    /// Re-rank `ranked` down to at most `top_k` results, returning the new
    /// order alongside the MMR score assigned at each selection step
    /// (parallel to the returned vec, one score per position).
    pub fn rerank(&self, ranked: Vec<RankedResult>, top_k: usize) -> (Vec<RankedResult>, Vec<f32>) {
        let mut remaining: Vec<RankedResult> = ranked;
        let mut selected: Vec<RankedResult> = Vec::new();
        let mut scores: Vec<f32> = Vec::new();

        while !remaining.is_empty() && selected.len() < top_k {
            let mut best_idx = 0;
            let mut best_score = f32::MIN;

            for (idx, candidate) in remaining.iter().enumerate() {
                let max_sim = selected
                    .iter()
                    .map(|s| match (&candidate.vector, &s.vector) {
                        (Some(cv), Some(sv)) => cosine_similarity(cv, sv),
                        _ => 0.0,
                    })
                    .fold(0.0_f32, f32::max);

                let mmr_score = self.lambda * candidate.relevance - (1.0 - self.lambda) * max_sim;
                if mmr_score > best_score {
                    best_score = mmr_score;
                    best_idx = idx;
                }
            }

            selected.push(remaining.remove(best_idx));
            scores.push(best_score);
        }

        (selected, scores)
    }
}

/// Applies all three skip conditions, then re-ranks and strips vectors,
/// logging one `tracing` event per `(query_id, url, position)`. Returns the
/// (possibly unchanged) result list.
pub fn apply_mmr_reranking(
    mut ranked: Vec<RankedResult>,
    params: &MmrParams,
    query_id: &str,
) -> Vec<RankedResult> {
    if !params.enabled {
        tracing::info!(query_id, "MMR disabled in config, using standard ranking");
        return ranked;
    }

    if ranked.len() <= params.threshold {
        tracing::info!(
            query_id,
            count = ranked.len(),
            threshold = params.threshold,
            "MMR skipped: result count at or below threshold"
        );
        return ranked;
    }

    if ranked.iter().all(|r| r.vector.is_none()) {
        tracing::info!(query_id, "MMR skipped: no vectors available");
        return ranked;
    }

    tracing::info!(query_id, count = ranked.len(), "applying MMR diversity re-ranking");

    let reranker = MmrReranker::new(params.lambda);
    let top_k = ranked.len();
    let (reranked, scores) = reranker.rerank(std::mem::take(&mut ranked), top_k);

    for (position, (result, score)) in reranked.iter().zip(scores.iter()).enumerate() {
        tracing::info!(
            query_id,
            url = %result.url,
            mmr_score = score,
            position,
            "mmr score"
        );
    }

    let mut reranked = reranked;
    strip_vectors(&mut reranked);
    reranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(url: &str, relevance: f32, vector: Vec<f32>) -> RankedResult {
        let mut r = RankedResult::new(url, "t", "s", relevance);
        r.vector = Some(vector);
        r
    }

    #[test]
    fn skips_when_disabled() {
        let params = MmrParams {
            enabled: false,
            lambda: 0.7,
            threshold: 1,
        };
        let ranked = vec![result("a", 1.0, vec![1.0, 0.0]), result("b", 0.9, vec![1.0, 0.0])];
        let out = apply_mmr_reranking(ranked, &params, "q1");
        assert_eq!(out.len(), 2);
        assert!(out[0].vector.is_some());
    }

    #[test]
    fn skips_when_at_or_below_threshold() {
        let params = MmrParams {
            enabled: true,
            lambda: 0.7,
            threshold: 3,
        };
        let ranked = vec![result("a", 1.0, vec![1.0, 0.0]), result("b", 0.9, vec![1.0, 0.0])];
        let out = apply_mmr_reranking(ranked, &params, "q1");
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn skips_when_no_vectors_available() {
        let params = MmrParams {
            enabled: true,
            lambda: 0.7,
            threshold: 1,
        };
        let ranked = vec![
            RankedResult::new("a", "t", "s", 1.0),
            RankedResult::new("b", "t", "s", 0.9),
            RankedResult::new("c", "t", "s", 0.8),
        ];
        let out = apply_mmr_reranking(ranked, &params, "q1");
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn reranking_strips_vectors_and_prefers_diverse_candidates() {
        let params = MmrParams {
            enabled: true,
            lambda: 0.5,
            threshold: 1,
        };
        let ranked = vec![
            result("a", 1.0, vec![1.0, 0.0]),
            result("b", 0.95, vec![1.0, 0.0]), // near-duplicate of a
            result("c", 0.7, vec![0.0, 1.0]),  // diverse
        ];
        let out = apply_mmr_reranking(ranked, &params, "q1");
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|r| r.vector.is_none()));
        // The diverse candidate should be promoted ahead of the near-duplicate.
        let pos_b = out.iter().position(|r| r.url == "b").unwrap();
        let pos_c = out.iter().position(|r| r.url == "c").unwrap();
        assert!(pos_c < pos_b);
    }

    #[test]
    fn cosine_similarity_of_identical_vectors_is_one() {
        assert!((cosine_similarity(&[1.0, 2.0], &[1.0, 2.0]) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_similarity_of_orthogonal_vectors_is_zero() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
    }
}
