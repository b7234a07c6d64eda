use std::collections::HashMap;
use tracing::{debug, warn};

use docqa_core::error::{Error, Result};
use docqa_core::traits::KeywordIndex;
use docqa_core::types::{Candidate, ChunkId, RerankedCandidate};

/// What a given `alpha` does to the blend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendEffect {
    /// `alpha == 1`: keyword scores are ignored.
    PureSemantic,
    /// `alpha == 0`: semantic scores are ignored.
    PureKeyword,
    Blend,
}

impl BlendEffect {
    pub fn of(alpha: f32) -> Self {
        if alpha >= 1.0 {
            BlendEffect::PureSemantic
        } else if alpha <= 0.0 {
            BlendEffect::PureKeyword
        } else {
            BlendEffect::Blend
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RerankOutcome {
    pub candidates: Vec<RerankedCandidate>,
    /// The keyword index failed and the semantic ordering was kept.
    pub degraded: bool,
}

/// Hybrid rescoring of semantic candidates with keyword match scores.
pub struct Reranker<'a> {
    keywords: &'a dyn KeywordIndex,
    alpha: f32,
}

impl<'a> Reranker<'a> {
    pub fn new(keywords: &'a dyn KeywordIndex, alpha: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&alpha) {
            return Err(Error::InvalidConfig(format!("alpha must be within [0, 1], got {alpha}")));
        }
        Ok(Self { keywords, alpha })
    }

    pub fn effect(&self) -> BlendEffect {
        BlendEffect::of(self.alpha)
    }

    /// Rescore `candidates` (semantic order) and keep the best `k`.
    pub fn rerank(&self, query: &str, candidates: &[Candidate], k: usize) -> RerankOutcome {
        let ids: Vec<ChunkId> = candidates.iter().map(|c| c.chunk_id.clone()).collect();
        let keyword_scores = match self.keywords.search(query, Some(ids.as_slice())) {
            Ok(scores) => scores,
            Err(e) => {
                warn!(error = %format!("{e:#}"), "keyword index unavailable, keeping semantic order");
                return Self::semantic_fallback(candidates, k);
            }
        };
        let mut reranked = self.blend(candidates, &keyword_scores);
        // stable: ties keep the semantic order
        reranked.sort_by(|a, b| b.blended_score.total_cmp(&a.blended_score));
        reranked.truncate(k);
        debug!(
            k,
            candidates = candidates.len(),
            keyword_hits = keyword_scores.len(),
            effect = ?self.effect(),
            "reranked candidates"
        );
        RerankOutcome { candidates: reranked, degraded: false }
    }

    fn blend(&self, candidates: &[Candidate], keyword_scores: &HashMap<ChunkId, f32>) -> Vec<RerankedCandidate> {
        let raw: Vec<f32> = candidates
            .iter()
            .map(|c| keyword_scores.get(&c.chunk_id).copied().unwrap_or(0.0))
            .collect();
        let normalized = normalize(&raw);
        candidates
            .iter()
            .zip(raw.iter().zip(normalized))
            .map(|(c, (&keyword_score, normalized_keyword_score))| RerankedCandidate {
                chunk_id: c.chunk_id.clone(),
                blended_score: self.alpha * c.score + (1.0 - self.alpha) * normalized_keyword_score,
                semantic_score: c.score,
                keyword_score,
                normalized_keyword_score,
            })
            .collect()
    }

    fn semantic_fallback(candidates: &[Candidate], k: usize) -> RerankOutcome {
        let candidates = candidates
            .iter()
            .take(k)
            .map(|c| RerankedCandidate {
                chunk_id: c.chunk_id.clone(),
                blended_score: c.score,
                semantic_score: c.score,
                keyword_score: 0.0,
                normalized_keyword_score: 0.0,
            })
            .collect();
        RerankOutcome { candidates, degraded: true }
    }
}

/// Divide by the maximum so the best keyword match maps to 1.0.
/// A set without any positive score maps to all zeros.
pub fn normalize(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().copied().fold(0.0f32, f32::max);
    if max <= 0.0 {
        return vec![0.0; scores.len()];
    }
    scores.iter().map(|s| (s / max).max(0.0)).collect()
}
