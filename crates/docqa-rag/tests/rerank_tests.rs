use std::collections::HashMap;

use docqa_core::traits::KeywordIndex;
use docqa_core::types::{Candidate, ChunkId};
use docqa_rag::rerank::normalize;
use docqa_rag::{decide, BlendEffect, Decision, Reranker};
use docqa_text::UnavailableKeywordIndex;

/// Fixed keyword scores, filtered to the requested candidates.
struct StaticKeywords(HashMap<ChunkId, f32>);

impl StaticKeywords {
    fn new(scores: &[(&str, f32)]) -> Self {
        Self(scores.iter().map(|(id, s)| (id.to_string(), *s)).collect())
    }
}

impl KeywordIndex for StaticKeywords {
    fn add(&mut self, _chunk_id: &str, _text: &str) -> anyhow::Result<()> {
        Ok(())
    }

    fn search(&self, _query: &str, candidate_ids: Option<&[ChunkId]>) -> anyhow::Result<HashMap<ChunkId, f32>> {
        Ok(self
            .0
            .iter()
            .filter(|(id, _)| candidate_ids.map_or(true, |ids| ids.contains(id)))
            .map(|(id, s)| (id.clone(), *s))
            .collect())
    }
}

fn candidates(scores: &[(&str, f32)]) -> Vec<Candidate> {
    scores.iter().map(|(id, s)| Candidate::new(*id, *s)).collect()
}

fn ids(outcome: &docqa_rag::RerankOutcome) -> Vec<&str> {
    outcome.candidates.iter().map(|c| c.chunk_id.as_str()).collect()
}

#[test]
fn normalize_divides_by_max() {
    assert_eq!(normalize(&[2.0, 0.0, 1.0]), vec![1.0, 0.0, 0.5]);
    assert_eq!(normalize(&[0.0, 0.0]), vec![0.0, 0.0]);
    assert!(normalize(&[]).is_empty());
}

#[test]
fn keyword_matches_reorder_candidates() {
    let keywords = StaticKeywords::new(&[("c", 4.0), ("b", 1.0)]);
    let reranker = Reranker::new(&keywords, 0.5).expect("reranker");
    let input = candidates(&[("a", 0.8), ("b", 0.7), ("c", 0.6)]);
    let out = reranker.rerank("q", &input, 3);

    assert!(!out.degraded);
    assert_eq!(ids(&out), vec!["c", "b", "a"]);
    let c = &out.candidates[0];
    assert!((c.normalized_keyword_score - 1.0).abs() < 1e-6);
    assert!((c.blended_score - (0.5 * 0.6 + 0.5)).abs() < 1e-6);
    let a = &out.candidates[2];
    assert_eq!(a.keyword_score, 0.0);
    assert!((a.blended_score - 0.4).abs() < 1e-6);
}

#[test]
fn pure_semantic_alpha_keeps_semantic_order() {
    let keywords = StaticKeywords::new(&[("c", 10.0)]);
    let reranker = Reranker::new(&keywords, 1.0).expect("reranker");
    assert_eq!(reranker.effect(), BlendEffect::PureSemantic);
    let input = candidates(&[("a", 0.9), ("b", 0.5), ("c", 0.3)]);
    let out = reranker.rerank("q", &input, 3);
    assert_eq!(ids(&out), vec!["a", "b", "c"]);
    for (r, c) in out.candidates.iter().zip(&input) {
        assert!((r.blended_score - c.score).abs() < 1e-6);
    }
}

#[test]
fn keyword_match_breaks_semantic_tie() {
    let keywords = StaticKeywords::new(&[("b", 2.0)]);
    let reranker = Reranker::new(&keywords, 0.7).expect("reranker");
    let out = reranker.rerank("q", &candidates(&[("a", 0.6), ("b", 0.6)]), 2);
    assert_eq!(ids(&out), vec!["b", "a"]);
}

#[test]
fn equal_blended_scores_keep_candidate_order_and_truncate() {
    let keywords = StaticKeywords::new(&[]);
    let reranker = Reranker::new(&keywords, 0.5).expect("reranker");
    let out = reranker.rerank("q", &candidates(&[("a", 0.5), ("b", 0.5), ("c", 0.5)]), 2);
    assert_eq!(ids(&out), vec!["a", "b"]);
}

#[test]
fn pure_keyword_alpha_ignores_semantic_scores() {
    let keywords = StaticKeywords::new(&[("b", 3.0)]);
    let reranker = Reranker::new(&keywords, 0.0).expect("reranker");
    assert_eq!(reranker.effect(), BlendEffect::PureKeyword);
    let out = reranker.rerank("q", &candidates(&[("a", 0.99), ("b", 0.01)]), 2);
    assert_eq!(ids(&out), vec!["b", "a"]);
    assert!((out.candidates[0].blended_score - 1.0).abs() < 1e-6);
}

#[test]
fn unavailable_keyword_index_fails_open() {
    let keywords = UnavailableKeywordIndex::new("index offline");
    let reranker = Reranker::new(&keywords, 0.5).expect("reranker");
    let input = candidates(&[("a", 0.9), ("b", 0.5), ("c", 0.3)]);
    let out = reranker.rerank("q", &input, 2);
    assert!(out.degraded);
    assert_eq!(ids(&out), vec!["a", "b"]);
    assert!((out.candidates[0].blended_score - 0.9).abs() < 1e-6);
    assert_eq!(out.candidates[1].keyword_score, 0.0);
}

#[test]
fn alpha_outside_unit_interval_is_rejected() {
    let keywords = StaticKeywords::new(&[]);
    assert!(Reranker::new(&keywords, 1.2).is_err());
    assert!(Reranker::new(&keywords, -0.1).is_err());
    assert_eq!(BlendEffect::of(0.5), BlendEffect::Blend);
}

#[test]
fn abstention_threshold_is_inclusive() {
    assert_eq!(decide(0.4, 0.4), Decision::Answer);
    assert_eq!(decide(0.41, 0.4), Decision::Answer);
    assert_eq!(decide(0.39, 0.4), Decision::Abstain { top_score: 0.39, threshold: 0.4 });
    assert!(matches!(decide(-0.2, 0.0), Decision::Abstain { .. }));
}
