use tracing::debug;

use docqa_core::error::{Error, Result};
use docqa_core::traits::{Embedder, VectorIndex};
use docqa_core::types::Candidate;

/// Semantic top-k search: embed the query, ask the vector index for neighbours.
pub struct Retriever<'a> {
    embedder: &'a dyn Embedder,
    index: &'a dyn VectorIndex,
}

impl<'a> Retriever<'a> {
    pub fn new(embedder: &'a dyn Embedder, index: &'a dyn VectorIndex) -> Self {
        Self { embedder, index }
    }

    /// At most `k` candidates, highest cosine similarity first.
    pub fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Candidate>> {
        validate_query(query, k)?;
        let vector = self
            .embedder
            .embed(query)
            .map_err(|e| Error::Provider(format!("embedding query failed: {e:#}")))?;
        let hits = self
            .index
            .query(&vector, k)
            .map_err(|e| Error::Provider(format!("vector search failed: {e:#}")))?;

        let mut candidates: Vec<Candidate> = hits.into_iter().map(|(id, score)| Candidate::new(id, score)).collect();
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        candidates.truncate(k);
        debug!(k, hits = candidates.len(), top = ?candidates.first().map(|c| c.score), "retrieved candidates");
        Ok(candidates)
    }
}

pub(crate) fn validate_query(query: &str, k: usize) -> Result<()> {
    if query.trim().is_empty() {
        return Err(Error::InvalidInput("question must not be empty".into()));
    }
    if k == 0 {
        return Err(Error::InvalidInput("k must be >= 1".into()));
    }
    Ok(())
}
