use std::collections::HashMap;

use docqa_core::error::Error;
use docqa_core::traits::KeywordIndex;
use docqa_core::types::ChunkId;

/// Stands in for a keyword index that could not be opened.
///
/// Every search fails, which makes reranked queries fall back to semantic ordering.
#[derive(Debug, Clone)]
pub struct UnavailableKeywordIndex {
    reason: String,
}

impl UnavailableKeywordIndex {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

impl KeywordIndex for UnavailableKeywordIndex {
    fn add(&mut self, _chunk_id: &str, _text: &str) -> anyhow::Result<()> {
        Err(Error::KeywordIndex(self.reason.clone()).into())
    }

    fn search(&self, _query: &str, _candidate_ids: Option<&[ChunkId]>) -> anyhow::Result<HashMap<ChunkId, f32>> {
        Err(Error::KeywordIndex(self.reason.clone()).into())
    }
}
