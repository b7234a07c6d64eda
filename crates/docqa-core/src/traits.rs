use std::collections::HashMap;

use crate::types::ChunkId;

pub trait Embedder: Send + Sync {
    /// Stable identifier for the model and its dimensionality (e.g. `bert:all-MiniLM-L6-v2:d384`).
    fn embedder_id(&self) -> &str;
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;

    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| anyhow::anyhow!("embedder returned no vector"))
    }
}

pub trait VectorIndex: Send + Sync {
    fn add(&mut self, chunk_id: &str, vector: &[f32]) -> anyhow::Result<()>;

    fn add_batch(&mut self, entries: &[(ChunkId, Vec<f32>)]) -> anyhow::Result<()> {
        for (id, v) in entries {
            self.add(id, v)?;
        }
        Ok(())
    }

    /// Nearest `n` chunks, ordered by descending similarity.
    fn query(&self, vector: &[f32], n: usize) -> anyhow::Result<Vec<(ChunkId, f32)>>;

    fn len(&self) -> anyhow::Result<usize>;

    fn is_empty(&self) -> anyhow::Result<bool> {
        Ok(self.len()? == 0)
    }
}

pub trait KeywordIndex: Send + Sync {
    fn add(&mut self, chunk_id: &str, text: &str) -> anyhow::Result<()>;

    /// Make added documents visible to `search`.
    fn commit(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Match scores for `query`, restricted to `candidate_ids` when given.
    /// A chunk matches only when it contains every non-stop-word term of the
    /// query; chunks without a match are absent from the map.
    fn search(
        &self,
        query: &str,
        candidate_ids: Option<&[ChunkId]>,
    ) -> anyhow::Result<HashMap<ChunkId, f32>>;
}
