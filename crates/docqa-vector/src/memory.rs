use anyhow::Result;

use docqa_core::error::Error;
use docqa_core::traits::VectorIndex;
use docqa_core::types::ChunkId;

/// Exact cosine-similarity index held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryVectorIndex {
    dim: Option<usize>,
    entries: Vec<(ChunkId, Vec<f32>)>,
}

impl MemoryVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dim(dim: usize) -> Self {
        Self { dim: Some(dim), entries: Vec::new() }
    }
}

/// Cosine similarity, `None` when either vector has zero norm or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() {
        return None;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        return None;
    }
    Some(dot / (na * nb))
}

impl VectorIndex for MemoryVectorIndex {
    fn add(&mut self, chunk_id: &str, vector: &[f32]) -> Result<()> {
        match self.dim {
            Some(dim) if dim != vector.len() => {
                return Err(Error::InvalidInput(format!("vector has {} dims, index expects {}", vector.len(), dim)).into());
            }
            Some(_) => {}
            None => self.dim = Some(vector.len()),
        }
        self.entries.push((chunk_id.to_string(), vector.to_vec()));
        Ok(())
    }

    fn query(&self, vector: &[f32], n: usize) -> Result<Vec<(ChunkId, f32)>> {
        if let Some(dim) = self.dim.filter(|d| *d != vector.len()) {
            return Err(Error::InvalidInput(format!("query has {} dims, index expects {}", vector.len(), dim)).into());
        }
        let mut scored: Vec<(ChunkId, f32)> = self
            .entries
            .iter()
            .filter_map(|(id, v)| cosine_similarity(vector, v).map(|s| (id.clone(), s)))
            .collect();
        // stable: equal scores keep insertion order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(n);
        Ok(scored)
    }

    fn len(&self) -> Result<usize> {
        Ok(self.entries.len())
    }
}
