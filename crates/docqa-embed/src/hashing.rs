use anyhow::Result;
use std::hash::{Hash, Hasher};
use twox_hash::XxHash64;

use docqa_core::terms::analyze;
use docqa_core::traits::Embedder;

/// Model-free embedder: term-frequency feature hashing into `dim` buckets,
/// L2-normalized. Texts sharing content words get a positive cosine; texts
/// sharing none score near zero. Used for tests and offline runs without a model.
pub struct HashingEmbedder {
    id: String,
    dim: usize,
}

impl HashingEmbedder {
    pub fn new(dim: usize) -> Self {
        let dim = dim.max(1);
        Self { id: format!("hashing:d{dim}"), dim }
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        for term in analyze(text) {
            let mut hasher = XxHash64::with_seed(0);
            term.hash(&mut hasher);
            let idx = (hasher.finish() % self.dim as u64) as usize;
            v[idx] += 1.0;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }
        v
    }
}

impl Embedder for HashingEmbedder {
    fn embedder_id(&self) -> &str {
        &self.id
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn max_len(&self) -> usize {
        usize::MAX
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}
