use anyhow::Result;
use std::path::Path;
use tracing::info;

use docqa_core::config::{EmbeddingBackend, EmbeddingSettings};
use docqa_core::traits::Embedder;

pub mod bert;
pub mod device;
pub mod hashing;
pub mod pool;
pub mod tokenize;

pub use bert::BertEmbedder;
pub use hashing::HashingEmbedder;
pub use pool::masked_mean_l2;

/// Build the configured embedder. `model_dir` is the already-resolved model path.
pub fn embedder_from_settings(settings: &EmbeddingSettings, model_dir: &Path) -> Result<Box<dyn Embedder>> {
    match settings.backend {
        EmbeddingBackend::Hashing => {
            info!(dim = settings.hashing_dim, "using hashing embedder");
            Ok(Box::new(HashingEmbedder::new(settings.hashing_dim)))
        }
        EmbeddingBackend::Bert => Ok(Box::new(BertEmbedder::load(model_dir, settings.max_len)?)),
    }
}
