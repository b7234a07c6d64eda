use anyhow::{anyhow, Context as _, Result};
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use docqa_core::traits::Embedder;

use crate::device::select_device;
use crate::pool::masked_mean_l2;
use crate::tokenize::{configure_truncation, tokenize_on_device};

/// Sentence embedder over a local BERT-family checkpoint (e.g. all-MiniLM-L6-v2).
///
/// `model_dir` must hold `tokenizer.json`, `config.json` and either
/// `model.safetensors` or `pytorch_model.bin`.
pub struct BertEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    id: String,
    dim: usize,
    max_len: usize,
}

impl BertEmbedder {
    pub fn load(model_dir: &Path, max_len: usize) -> Result<Self> {
        if !model_dir.is_dir() {
            return Err(anyhow!("model directory not found: {}", model_dir.display()));
        }
        let device = select_device();
        info!(dir = %model_dir.display(), "loading embedding model");

        let tokenizer_path = model_dir.join("tokenizer.json");
        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;
        configure_truncation(&mut tokenizer, max_len)?;

        let config_path = model_dir.join("config.json");
        let raw_config = std::fs::read_to_string(&config_path)
            .with_context(|| format!("reading {}", config_path.display()))?;
        let config: BertConfig = serde_json::from_str(&raw_config)?;
        let dim = serde_json::from_str::<serde_json::Value>(&raw_config)?
            .get("hidden_size")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| anyhow!("{} has no hidden_size", config_path.display()))? as usize;

        let weights = load_weights(model_dir, &device)?;
        let vb = VarBuilder::from_tensors(weights, DType::F32, &device);
        let model = BertModel::load(vb, &config)?;

        let name = model_dir
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "bert".to_string());
        let id = format!("bert:{name}:d{dim}");
        info!(embedder = %id, "embedding model loaded");
        Ok(Self { model, tokenizer, device, id, dim, max_len })
    }

    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let start = Instant::now();
        let (input_ids, attention_mask) = tokenize_on_device(&self.tokenizer, text, &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self.model.forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = masked_mean_l2(&hidden, &attention_mask)?;
        let v: Vec<f32> = pooled.to_device(&Device::Cpu)?.squeeze(0)?.to_vec1()?;
        if v.len() != self.dim {
            return Err(anyhow!("embedding has {} dims, expected {}", v.len(), self.dim));
        }
        debug!(elapsed_ms = start.elapsed().as_millis() as u64, "embedded text");
        Ok(v)
    }
}

fn load_weights(model_dir: &Path, device: &Device) -> Result<HashMap<String, Tensor>> {
    let safetensors = model_dir.join("model.safetensors");
    if safetensors.exists() {
        return Ok(candle_core::safetensors::load(&safetensors, device)?);
    }
    let pickle = model_dir.join("pytorch_model.bin");
    if pickle.exists() {
        let tensors = candle_core::pickle::read_all(&pickle)?;
        return tensors
            .into_iter()
            .map(|(name, t)| -> Result<(String, Tensor)> { Ok((name, t.to_device(device)?)) })
            .collect();
    }
    Err(anyhow!("no model.safetensors or pytorch_model.bin in {}", model_dir.display()))
}

impl Embedder for BertEmbedder {
    fn embedder_id(&self) -> &str {
        &self.id
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn max_len(&self) -> usize {
        self.max_len
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed_one(t)).collect()
    }
}
