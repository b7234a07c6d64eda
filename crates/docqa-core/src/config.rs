//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge serialized defaults + `config.toml` + `config.<env>.toml`
//! + `APP_*` env vars (`__` separates nested keys, e.g. `APP_RETRIEVAL__ALPHA`).
//! Provides helpers to expand `~` and `${VAR}` and to resolve relative paths
//! against the directory the configuration was loaded from.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::chunker::ChunkingConfig;
use crate::error::{Error, Result};
use crate::types::SearchMode;

pub struct Config {
    figment: Figment,
    base_dir: PathBuf,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from_dir(Path::new("."))
    }

    pub fn load_from_dir(dir: &Path) -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(dir.join("config.toml")));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file(dir.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(dir.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(dir.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self::from_figment(figment, dir);
        config.settings()?;
        Ok(config)
    }

    pub fn from_figment(figment: Figment, base_dir: &Path) -> Self {
        Self { figment, base_dir: base_dir.to_path_buf() }
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Typed, validated view of the whole configuration.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to read settings: {}", e))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn resolve_path<S: AsRef<str>>(&self, p: S) -> PathBuf {
        resolve_with_base(&self.base_dir, p)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data: DataSettings,
    pub index: IndexSettings,
    pub chunking: ChunkingConfig,
    pub embedding: EmbeddingSettings,
    pub retrieval: RetrievalSettings,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;
        self.embedding.validate()?;
        self.retrieval.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// JSON array of `{ id, title, path }`; paths relative to the manifest.
    pub sources_manifest: String,
    /// Walked for `.pdf`/`.txt` files when the manifest does not exist.
    pub docs_dir: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self { sources_manifest: "data/sources.json".to_string(), docs_dir: "data".to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    pub dir: String,
    pub lancedb_table: String,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self { dir: "indexes".to_string(), lancedb_table: "chunks".to_string() }
    }
}

impl IndexSettings {
    pub fn corpus_path(root: &Path) -> PathBuf {
        root.join("corpus.json")
    }

    pub fn lancedb_dir(root: &Path) -> PathBuf {
        root.join("lancedb")
    }

    pub fn tantivy_dir(root: &Path) -> PathBuf {
        root.join("tantivy")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Sentence-transformers BERT checkpoint loaded with candle.
    #[default]
    Bert,
    /// Deterministic feature hashing; no model files needed.
    Hashing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub backend: EmbeddingBackend,
    pub model_dir: String,
    pub max_len: usize,
    pub hashing_dim: usize,
    pub batch_size: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::Bert,
            model_dir: "models/all-MiniLM-L6-v2".to_string(),
            max_len: 256,
            hashing_dim: 384,
            batch_size: 32,
        }
    }
}

impl EmbeddingSettings {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("embedding.batch_size must be >= 1".into()));
        }
        if self.max_len == 0 {
            return Err(Error::InvalidConfig("embedding.max_len must be >= 1".into()));
        }
        if self.backend == EmbeddingBackend::Hashing && self.hashing_dim == 0 {
            return Err(Error::InvalidConfig("embedding.hashing_dim must be >= 1".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub default_k: usize,
    /// Reranked mode retrieves `k * fanout` candidates before rescoring.
    pub fanout: usize,
    /// Weight of the semantic score in the blend; `1 - alpha` goes to keywords.
    pub alpha: f32,
    pub abstain_threshold: f32,
    pub default_mode: SearchMode,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            default_k: 5,
            fanout: 3,
            alpha: 0.5,
            abstain_threshold: 0.4,
            default_mode: SearchMode::Reranked,
        }
    }
}

impl RetrievalSettings {
    pub fn validate(&self) -> Result<()> {
        if self.default_k == 0 {
            return Err(Error::InvalidConfig("retrieval.default_k must be >= 1".into()));
        }
        if self.fanout == 0 {
            return Err(Error::InvalidConfig("retrieval.fanout must be >= 1".into()));
        }
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(Error::InvalidConfig(format!(
                "retrieval.alpha must be within [0, 1], got {}",
                self.alpha
            )));
        }
        if !self.abstain_threshold.is_finite() {
            return Err(Error::InvalidConfig("retrieval.abstain_threshold must be finite".into()));
        }
        Ok(())
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
