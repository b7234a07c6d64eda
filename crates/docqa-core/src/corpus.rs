//! Immutable corpus snapshot written by ingestion and read at query time.
//!
//! The vector and keyword indexes only know chunk ids; the snapshot maps those
//! ids back to chunk text and document titles, and records which embedder
//! produced the vectors so a mismatched query-time embedder is rejected.

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::traits::Embedder;
use crate::types::{ChunkId, Document, DocumentChunk};

#[derive(Debug, Clone)]
pub struct Corpus {
    embedder_id: String,
    dim: usize,
    documents: Vec<Document>,
    chunks: Vec<DocumentChunk>,
    chunk_pos: HashMap<ChunkId, usize>,
    doc_pos: HashMap<String, usize>,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    embedder_id: &'a str,
    dim: usize,
    documents: &'a [Document],
    chunks: &'a [DocumentChunk],
}

#[derive(Deserialize)]
struct Snapshot {
    embedder_id: String,
    dim: usize,
    documents: Vec<Document>,
    chunks: Vec<DocumentChunk>,
}

impl Corpus {
    pub fn new(
        embedder_id: impl Into<String>,
        dim: usize,
        documents: Vec<Document>,
        chunks: Vec<DocumentChunk>,
    ) -> Result<Self> {
        let mut doc_pos = HashMap::with_capacity(documents.len());
        for (i, d) in documents.iter().enumerate() {
            if doc_pos.insert(d.id.clone(), i).is_some() {
                return Err(Error::InvalidInput(format!("duplicate document id '{}'", d.id)));
            }
        }
        let mut chunk_pos = HashMap::with_capacity(chunks.len());
        for (i, c) in chunks.iter().enumerate() {
            if !doc_pos.contains_key(&c.doc_id) {
                return Err(Error::InvalidInput(format!(
                    "chunk '{}' references unknown document '{}'",
                    c.id, c.doc_id
                )));
            }
            if chunk_pos.insert(c.id.clone(), i).is_some() {
                return Err(Error::InvalidInput(format!("duplicate chunk id '{}'", c.id)));
            }
        }
        Ok(Self { embedder_id: embedder_id.into(), dim, documents, chunks, chunk_pos, doc_pos })
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Err(Error::NotFound(format!(
                "corpus snapshot {} (run `docqa ingest` first)",
                path.display()
            ))
            .into());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading corpus snapshot {}", path.display()))?;
        let snap: Snapshot = serde_json::from_str(&raw)
            .with_context(|| format!("parsing corpus snapshot {}", path.display()))?;
        Ok(Self::new(snap.embedder_id, snap.dim, snap.documents, snap.chunks)?)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let snap = SnapshotRef {
            embedder_id: &self.embedder_id,
            dim: self.dim,
            documents: &self.documents,
            chunks: &self.chunks,
        };
        let json = serde_json::to_string_pretty(&snap)?;
        fs::write(path, json).with_context(|| format!("writing corpus snapshot {}", path.display()))
    }

    pub fn embedder_id(&self) -> &str {
        &self.embedder_id
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn chunks(&self) -> &[DocumentChunk] {
        &self.chunks
    }

    pub fn chunk(&self, id: &str) -> Option<&DocumentChunk> {
        self.chunk_pos.get(id).map(|&i| &self.chunks[i])
    }

    pub fn document(&self, id: &str) -> Option<&Document> {
        self.doc_pos.get(id).map(|&i| &self.documents[i])
    }

    /// Query vectors must come from the embedder that built the index.
    pub fn check_embedder(&self, embedder: &dyn Embedder) -> Result<()> {
        if embedder.embedder_id() != self.embedder_id || embedder.dim() != self.dim {
            return Err(Error::InvalidConfig(format!(
                "corpus was embedded with '{}' (d={}), but the configured embedder is '{}' (d={})",
                self.embedder_id,
                self.dim,
                embedder.embedder_id(),
                embedder.dim()
            )));
        }
        Ok(())
    }
}
