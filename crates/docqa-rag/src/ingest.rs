use anyhow::{Context as _, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use docqa_core::chunker::Chunker;
use docqa_core::corpus::Corpus;
use docqa_core::error::Error;
use docqa_core::traits::{Embedder, KeywordIndex, VectorIndex};
use docqa_core::types::{ChunkId, Document, DocumentChunk};

/// Offline ingestion: chunk, embed, and write both indexes.
///
/// Takes the indexes by `&mut`, so ingestion is exclusive with any query
/// against the same handles.
pub struct Ingestor<'a> {
    embedder: &'a dyn Embedder,
    chunker: Chunker,
    batch_size: usize,
    show_progress: bool,
}

impl<'a> Ingestor<'a> {
    pub fn new(embedder: &'a dyn Embedder, chunker: Chunker, batch_size: usize) -> Self {
        Self { embedder, chunker, batch_size: batch_size.max(1), show_progress: false }
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn ingest(
        &self,
        documents: Vec<Document>,
        vectors: &mut dyn VectorIndex,
        keywords: &mut dyn KeywordIndex,
    ) -> Result<Corpus> {
        let chunks: Vec<DocumentChunk> = documents.iter().flat_map(|d| self.chunker.chunk_document(d)).collect();
        info!(
            documents = documents.len(),
            chunks = chunks.len(),
            embedder = self.embedder.embedder_id(),
            max_len = self.embedder.max_len(),
            "ingesting"
        );
        if chunks.is_empty() {
            warn!("no chunks produced; the corpus will be empty");
        }
        // duplicate ids are rejected here, before either index is touched
        let corpus = Corpus::new(self.embedder.embedder_id(), self.embedder.dim(), documents, chunks)?;

        let pb = self.progress_bar(corpus.chunks().len() as u64)?;
        for batch in corpus.chunks().chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let embeddings = self.embedder.embed_batch(&texts).context("embedding chunks")?;
            if embeddings.len() != batch.len() {
                return Err(Error::Provider(format!(
                    "embedder returned {} vectors for {} chunks",
                    embeddings.len(),
                    batch.len()
                ))
                .into());
            }
            let mut entries: Vec<(ChunkId, Vec<f32>)> = Vec::with_capacity(batch.len());
            for (chunk, vector) in batch.iter().zip(embeddings) {
                if vector.len() != self.embedder.dim() {
                    return Err(Error::InvalidInput(format!(
                        "chunk '{}' embedded to {} dims, expected {}",
                        chunk.id,
                        vector.len(),
                        self.embedder.dim()
                    ))
                    .into());
                }
                entries.push((chunk.id.clone(), vector));
            }
            vectors.add_batch(&entries).context("writing vector index")?;
            for chunk in batch {
                keywords.add(&chunk.id, &chunk.content).context("writing keyword index")?;
            }
            pb.inc(batch.len() as u64);
        }
        keywords.commit().context("committing keyword index")?;
        pb.finish_and_clear();

        info!(chunks = corpus.chunks().len(), "ingestion complete");
        Ok(corpus)
    }

    fn progress_bar(&self, len: u64) -> Result<ProgressBar> {
        if !self.show_progress {
            return Ok(ProgressBar::hidden());
        }
        let pb = ProgressBar::new(len);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%)")?
                .progress_chars("#>-"),
        );
        Ok(pb)
    }
}
