use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::error::{Error, Result};
use crate::types::{Document, DocumentChunk};

/// Tried in order: paragraphs, lines, words, characters.
const SEPARATORS: &[&str] = &["\n\n", "\n", " ", ""];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Upper bound on chunk length, in characters.
    pub chunk_size: usize,
    /// Characters of trailing context repeated at the start of the next chunk.
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { chunk_size: 512, chunk_overlap: 50 }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidConfig("chunking.chunk_size must be >= 1".into()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::InvalidConfig(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Recursive character splitter producing overlapping, size-bounded passages.
#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkingConfig,
}

impl Chunker {
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    pub fn chunk_document(&self, doc: &Document) -> Vec<DocumentChunk> {
        let pieces = self.split_text(&doc.text);
        let total_chunks = pieces.len();
        pieces
            .into_iter()
            .enumerate()
            .map(|(chunk_index, content)| DocumentChunk {
                id: format!("{}-{}", doc.id, chunk_index),
                doc_id: doc.id.clone(),
                content,
                chunk_index,
                total_chunks,
            })
            .collect()
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_with(text, SEPARATORS)
    }

    fn split_with(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let position = separators.iter().position(|s| s.is_empty() || text.contains(s));
        let (separator, remaining) = match position {
            Some(i) => (separators[i], &separators[i + 1..]),
            None => ("", &separators[separators.len()..]),
        };
        let pieces: Vec<&str> = if separator.is_empty() {
            text.split_inclusive(|_: char| true).collect()
        } else {
            text.split(separator).filter(|p| !p.is_empty()).collect()
        };

        let mut chunks = Vec::new();
        let mut pending: Vec<&str> = Vec::new();
        for piece in pieces {
            if char_len(piece) < self.config.chunk_size {
                pending.push(piece);
                continue;
            }
            if !pending.is_empty() {
                chunks.extend(self.merge(&pending, separator));
                pending.clear();
            }
            if remaining.is_empty() {
                push_trimmed(&mut chunks, piece);
            } else {
                chunks.extend(self.split_with(piece, remaining));
            }
        }
        if !pending.is_empty() {
            chunks.extend(self.merge(&pending, separator));
        }
        chunks
    }

    /// Greedily pack `pieces` (each shorter than `chunk_size`) into chunks.
    fn merge(&self, pieces: &[&str], separator: &str) -> Vec<String> {
        let sep_len = char_len(separator);
        let mut out = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        // Joined length of `window`, separators included.
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);
            let joiner = if window.is_empty() { 0 } else { sep_len };
            if !window.is_empty() && total + joiner + len > self.config.chunk_size {
                push_trimmed(&mut out, &join(&window, separator));
                while total > self.config.chunk_overlap
                    || (!window.is_empty() && total + sep_len + len > self.config.chunk_size)
                {
                    let Some(first) = window.pop_front() else { break };
                    total -= char_len(first) + if window.is_empty() { 0 } else { sep_len };
                }
            }
            total += len + if window.is_empty() { 0 } else { sep_len };
            window.push_back(piece);
        }
        if !window.is_empty() {
            push_trimmed(&mut out, &join(&window, separator));
        }
        out
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn join(window: &VecDeque<&str>, separator: &str) -> String {
    window.iter().copied().collect::<Vec<_>>().join(separator)
}

fn push_trimmed(out: &mut Vec<String>, s: &str) {
    let t = s.trim();
    if !t.is_empty() {
        out.push(t.to_string());
    }
}
