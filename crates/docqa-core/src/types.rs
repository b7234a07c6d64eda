//! Domain types shared by ingestion, the indexes and the query pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

pub type ChunkId = String;

/// A source document after text extraction.
///
/// - `id`: stable document identity (manifest id or file stem)
/// - `title`: human-readable name shown next to answers
/// - `source_path`: where the text was extracted from
/// - `text`: the full extracted text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub source_path: String,
    pub text: String,
}

/// A bounded passage of a document that is independently embedded and indexed.
///
/// - `id`: `"{doc_id}-{chunk_index}"`, unique across the corpus
/// - `chunk_index`/`total_chunks`: position within the parent document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: ChunkId,
    pub doc_id: String,
    pub content: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
}

/// A retrieval hit: chunk id plus cosine similarity, higher is better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub chunk_id: ChunkId,
    pub score: f32,
}

impl Candidate {
    pub fn new(chunk_id: impl Into<ChunkId>, score: f32) -> Self {
        Self { chunk_id: chunk_id.into(), score }
    }
}

/// A candidate after hybrid rescoring.
///
/// `blended_score = α·semantic_score + (1−α)·normalized_keyword_score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerankedCandidate {
    pub chunk_id: ChunkId,
    pub blended_score: f32,
    pub semantic_score: f32,
    pub keyword_score: f32,
    pub normalized_keyword_score: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Semantic similarity only.
    Baseline,
    /// Semantic retrieval with a wider fan-out, then hybrid rescoring.
    #[default]
    Reranked,
}

impl SearchMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchMode::Baseline => "baseline",
            SearchMode::Reranked => "reranked",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "baseline" => Ok(SearchMode::Baseline),
            "reranked" => Ok(SearchMode::Reranked),
            other => Err(Error::InvalidInput(format!(
                "Mode must be 'baseline' or 'reranked', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub q: String,
    pub k: usize,
    #[serde(default)]
    pub mode: SearchMode,
}

impl QueryRequest {
    pub fn new(q: impl Into<String>, k: usize, mode: SearchMode) -> Self {
        Self { q: q.into(), k, mode }
    }
}

/// One ranked passage returned alongside the outcome.
///
/// `score` is the score the outcome was decided on: cosine similarity in
/// baseline mode, the blended score in reranked mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    pub chunk_id: ChunkId,
    pub source_id: String,
    pub title: String,
    pub content: String,
    pub score: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_score: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword_score: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub chunk_id: ChunkId,
    pub source_id: String,
    pub title: String,
    pub score: f32,
}

/// Why the pipeline declined to answer.
///
/// `top_score` is `None` when retrieval produced no candidate at all.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Abstention {
    pub top_score: Option<f32>,
    pub threshold: f32,
}

impl Abstention {
    pub fn reason(&self) -> String {
        match self.top_score {
            Some(score) => format!(
                "Top result score ({score:.2}) is below the threshold of {}.",
                self.threshold
            ),
            None => "No relevant documents found.".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Answer(Answer),
    Abstain(Abstention),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub mode: SearchMode,
    pub outcome: Outcome,
    pub contexts: Vec<Context>,
    pub reranker_used: bool,
    /// True when reranked mode fell back to semantic ordering.
    pub keyword_degraded: bool,
}

impl QueryResponse {
    pub fn answer(&self) -> Option<&Answer> {
        match &self.outcome {
            Outcome::Answer(a) => Some(a),
            Outcome::Abstain(_) => None,
        }
    }

    pub fn abstention(&self) -> Option<&Abstention> {
        match &self.outcome {
            Outcome::Answer(_) => None,
            Outcome::Abstain(a) => Some(a),
        }
    }

    pub fn is_abstained(&self) -> bool {
        self.abstention().is_some()
    }

    pub fn top_score(&self) -> Option<f32> {
        self.contexts.first().map(|c| c.score)
    }
}
