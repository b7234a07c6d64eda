use tracing::debug;

use docqa_core::config::RetrievalSettings;
use docqa_core::corpus::Corpus;
use docqa_core::error::{Error, Result};
use docqa_core::traits::{Embedder, KeywordIndex, VectorIndex};
use docqa_core::types::{
    Abstention, Answer, Candidate, Context, Outcome, QueryRequest, QueryResponse, RerankedCandidate, SearchMode,
};

use crate::abstain::{decide, Decision};
use crate::rerank::Reranker;
use crate::retriever::{validate_query, Retriever};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineSettings {
    pub fanout: usize,
    pub alpha: f32,
    pub abstain_threshold: f32,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from(&RetrievalSettings::default())
    }
}

impl From<&RetrievalSettings> for PipelineSettings {
    fn from(r: &RetrievalSettings) -> Self {
        Self { fanout: r.fanout, alpha: r.alpha, abstain_threshold: r.abstain_threshold }
    }
}

/// Read-only query path over one ingested corpus.
///
/// Holds shared references only, so one pipeline can serve any number of
/// independent queries.
pub struct QueryPipeline<'a> {
    retriever: Retriever<'a>,
    reranker: Reranker<'a>,
    corpus: &'a Corpus,
    settings: PipelineSettings,
}

impl<'a> QueryPipeline<'a> {
    pub fn new(
        embedder: &'a dyn Embedder,
        vectors: &'a dyn VectorIndex,
        keywords: &'a dyn KeywordIndex,
        corpus: &'a Corpus,
        settings: PipelineSettings,
    ) -> Result<Self> {
        if settings.fanout == 0 {
            return Err(Error::InvalidConfig("fanout must be >= 1".into()));
        }
        if !settings.abstain_threshold.is_finite() {
            return Err(Error::InvalidConfig("abstain threshold must be finite".into()));
        }
        corpus.check_embedder(embedder)?;
        Ok(Self {
            retriever: Retriever::new(embedder, vectors),
            reranker: Reranker::new(keywords, settings.alpha)?,
            corpus,
            settings,
        })
    }

    pub fn ask(&self, request: &QueryRequest) -> Result<QueryResponse> {
        validate_query(&request.q, request.k)?;
        let response = match request.mode {
            SearchMode::Baseline => self.ask_baseline(&request.q, request.k)?,
            SearchMode::Reranked => self.ask_reranked(&request.q, request.k)?,
        };
        debug!(
            mode = %request.mode,
            k = request.k,
            abstained = response.is_abstained(),
            top_score = ?response.top_score(),
            degraded = response.keyword_degraded,
            "answered query"
        );
        Ok(response)
    }

    fn ask_baseline(&self, query: &str, k: usize) -> Result<QueryResponse> {
        let candidates = self.retriever.retrieve(query, k)?;
        let contexts = candidates
            .iter()
            .map(|c| self.context(c, None))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.respond(SearchMode::Baseline, contexts, false, false))
    }

    fn ask_reranked(&self, query: &str, k: usize) -> Result<QueryResponse> {
        let k_wide = k.saturating_mul(self.settings.fanout);
        let candidates = self.retriever.retrieve(query, k_wide)?;
        if candidates.is_empty() {
            return Ok(self.respond(SearchMode::Reranked, Vec::new(), false, false));
        }
        let outcome = self.reranker.rerank(query, &candidates, k);
        debug!(k_wide, kept = outcome.candidates.len(), degraded = outcome.degraded, "reranked");
        let contexts = outcome
            .candidates
            .iter()
            .map(|r| self.context(&Candidate::new(r.chunk_id.clone(), r.blended_score), Some(r)))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.respond(SearchMode::Reranked, contexts, true, outcome.degraded))
    }

    fn context(&self, candidate: &Candidate, reranked: Option<&RerankedCandidate>) -> Result<Context> {
        let chunk = self.corpus.chunk(&candidate.chunk_id).ok_or_else(|| {
            Error::Operation(format!("chunk '{}' is indexed but missing from the corpus", candidate.chunk_id))
        })?;
        let title = self
            .corpus
            .document(&chunk.doc_id)
            .map(|d| d.title.clone())
            .unwrap_or_else(|| chunk.doc_id.clone());
        Ok(Context {
            chunk_id: chunk.id.clone(),
            source_id: chunk.doc_id.clone(),
            title,
            content: chunk.content.clone(),
            score: candidate.score,
            semantic_score: reranked.map(|r| r.semantic_score),
            keyword_score: reranked.map(|r| r.keyword_score),
        })
    }

    fn respond(&self, mode: SearchMode, contexts: Vec<Context>, reranker_used: bool, keyword_degraded: bool) -> QueryResponse {
        let threshold = self.settings.abstain_threshold;
        let outcome = match contexts.first() {
            None => Outcome::Abstain(Abstention { top_score: None, threshold }),
            Some(top) => match decide(top.score, threshold) {
                Decision::Answer => Outcome::Answer(Answer {
                    text: top.content.clone(),
                    chunk_id: top.chunk_id.clone(),
                    source_id: top.source_id.clone(),
                    title: top.title.clone(),
                    score: top.score,
                }),
                Decision::Abstain { top_score, threshold } => {
                    Outcome::Abstain(Abstention { top_score: Some(top_score), threshold })
                }
            },
        };
        QueryResponse { mode, outcome, contexts, reranker_used, keyword_degraded }
    }
}
