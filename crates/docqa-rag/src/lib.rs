//! Question answering over an ingested corpus: semantic retrieval, optional
//! hybrid reranking, and an abstention policy, plus the ingestion and
//! evaluation drivers built on them.
pub mod abstain;
pub mod eval;
pub mod ingest;
pub mod pipeline;
pub mod rerank;
pub mod retriever;

pub use abstain::{decide, Decision};
pub use eval::{evaluate, load_questions, render_markdown, EvalCell, EvalQuestion, EvalRow};
pub use ingest::Ingestor;
pub use pipeline::{PipelineSettings, QueryPipeline};
pub use rerank::{BlendEffect, RerankOutcome, Reranker};
pub use retriever::Retriever;
