use std::path::{Path, PathBuf};
use std::sync::Once;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use docqa_core::chunker::Chunker;
use docqa_core::config::{Config, IndexSettings, Settings};
use docqa_core::corpus::Corpus;
use docqa_core::sources::{load_directory, load_manifest};
use docqa_core::traits::{Embedder, KeywordIndex};
use docqa_core::types::{Document, Outcome, QueryRequest, QueryResponse, SearchMode};
use docqa_embed::embedder_from_settings;
use docqa_rag::{evaluate, load_questions, render_markdown, Ingestor, PipelineSettings, QueryPipeline};
use docqa_text::{TantivyKeywordIndex, UnavailableKeywordIndex};
use docqa_vector::LanceVectorIndex;

static INIT: Once = Once::new();

/// Reads `DOCQA_LOG`, then `RUST_LOG`; defaults to `info`. Logs go to stderr.
fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("DOCQA_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("info"));
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .with(filter)
            .init();
    });
}

#[derive(Parser)]
#[command(name = "docqa", version, about = "Question answering over a local document corpus")]
struct Cli {
    /// Directory holding config.toml; relative paths in the config resolve against it.
    #[arg(long, global = true, default_value = ".")]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract, chunk and embed the sources, rebuilding the indexes.
    Ingest {
        /// sources.json manifest of { id, title, path } entries.
        #[arg(long, conflicts_with = "dir")]
        sources: Option<PathBuf>,
        /// Directory walked for .pdf and .txt files.
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Answer one question.
    Ask {
        question: String,
        #[arg(short, long)]
        k: Option<usize>,
        #[arg(long)]
        mode: Option<SearchMode>,
        /// Print the full response as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Compare baseline and reranked answers for a questions file.
    Eval {
        questions: PathBuf,
        #[arg(short, long, default_value_t = 1)]
        k: usize,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = Config::load_from_dir(&cli.config_dir)?;
    let settings = config.settings()?;

    match cli.command {
        Command::Ingest { sources, dir } => ingest(&config, &settings, sources, dir),
        Command::Ask { question, k, mode, json } => {
            let stack = QueryStack::open(&config, &settings)?;
            let pipeline = stack.pipeline(&settings)?;
            let request = QueryRequest::new(
                question,
                k.unwrap_or(settings.retrieval.default_k),
                mode.unwrap_or(settings.retrieval.default_mode),
            );
            let response = pipeline.ask(&request)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                print_response(&response);
            }
            Ok(())
        }
        Command::Eval { questions, k } => {
            let questions = load_questions(&questions)?;
            let stack = QueryStack::open(&config, &settings)?;
            let pipeline = stack.pipeline(&settings)?;
            let rows = evaluate(&pipeline, &questions, k);
            println!("{}", render_markdown(&rows));
            Ok(())
        }
    }
}

fn ingest(config: &Config, settings: &Settings, sources: Option<PathBuf>, dir: Option<PathBuf>) -> Result<()> {
    let documents = load_documents(config, settings, sources, dir)?;
    let index_root = config.resolve_path(&settings.index.dir);
    let embedder = load_embedder(config, settings)?;

    let mut vectors =
        LanceVectorIndex::create(&IndexSettings::lancedb_dir(&index_root), &settings.index.lancedb_table, embedder.dim())?;
    let mut keywords = TantivyKeywordIndex::create(IndexSettings::tantivy_dir(&index_root))?;
    let chunker = Chunker::new(settings.chunking.clone())?;

    let corpus = Ingestor::new(embedder.as_ref(), chunker, settings.embedding.batch_size)
        .with_progress(true)
        .ingest(documents, &mut vectors, &mut keywords)?;
    let corpus_path = IndexSettings::corpus_path(&index_root);
    corpus.save(&corpus_path)?;
    info!(
        documents = corpus.documents().len(),
        chunks = corpus.chunks().len(),
        snapshot = %corpus_path.display(),
        "ingest complete"
    );
    println!("Ingested {} documents into {} chunks", corpus.documents().len(), corpus.chunks().len());
    Ok(())
}

fn load_documents(
    config: &Config,
    settings: &Settings,
    sources: Option<PathBuf>,
    dir: Option<PathBuf>,
) -> Result<Vec<Document>> {
    if let Some(manifest) = sources {
        return load_manifest(&manifest);
    }
    if let Some(dir) = dir {
        return load_directory(&dir);
    }
    let manifest = config.resolve_path(&settings.data.sources_manifest);
    if manifest.exists() {
        load_manifest(&manifest)
    } else {
        info!(manifest = %manifest.display(), "no manifest, walking the documents directory");
        load_directory(&config.resolve_path(&settings.data.docs_dir))
    }
}

fn load_embedder(config: &Config, settings: &Settings) -> Result<Box<dyn Embedder>> {
    let model_dir = config.resolve_path(&settings.embedding.model_dir);
    embedder_from_settings(&settings.embedding, &model_dir)
}

/// Everything a query needs, opened read-only from the last ingest.
struct QueryStack {
    embedder: Box<dyn Embedder>,
    vectors: LanceVectorIndex,
    keywords: Box<dyn KeywordIndex>,
    corpus: Corpus,
}

impl QueryStack {
    fn open(config: &Config, settings: &Settings) -> Result<Self> {
        let index_root = config.resolve_path(&settings.index.dir);
        let corpus = Corpus::load(&IndexSettings::corpus_path(&index_root))?;
        let embedder = load_embedder(config, settings)?;
        let vectors =
            LanceVectorIndex::open(&IndexSettings::lancedb_dir(&index_root), &settings.index.lancedb_table, corpus.dim())?;
        let keywords = open_keywords(&IndexSettings::tantivy_dir(&index_root));
        Ok(Self { embedder, vectors, keywords, corpus })
    }

    fn pipeline(&self, settings: &Settings) -> Result<QueryPipeline<'_>> {
        Ok(QueryPipeline::new(
            self.embedder.as_ref(),
            &self.vectors,
            self.keywords.as_ref(),
            &self.corpus,
            PipelineSettings::from(&settings.retrieval),
        )?)
    }
}

/// A missing or corrupt keyword index degrades reranking instead of failing the query.
fn open_keywords(dir: &Path) -> Box<dyn KeywordIndex> {
    match TantivyKeywordIndex::open(dir.to_path_buf()) {
        Ok(index) => Box::new(index),
        Err(e) => {
            warn!(dir = %dir.display(), error = %format!("{e:#}"), "keyword index unavailable; reranking will fall back to semantic order");
            Box::new(UnavailableKeywordIndex::new(format!("{e:#}")))
        }
    }
}

fn print_response(response: &QueryResponse) {
    match &response.outcome {
        Outcome::Answer(answer) => {
            println!("{}\n", answer.text);
            println!("Source: {} ({}) score {:.3}", answer.title, answer.source_id, answer.score);
        }
        Outcome::Abstain(abstention) => println!("Abstained: {}", abstention.reason()),
    }
    if response.keyword_degraded {
        println!("(keyword index unavailable; semantic ranking only)");
    }
    if !response.contexts.is_empty() {
        println!("\nContexts ({} mode):", response.mode);
        for (i, c) in response.contexts.iter().enumerate() {
            println!("  {}. [{:.3}] {} / {}", i + 1, c.score, c.title, c.chunk_id);
        }
    }
}
