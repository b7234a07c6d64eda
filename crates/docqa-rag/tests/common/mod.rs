#![allow(dead_code)]

use docqa_core::chunker::{Chunker, ChunkingConfig};
use docqa_core::corpus::Corpus;
use docqa_core::types::Document;
use docqa_embed::HashingEmbedder;
use docqa_rag::{Ingestor, PipelineSettings, QueryPipeline};
use docqa_text::TantivyKeywordIndex;
use docqa_vector::MemoryVectorIndex;

pub const MACHINE_GUARDING: &str = "Machine guarding protects workers from moving machine parts. \
Every guard must prevent contact with hazardous points of operation.";
pub const LOCKOUT: &str = "Lockout procedures isolate hazardous energy before maintenance begins. \
Each worker applies a personal lock.";
pub const PPE: &str = "Gloves, goggles and hearing protection are personal protective equipment.";
pub const EXITS: &str = "Emergency exits must stay clear so workers can find their way out. \
The best exit route is posted near each door.";

pub fn documents() -> Vec<Document> {
    [
        ("machine-guarding", "Machine Guarding Basics", MACHINE_GUARDING),
        ("lockout", "Lockout/Tagout", LOCKOUT),
        ("ppe", "Personal Protective Equipment", PPE),
        ("exits", "Emergency Exits", EXITS),
    ]
    .into_iter()
    .map(|(id, title, text)| Document {
        id: id.to_string(),
        title: title.to_string(),
        source_path: format!("data/{id}.pdf"),
        text: text.to_string(),
    })
    .collect()
}

pub struct Fixture {
    pub embedder: HashingEmbedder,
    pub vectors: MemoryVectorIndex,
    pub keywords: TantivyKeywordIndex,
    pub corpus: Corpus,
}

impl Fixture {
    pub fn new() -> Self {
        let embedder = HashingEmbedder::new(384);
        let mut vectors = MemoryVectorIndex::new();
        let mut keywords = TantivyKeywordIndex::in_memory().expect("keyword index");
        let chunker = Chunker::new(ChunkingConfig::default()).expect("chunker");
        let corpus = Ingestor::new(&embedder, chunker, 2)
            .ingest(documents(), &mut vectors, &mut keywords)
            .expect("ingest");
        Self { embedder, vectors, keywords, corpus }
    }

    pub fn pipeline(&self, settings: PipelineSettings) -> QueryPipeline<'_> {
        QueryPipeline::new(&self.embedder, &self.vectors, &self.keywords, &self.corpus, settings).expect("pipeline")
    }
}
