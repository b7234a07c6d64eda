use anyhow::{Context as _, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, ConstScoreQuery, Occur, Query, QueryParser, TermSetQuery};
use tantivy::schema::{Field, Value};
use tantivy::{doc, Index, IndexWriter, TantivyDocument, Term};
use tracing::{debug, info};

use docqa_core::terms::analyze;
use docqa_core::traits::KeywordIndex;
use docqa_core::types::ChunkId;

use crate::tantivy_utils::{build_schema, register_tokenizer, sanitize_query};

const WRITER_MEMORY_BYTES: usize = 50_000_000;
/// Hit limit for searches that are not restricted to a candidate set.
const CORPUS_WIDE_LIMIT: usize = 100;

pub struct TantivyKeywordIndex {
	index: Index,
	writer: Option<IndexWriter>,
	id_field: Field,
	text_field: Field,
}

impl TantivyKeywordIndex {
	/// Create a fresh on-disk index, deleting whatever was at `index_dir`.
	pub fn create(index_dir: PathBuf) -> Result<Self> {
		if index_dir.exists() { std::fs::remove_dir_all(&index_dir)?; }
		std::fs::create_dir_all(&index_dir)?;
		let index = Index::create_in_dir(&index_dir, build_schema())
			.with_context(|| format!("creating tantivy index at {}", index_dir.display()))?;
		info!(dir = %index_dir.display(), "created keyword index");
		Self::from_index(index)
	}

	pub fn open(index_dir: PathBuf) -> Result<Self> {
		let index = Index::open_in_dir(&index_dir)
			.with_context(|| format!("opening tantivy index at {}", index_dir.display()))?;
		Self::from_index(index)
	}

	pub fn in_memory() -> Result<Self> {
		Self::from_index(Index::create_in_ram(build_schema()))
	}

	fn from_index(index: Index) -> Result<Self> {
		register_tokenizer(&index);
		let schema = index.schema();
		let id_field = schema.get_field("id")?;
		let text_field = schema.get_field("text")?;
		Ok(Self { index, writer: None, id_field, text_field })
	}

	pub fn num_docs(&self) -> Result<u64> {
		Ok(self.index.reader()?.searcher().num_docs())
	}

	fn build_query(&self, query: &str, candidate_ids: Option<&[ChunkId]>) -> Box<dyn Query> {
		let mut parser = QueryParser::for_index(&self.index, vec![self.text_field]);
		// every content term must occur; a single shared word is not a match
		parser.set_conjunction_by_default();
		let (text_query, errors) = parser.parse_query_lenient(&sanitize_query(query));
		if !errors.is_empty() { debug!(?errors, "lenient keyword query parse"); }
		let Some(ids) = candidate_ids else { return text_query };
		let terms: Vec<Term> = ids.iter().map(|id| Term::from_field_text(self.id_field, id)).collect();
		// zero-scored filter so the BM25 score of the text clause is reported unchanged
		let restrict = ConstScoreQuery::new(Box::new(TermSetQuery::new(terms)), 0.0);
		Box::new(BooleanQuery::new(vec![(Occur::Must, text_query), (Occur::Must, Box::new(restrict) as Box<dyn Query>)]))
	}
}

impl KeywordIndex for TantivyKeywordIndex {
	fn add(&mut self, chunk_id: &str, text: &str) -> Result<()> {
		if self.writer.is_none() {
			let writer: IndexWriter = self.index.writer(WRITER_MEMORY_BYTES)?;
			self.writer = Some(writer);
		}
		if let Some(writer) = self.writer.as_mut() {
			writer.add_document(doc!(self.id_field => chunk_id.to_string(), self.text_field => text.to_string()))?;
		}
		Ok(())
	}

	fn commit(&mut self) -> Result<()> {
		if let Some(writer) = self.writer.as_mut() {
			writer.commit()?;
		}
		Ok(())
	}

	fn search(&self, query: &str, candidate_ids: Option<&[ChunkId]>) -> Result<HashMap<ChunkId, f32>> {
		let limit = candidate_ids.map_or(CORPUS_WIDE_LIMIT, <[ChunkId]>::len);
		if limit == 0 || analyze(query).is_empty() { return Ok(HashMap::new()); }
		let reader = self.index.reader()?;
		let searcher = reader.searcher();
		let q = self.build_query(query, candidate_ids);
		let top_docs = searcher.search(&q, &TopDocs::with_limit(limit))?;
		let mut scores = HashMap::with_capacity(top_docs.len());
		for (score, addr) in top_docs {
			let doc: TantivyDocument = searcher.doc(addr)?;
			if let Some(id) = doc.get_first(self.id_field).and_then(|v| v.as_str()) {
				scores.insert(id.to_string(), score);
			}
		}
		Ok(scores)
	}
}
