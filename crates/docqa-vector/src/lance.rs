//! LanceDB-backed vector index.
//!
//! The index exposes the synchronous `VectorIndex` trait and drives LanceDB
//! through a private tokio runtime; it must not be used from inside another
//! async runtime.
use anyhow::{anyhow, Result};
use arrow_array::{Array, FixedSizeListArray, Float32Array, RecordBatch, RecordBatchIterator, StringArray};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{Connection, DistanceType};
use std::path::Path;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::{debug, info};

use docqa_core::error::Error;
use docqa_core::traits::VectorIndex;
use docqa_core::types::ChunkId;

use crate::schema::build_arrow_schema;
use crate::table::{ensure_table, open_db, open_table_if_exists};

pub struct LanceVectorIndex {
	runtime: Runtime,
	db: Connection,
	table_name: String,
	dim: usize,
}

impl LanceVectorIndex {
	/// Fresh index at `db_path`; any previous database there is removed.
	pub fn create(db_path: &Path, table_name: &str, dim: usize) -> Result<Self> {
		if db_path.exists() { std::fs::remove_dir_all(db_path)?; }
		std::fs::create_dir_all(db_path)?;
		let index = Self::connect(db_path, table_name, dim)?;
		index.runtime.block_on(ensure_table(&index.db, &index.table_name, build_arrow_schema(dim)))?;
		info!(dir = %db_path.display(), table = table_name, dim, "created vector index");
		Ok(index)
	}

	pub fn open(db_path: &Path, table_name: &str, dim: usize) -> Result<Self> {
		if !db_path.is_dir() {
			return Err(Error::NotFound(format!("vector index {} (run `docqa ingest` first)", db_path.display())).into());
		}
		Self::connect(db_path, table_name, dim)
	}

	fn connect(db_path: &Path, table_name: &str, dim: usize) -> Result<Self> {
		let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
		let db = runtime.block_on(open_db(db_path.to_string_lossy().as_ref()))?;
		Ok(Self { runtime, db, table_name: table_name.to_string(), dim })
	}

	fn to_record_batch(&self, entries: &[(ChunkId, Vec<f32>)]) -> Result<RecordBatch> {
		let ids: Vec<&str> = entries.iter().map(|(id, _)| id.as_str()).collect();
		let vectors = entries.iter().map(|(_, v)| Some(v.iter().map(|&x| Some(x)).collect::<Vec<_>>()));
		let record_batch = RecordBatch::try_new(build_arrow_schema(self.dim), vec![
			Arc::new(StringArray::from(ids)),
			Arc::new(FixedSizeListArray::from_iter_primitive::<arrow_array::types::Float32Type, _, _>(vectors, self.dim as i32)),
		])?;
		Ok(record_batch)
	}

	fn check_dim(&self, vector: &[f32]) -> Result<()> {
		if vector.len() != self.dim {
			return Err(Error::InvalidInput(format!("vector has {} dims, index expects {}", vector.len(), self.dim)).into());
		}
		Ok(())
	}
}

impl VectorIndex for LanceVectorIndex {
	fn add(&mut self, chunk_id: &str, vector: &[f32]) -> Result<()> {
		self.add_batch(&[(chunk_id.to_string(), vector.to_vec())])
	}

	fn add_batch(&mut self, entries: &[(ChunkId, Vec<f32>)]) -> Result<()> {
		if entries.is_empty() { return Ok(()); }
		for (_, v) in entries { self.check_dim(v)?; }
		let record_batch = self.to_record_batch(entries)?;
		let schema = record_batch.schema();
		let reader = Box::new(RecordBatchIterator::new(vec![Ok(record_batch)].into_iter(), schema));
		self.runtime.block_on(async {
			match open_table_if_exists(&self.db, &self.table_name).await? {
				Some(table) => { table.add(reader).execute().await?; }
				None => { self.db.create_table(&self.table_name, reader).execute().await?; }
			}
			anyhow::Ok(())
		})?;
		debug!(rows = entries.len(), table = %self.table_name, "appended vectors");
		Ok(())
	}

	fn query(&self, vector: &[f32], n: usize) -> Result<Vec<(ChunkId, f32)>> {
		self.check_dim(vector)?;
		if n == 0 || vector.iter().all(|x| *x == 0.0) { return Ok(Vec::new()); }
		let batches: Vec<RecordBatch> = self.runtime.block_on(async {
			let Some(table) = open_table_if_exists(&self.db, &self.table_name).await? else { return anyhow::Ok(Vec::new()) };
			let stream = table.vector_search(vector.to_vec())?.distance_type(DistanceType::Cosine).limit(n).execute().await?;
			let batches: Vec<RecordBatch> = stream.try_collect().await?;
			Ok(batches)
		})?;
		let mut hits = Vec::new();
		for batch in &batches {
			let ids = string_column(batch, "id")?;
			let distances = float_column(batch, "_distance")?;
			for i in 0..batch.num_rows() {
				let score = 1.0 - distances.value(i);
				// zero-norm rows have no defined cosine similarity
				if score.is_finite() { hits.push((ids.value(i).to_string(), score)); }
			}
		}
		hits.sort_by(|a, b| b.1.total_cmp(&a.1));
		hits.truncate(n);
		Ok(hits)
	}

	fn len(&self) -> Result<usize> {
		self.runtime.block_on(async {
			match open_table_if_exists(&self.db, &self.table_name).await? {
				Some(table) => Ok(table.count_rows(None).await?),
				None => Ok(0),
			}
		})
	}
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
	batch.column_by_name(name)
		.and_then(|c| c.as_any().downcast_ref::<StringArray>())
		.ok_or_else(|| anyhow!("{name} column missing"))
}

fn float_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Float32Array> {
	batch.column_by_name(name)
		.and_then(|c| c.as_any().downcast_ref::<Float32Array>())
		.ok_or_else(|| anyhow!("{name} column missing"))
}
