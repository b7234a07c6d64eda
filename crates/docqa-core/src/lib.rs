//! docqa-core
//!
//! Domain types, collaborator traits and the ingestion-side building blocks
//! (sources, chunking, corpus snapshot) shared by the index and pipeline crates.

pub mod chunker;
pub mod config;
pub mod corpus;
pub mod error;
pub mod sources;
pub mod terms;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
