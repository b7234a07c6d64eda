//! docqa-text
//!
//! Tantivy-backed keyword index used by the reranker for BM25 match scores.

pub mod index;
pub mod tantivy_utils;
pub mod unavailable;

pub use index::TantivyKeywordIndex;
pub use unavailable::UnavailableKeywordIndex;
