//! Vector indexes over chunk embeddings: LanceDB on disk, exact cosine in memory.
pub mod lance;
pub mod memory;
pub mod schema;
pub mod table;

pub use lance::LanceVectorIndex;
pub use memory::{cosine_similarity, MemoryVectorIndex};
