use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Embedding provider or vector backend failed.
    #[error("Provider unavailable: {0}")]
    Provider(String),

    /// Keyword index failed; recovered inside the reranker.
    #[error("Keyword index unavailable: {0}")]
    KeywordIndex(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}

pub type Result<T> = std::result::Result<T, Error>;
