//! Error types for vector index operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Storage error: {0}")]
    Db(#[from] groundchat_db::DbError),

    #[error("Embedding model error: {0}")]
    Model(#[from] groundchat_ollama::OllamaError),

    #[error("Invalid filter expression: {0}")]
    InvalidFilter(String),
}

pub type IndexResult<T> = Result<T, IndexError>;
