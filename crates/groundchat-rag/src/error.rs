use thiserror::Error;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("Database error: {0}")]
    Database(#[from] groundchat_db::DbError),

    #[error("Vector index error: {0}")]
    Index(#[from] groundchat_index::IndexError),

    #[error("Model error: {0}")]
    Model(#[from] groundchat_ollama::OllamaError),
}

pub type RagResult<T> = Result<T, RagError>;
