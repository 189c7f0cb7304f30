use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Unsupported file format: {filename}")]
    UnsupportedFormat { filename: String },

    #[error("Failed to parse {filename}: {message}")]
    Parse { filename: String, message: String },

    #[error("Database error: {0}")]
    Database(#[from] groundchat_db::DbError),

    #[error("Vector index error: {0}")]
    Index(#[from] groundchat_index::IndexError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type IngestResult<T> = Result<T, IngestError>;
