//! Groundchat DB - SQLite persistence for document records and indexed chunks.

mod database;
mod error;
mod migrations;
mod operations;

pub use database::Database;
pub use error::{DbError, DbResult};
pub use operations::chunks::{cosine_similarity, EmbeddedChunk};
