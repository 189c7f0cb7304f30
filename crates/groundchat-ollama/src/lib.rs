//! Groundchat Ollama - Async client for the Ollama API.
//!
//! Provides text generation (blocking and streaming), embeddings, and an
//! availability probe. Streaming responses are delivered over a channel
//! and terminated by an explicit end-of-stream marker.

mod client;
mod error;
mod types;

pub use client::{OllamaClient, StreamEvent};
pub use error::{OllamaError, OllamaResult};
pub use types::*;
