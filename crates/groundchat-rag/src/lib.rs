//! Groundchat RAG - retrieval orchestration and chat sessions.
//!
//! Retrieval expands the user's question into several phrasings, searches
//! the vector index for each, and pools the deduplicated results. Chat
//! wraps retrieval with session memory, prompt assembly, and streaming
//! generation with cancellation.

pub mod augment;
pub mod cancel;
pub mod chat;
pub mod error;
pub mod expand;
pub mod memory;
pub mod retrieval;

pub use augment::{build_prompt, AugmentedContext};
pub use cancel::{cancel_pair, CancelHandle, CancelToken};
pub use chat::{ChatOrchestrator, ChatRequest, ChatStream, TurnOutcome};
pub use error::{RagError, RagResult};
pub use expand::{LlmQueryExpander, QueryExpansion};
pub use memory::ChatMemory;
pub use retrieval::{dedup_rerank, RetrievalOrchestrator};
