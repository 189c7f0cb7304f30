//! Core domain types for groundchat.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for documents.
pub type DocumentId = String;

/// Unique identifier for chat sessions.
pub type ChatId = String;

/// Generate a new unique ID.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Well-known chunk metadata keys.
pub mod meta {
    /// Id of the owning [`DocumentRecord`](super::DocumentRecord).
    pub const DOCUMENT_ID: &str = "document_id";
    /// Id of the user who uploaded the document.
    pub const USER_ID: &str = "user_id";
    /// Original filename of the uploaded document.
    pub const FILE_NAME: &str = "file_name";
    /// Page (or slide) number the chunk was extracted from.
    pub const PAGE_NUMBER: &str = "page_number";
    /// Optional model-generated synopsis of the source document.
    pub const SUMMARY: &str = "summary";
}

/// A retrievable unit of text plus metadata.
///
/// Produced by the ingestion pipeline and stored in the vector index.
/// `score` is only set on chunks returned from a similarity search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocChunk {
    pub text: String,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl DocChunk {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: serde_json::Map::new(),
            score: None,
        }
    }

    /// Attach a metadata entry, overwriting any existing value for the key.
    pub fn with_meta(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }

    /// Merge `extra` into this chunk's metadata, overwriting on key collision.
    pub fn merge_metadata(&mut self, extra: &serde_json::Map<String, serde_json::Value>) {
        for (k, v) in extra {
            self.metadata.insert(k.clone(), v.clone());
        }
    }

    /// Metadata value rendered as a string, if present.
    pub fn meta_str(&self, key: &str) -> Option<String> {
        self.metadata.get(key).map(|v| match v {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

/// Persisted descriptor of an uploaded document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: DocumentId,
    pub user_id: String,
    pub filename: String,
    pub content_type: Option<String>,
    pub file_size: i64,
    /// Whether this document is part of the active retrieval set for its owner.
    pub on_chat: bool,
    pub created_at: DateTime<Utc>,
}

impl DocumentRecord {
    /// Create a record for a fresh upload. New documents start active.
    pub fn new(user_id: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            user_id: user_id.into(),
            filename: filename.into(),
            content_type: None,
            file_size: 0,
            on_chat: true,
            created_at: Utc::now(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_file_size(mut self, size: i64) -> Self {
        self.file_size = size;
        self
    }
}

/// Role of a message in a chat session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single message in a session's memory window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// An uploaded file at the ingestion boundary: raw bytes plus the
/// client-supplied name and content type.
#[derive(Debug, Clone)]
pub struct FileResource {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FileResource {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            bytes,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Lowercased filename extension, empty when absent.
    pub fn extension(&self) -> String {
        std::path::Path::new(&self.filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_starts_active() {
        let record = DocumentRecord::new("u1", "report.pdf")
            .with_content_type("application/pdf")
            .with_file_size(1024);

        assert!(record.on_chat);
        assert_eq!(record.user_id, "u1");
        assert_eq!(record.file_size, 1024);
        assert!(!record.id.is_empty());
    }

    #[test]
    fn test_metadata_merge_overwrites() {
        let mut chunk = DocChunk::new("hello").with_meta(meta::FILE_NAME, "a.txt");

        let mut extra = serde_json::Map::new();
        extra.insert(meta::FILE_NAME.into(), "b.txt".into());
        extra.insert(meta::DOCUMENT_ID.into(), "d1".into());
        chunk.merge_metadata(&extra);

        assert_eq!(chunk.meta_str(meta::FILE_NAME).as_deref(), Some("b.txt"));
        assert_eq!(chunk.meta_str(meta::DOCUMENT_ID).as_deref(), Some("d1"));
    }

    #[test]
    fn test_file_resource_extension() {
        let r = FileResource::new("Report.PDF", vec![]);
        assert_eq!(r.extension(), "pdf");

        let r = FileResource::new("noext", vec![]);
        assert_eq!(r.extension(), "");
    }
}
