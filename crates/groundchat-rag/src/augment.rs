//! Prompt assembly: turning retrieved chunks and session history into the
//! system and user prompts sent to the model.

use groundchat_core::{meta, ChatMessage, DocChunk};

const PERSONA: &str = "You are a careful assistant that answers questions \
about the user's documents.";

const GROUNDING_RULES: &str = "Answer using the document context below. \
Quote or paraphrase the context rather than inventing details. If the \
context does not contain the answer, say so plainly.";

/// The ranked, deduplicated context for one turn. An empty context is a
/// valid state meaning the turn proceeds ungrounded.
#[derive(Debug, Clone, Default)]
pub struct AugmentedContext {
    chunks: Vec<DocChunk>,
}

impl AugmentedContext {
    pub fn new(chunks: Vec<DocChunk>) -> Self {
        Self { chunks }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn chunks(&self) -> &[DocChunk] {
        &self.chunks
    }

    pub fn into_chunks(self) -> Vec<DocChunk> {
        self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// The rendered context block, or `None` when there is nothing to ground
    /// the turn on.
    pub fn format(&self) -> Option<String> {
        if self.chunks.is_empty() {
            return None;
        }
        let blocks: Vec<String> = self.chunks.iter().map(format_chunk).collect();
        Some(blocks.join("\n\n"))
    }

    /// System prompt for a turn. With context the persona is extended with
    /// grounding rules and the rendered chunks; without context the model
    /// answers from general knowledge under the persona alone.
    pub fn system_prompt(&self) -> String {
        match self.format() {
            Some(block) => {
                format!("{PERSONA}\n\n{GROUNDING_RULES}\n\n--- Document context ---\n{block}")
            }
            None => PERSONA.to_string(),
        }
    }
}

/// Render one retrieved chunk as a labeled context block.
fn format_chunk(chunk: &DocChunk) -> String {
    let mut block = String::new();
    if let Some(file_name) = chunk.meta_str(meta::FILE_NAME) {
        block.push_str(&format!("[file_name]: {file_name}\n"));
    }
    if let Some(page) = chunk.meta_str(meta::PAGE_NUMBER) {
        block.push_str(&format!("[page_number]: {page}\n"));
    }
    block.push_str(&format!("[content]: {}", chunk.text));
    block
}

/// User prompt for a turn: prior session messages followed by the new
/// question, each line tagged with its speaker.
pub fn build_prompt(history: &[ChatMessage], message: &str) -> String {
    if history.is_empty() {
        return message.to_string();
    }

    let mut prompt = String::new();
    for entry in history {
        prompt.push_str(&format!("{}: {}\n", entry.role, entry.content));
    }
    prompt.push_str(&format!("user: {message}\nassistant:"));
    prompt
}
