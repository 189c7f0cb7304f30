//! Plain text and markdown.

use groundchat_core::{DocChunk, FileResource};
use tracing::warn;

use crate::error::IngestResult;

use super::FormatStrategy;

pub struct TextStrategy;

impl FormatStrategy for TextStrategy {
    fn name(&self) -> &'static str {
        "text"
    }

    fn can_process(&self, resource: &FileResource) -> bool {
        matches!(resource.extension().as_str(), "txt" | "md")
    }

    fn parse(&self, resource: &FileResource) -> IngestResult<Vec<DocChunk>> {
        // Strict UTF-8 first; files with stray bytes get a lossy decode.
        let text = match std::str::from_utf8(&resource.bytes) {
            Ok(text) => text.to_string(),
            Err(err) => {
                warn!(
                    filename = %resource.filename,
                    "Invalid UTF-8 at byte {}, decoding lossily",
                    err.valid_up_to()
                );
                String::from_utf8_lossy(&resource.bytes).into_owned()
            }
        };
        Ok(vec![DocChunk::new(text)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_utf8_content() {
        let resource = FileResource::new("notes.txt", "hello world".as_bytes().to_vec());
        let chunks = TextStrategy.parse(&resource).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "hello world");
    }

    #[test]
    fn decodes_invalid_utf8_lossily() {
        let resource = FileResource::new("mixed.txt", vec![b'o', b'k', 0xFF, b'!']);
        let chunks = TextStrategy.parse(&resource).unwrap();
        assert!(chunks[0].text.starts_with("ok"));
        assert!(chunks[0].text.ends_with('!'));
    }

    #[test]
    fn claims_txt_and_md() {
        assert!(TextStrategy.can_process(&FileResource::new("a.txt", vec![])));
        assert!(TextStrategy.can_process(&FileResource::new("a.md", vec![])));
        assert!(!TextStrategy.can_process(&FileResource::new("a.rs", vec![])));
    }
}
