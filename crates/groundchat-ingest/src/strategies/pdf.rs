//! PDF extraction.
//!
//! The primary pass splits extracted text into paragraphs so chunk
//! boundaries line up with the document's own structure. When that yields
//! nothing usable the whole page text is taken as-is.

use groundchat_core::{meta, DocChunk, FileResource};
use tracing::warn;

use crate::error::{IngestError, IngestResult};

use super::FormatStrategy;

pub struct PdfStrategy;

impl FormatStrategy for PdfStrategy {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn can_process(&self, resource: &FileResource) -> bool {
        resource.extension() == "pdf"
    }

    fn parse(&self, resource: &FileResource) -> IngestResult<Vec<DocChunk>> {
        match parse_paragraphs(resource) {
            Ok(chunks) => Ok(chunks),
            Err(err) => {
                warn!(
                    filename = %resource.filename,
                    "Paragraph extraction failed ({err}), falling back to page extraction"
                );
                parse_pages(resource)
            }
        }
    }
}

fn extract(resource: &FileResource) -> Result<String, String> {
    pdf_extract::extract_text_from_mem(&resource.bytes).map_err(|e| e.to_string())
}

/// One chunk per paragraph (blank-line separated), tagged with the page it
/// came from. Pages are delimited by the form feeds `pdf-extract` emits.
fn parse_paragraphs(resource: &FileResource) -> Result<Vec<DocChunk>, String> {
    let text = extract(resource)?;
    let mut chunks = Vec::new();
    for (page_idx, page) in text.split('\x0c').enumerate() {
        for paragraph in page.split("\n\n") {
            let paragraph = paragraph.trim();
            if !paragraph.is_empty() {
                chunks.push(
                    DocChunk::new(paragraph).with_meta(meta::PAGE_NUMBER, page_idx as u64 + 1),
                );
            }
        }
    }
    if chunks.is_empty() {
        return Err("no text extracted".to_string());
    }
    Ok(chunks)
}

/// One chunk per page, text taken verbatim.
fn parse_pages(resource: &FileResource) -> IngestResult<Vec<DocChunk>> {
    let text = extract(resource).map_err(|message| IngestError::Parse {
        filename: resource.filename.clone(),
        message,
    })?;

    let chunks: Vec<DocChunk> = text
        .split('\x0c')
        .enumerate()
        .filter(|(_, page)| !page.trim().is_empty())
        .map(|(page_idx, page)| {
            DocChunk::new(page.trim()).with_meta(meta::PAGE_NUMBER, page_idx as u64 + 1)
        })
        .collect();

    if chunks.is_empty() {
        return Err(IngestError::Parse {
            filename: resource.filename.clone(),
            message: "no text extracted".to_string(),
        });
    }
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_pdf_bytes() {
        let resource = FileResource::new("broken.pdf", b"not a pdf at all".to_vec());
        let err = PdfStrategy.parse(&resource).unwrap_err();
        assert!(matches!(err, IngestError::Parse { filename, .. } if filename == "broken.pdf"));
    }

    #[test]
    fn claims_only_pdf_extension() {
        assert!(PdfStrategy.can_process(&FileResource::new("a.pdf", vec![])));
        assert!(!PdfStrategy.can_process(&FileResource::new("a.txt", vec![])));
    }
}
