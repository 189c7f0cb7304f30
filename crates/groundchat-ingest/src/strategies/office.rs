//! Office OOXML extraction (docx, pptx, xlsx).
//!
//! OOXML files are zip archives of XML parts. The primary pass reads the
//! format's main part with an awareness of its structure (paragraphs,
//! slides, shared strings); the fallback scrapes text nodes out of every
//! XML entry in the archive.

use std::io::{Cursor, Read};

use groundchat_core::{meta, DocChunk, FileResource};
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::warn;

use crate::error::{IngestError, IngestResult};

use super::FormatStrategy;

const EXTENSIONS: [&str; 3] = ["docx", "pptx", "xlsx"];

pub struct OfficeStrategy;

impl FormatStrategy for OfficeStrategy {
    fn name(&self) -> &'static str {
        "office"
    }

    fn can_process(&self, resource: &FileResource) -> bool {
        EXTENSIONS.contains(&resource.extension().as_str())
    }

    fn parse(&self, resource: &FileResource) -> IngestResult<Vec<DocChunk>> {
        let primary = match resource.extension().as_str() {
            "docx" => parse_docx(&resource.bytes).map(|text| vec![DocChunk::new(text)]),
            "pptx" => parse_pptx(&resource.bytes).map(|slides| {
                slides
                    .into_iter()
                    .map(|(number, text)| {
                        DocChunk::new(text).with_meta(meta::PAGE_NUMBER, number as u64)
                    })
                    .collect()
            }),
            "xlsx" => parse_xlsx(&resource.bytes).map(|text| vec![DocChunk::new(text)]),
            other => Err(format!("unexpected extension {other}")),
        };

        match primary {
            Ok(chunks) if chunks.iter().any(|c| !c.text.trim().is_empty()) => Ok(chunks),
            Ok(_) => fallback(resource, "empty result"),
            Err(err) => fallback(resource, &err),
        }
    }
}

fn fallback(resource: &FileResource, reason: &str) -> IngestResult<Vec<DocChunk>> {
    warn!(
        filename = %resource.filename,
        "Structured extraction failed ({reason}), scraping all XML parts"
    );
    let text = scrape_all_xml(&resource.bytes).map_err(|message| IngestError::Parse {
        filename: resource.filename.clone(),
        message,
    })?;
    if text.trim().is_empty() {
        return Err(IngestError::Parse {
            filename: resource.filename.clone(),
            message: "no text extracted".to_string(),
        });
    }
    Ok(vec![DocChunk::new(text)])
}

fn open_archive(bytes: &[u8]) -> Result<zip::ZipArchive<Cursor<&[u8]>>, String> {
    zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| e.to_string())
}

fn read_entry(archive: &mut zip::ZipArchive<Cursor<&[u8]>>, name: &str) -> Result<String, String> {
    let mut entry = archive.by_name(name).map_err(|e| e.to_string())?;
    let mut xml = String::new();
    entry.read_to_string(&mut xml).map_err(|e| e.to_string())?;
    Ok(xml)
}

/// Text of every `<tag>` element, with `sep` between container elements.
fn tag_text(xml: &str, tag: &[u8], container: &[u8], sep: char) -> Result<String, String> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_tag = false;
    loop {
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Start(e) if e.name().as_ref() == tag => in_tag = true,
            Event::End(e) => {
                let name = e.name();
                if name.as_ref() == tag {
                    in_tag = false;
                } else if name.as_ref() == container {
                    out.push(sep);
                }
            }
            Event::Text(t) if in_tag => out.push_str(&t.unescape().map_err(|e| e.to_string())?),
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(out)
}

/// Word: paragraph runs from the main document part.
fn parse_docx(bytes: &[u8]) -> Result<String, String> {
    let mut archive = open_archive(bytes)?;
    let xml = read_entry(&mut archive, "word/document.xml")?;
    tag_text(&xml, b"w:t", b"w:p", '\n')
}

/// PowerPoint: one entry per slide, numbered from 1.
fn parse_pptx(bytes: &[u8]) -> Result<Vec<(usize, String)>, String> {
    let mut archive = open_archive(bytes)?;
    let mut slides = Vec::new();
    for number in 1usize.. {
        let xml = match read_entry(&mut archive, &format!("ppt/slides/slide{number}.xml")) {
            Ok(xml) => xml,
            Err(_) => break,
        };
        slides.push((number, tag_text(&xml, b"a:t", b"a:p", '\n')?));
    }
    if slides.is_empty() {
        return Err("no slides found".to_string());
    }
    Ok(slides)
}

/// Excel: the shared-strings table holds the workbook's cell text.
fn parse_xlsx(bytes: &[u8]) -> Result<String, String> {
    let mut archive = open_archive(bytes)?;
    let xml = read_entry(&mut archive, "xl/sharedStrings.xml")?;
    tag_text(&xml, b"t", b"si", '\n')
}

/// Last resort: every text node of every XML part in the archive.
fn scrape_all_xml(bytes: &[u8]) -> Result<String, String> {
    let mut archive = open_archive(bytes)?;
    let names: Vec<String> = archive
        .file_names()
        .filter(|n| n.ends_with(".xml"))
        .map(String::from)
        .collect();

    let mut out = String::new();
    for name in names {
        let xml = read_entry(&mut archive, &name)?;
        let mut reader = Reader::from_str(&xml);
        loop {
            match reader.read_event().map_err(|e| e.to_string())? {
                Event::Text(t) => {
                    let text = t.unescape().map_err(|e| e.to_string())?;
                    if !text.trim().is_empty() {
                        out.push_str(text.trim());
                        out.push(' ');
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }
    }
    Ok(out)
}
