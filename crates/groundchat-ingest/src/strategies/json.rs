//! JSON documents.
//!
//! Valid JSON is flattened into `path: value` lines so scalar fields stay
//! attached to their keys after chunking. Bytes that fail to parse as JSON
//! are taken as raw text instead.

use groundchat_core::{DocChunk, FileResource};
use serde_json::Value;
use tracing::warn;

use crate::error::{IngestError, IngestResult};

use super::FormatStrategy;

pub struct JsonStrategy;

impl FormatStrategy for JsonStrategy {
    fn name(&self) -> &'static str {
        "json"
    }

    fn can_process(&self, resource: &FileResource) -> bool {
        resource.extension() == "json"
    }

    fn parse(&self, resource: &FileResource) -> IngestResult<Vec<DocChunk>> {
        match serde_json::from_slice::<Value>(&resource.bytes) {
            Ok(value) => {
                let mut lines = Vec::new();
                flatten(&value, "", &mut lines);
                Ok(vec![DocChunk::new(lines.join("\n"))])
            }
            Err(err) => {
                warn!(
                    filename = %resource.filename,
                    "JSON parse failed ({err}), treating as raw text"
                );
                let text =
                    std::str::from_utf8(&resource.bytes).map_err(|e| IngestError::Parse {
                        filename: resource.filename.clone(),
                        message: e.to_string(),
                    })?;
                Ok(vec![DocChunk::new(text)])
            }
        }
    }
}

fn flatten(value: &Value, path: &str, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let next = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                flatten(child, &next, out);
            }
        }
        Value::Array(items) => {
            for (idx, child) in items.iter().enumerate() {
                flatten(child, &format!("{path}[{idx}]"), out);
            }
        }
        Value::String(s) => out.push(format!("{path}: {s}")),
        scalar => out.push(format!("{path}: {scalar}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_nested_objects() {
        let body = br#"{"title": "Report", "author": {"name": "Ada"}, "tags": ["a", "b"]}"#;
        let resource = FileResource::new("doc.json", body.to_vec());

        let chunks = JsonStrategy.parse(&resource).unwrap();
        let text = &chunks[0].text;
        assert!(text.contains("title: Report"));
        assert!(text.contains("author.name: Ada"));
        assert!(text.contains("tags[0]: a"));
        assert!(text.contains("tags[1]: b"));
    }

    #[test]
    fn invalid_json_falls_back_to_raw_text() {
        let resource = FileResource::new("almost.json", b"{not json but readable".to_vec());
        let chunks = JsonStrategy.parse(&resource).unwrap();
        assert_eq!(chunks[0].text, "{not json but readable");
    }

    #[test]
    fn invalid_json_and_invalid_utf8_is_a_parse_error() {
        let resource = FileResource::new("bad.json", vec![0xFF, 0xFE, 0x00]);
        let err = JsonStrategy.parse(&resource).unwrap_err();
        assert!(matches!(err, IngestError::Parse { .. }));
    }
}
