//! Model-generated document summaries.

use groundchat_core::{meta, DocChunk};
use groundchat_ollama::{GenerateOptions, GenerateRequest, OllamaClient};
use tracing::{debug, warn};

/// Upper bound on the text sent to the model for summarization.
const MAX_SUMMARY_INPUT_CHARS: usize = 4_000;

/// Attaches a short model-generated summary to every chunk of a document.
/// Enrichment is best-effort: if the model is unavailable the chunks pass
/// through unchanged.
pub struct SummaryEnricher {
    client: OllamaClient,
    model: String,
}

impl SummaryEnricher {
    pub fn new(client: OllamaClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub async fn apply(&self, chunks: Vec<DocChunk>) -> Vec<DocChunk> {
        if chunks.is_empty() {
            return chunks;
        }

        let mut combined = String::new();
        for chunk in &chunks {
            if !combined.is_empty() {
                combined.push(' ');
            }
            combined.push_str(&chunk.text);
            if combined.chars().count() >= MAX_SUMMARY_INPUT_CHARS {
                combined = combined.chars().take(MAX_SUMMARY_INPUT_CHARS).collect();
                break;
            }
        }

        let prompt = format!(
            "Summarize the following document in 2-3 sentences. \
             Respond with the summary only, no preamble.\n\n{combined}"
        );
        let request = GenerateRequest::new(&self.model, prompt)
            .with_options(GenerateOptions::new().with_temperature(0.3).with_num_predict(200));

        match self.client.generate(request).await {
            Ok(response) => {
                let summary = response.response.trim().to_string();
                debug!("Generated {}-char summary", summary.len());
                chunks
                    .into_iter()
                    .map(|chunk| chunk.with_meta(meta::SUMMARY, summary.clone()))
                    .collect()
            }
            Err(err) => {
                warn!("Summary enrichment skipped: {err}");
                chunks
            }
        }
    }
}
