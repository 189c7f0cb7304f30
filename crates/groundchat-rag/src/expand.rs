//! Query expansion.
//!
//! A single user question often misses relevant chunks because of phrasing.
//! The expander rewrites the question a few different ways; every phrasing
//! is searched and the results pooled.

use async_trait::async_trait;
use groundchat_ollama::{GenerateOptions, GenerateRequest, OllamaClient};
use tracing::{debug, warn};

/// Produces the set of phrasings to search for a query. The original query
/// is always part of the returned set.
#[async_trait]
pub trait QueryExpansion: Send + Sync {
    async fn expand(&self, query: &str) -> Vec<String>;
}

/// Expansion backed by the chat model. Failure is soft: if the model is
/// unreachable or returns nothing usable, only the original query is
/// searched.
pub struct LlmQueryExpander {
    client: OllamaClient,
    model: String,
    variants: usize,
}

impl LlmQueryExpander {
    pub fn new(client: OllamaClient, model: impl Into<String>, variants: usize) -> Self {
        Self {
            client,
            model: model.into(),
            variants,
        }
    }

    fn prompt(&self, query: &str) -> String {
        format!(
            "Rewrite the following search query in {n} different ways, each \
             keeping the full meaning of the original. Vary the wording and \
             structure so each version might match different documents. \
             Respond with the {n} rewrites only, one per line, no numbering.\n\n\
             Query: {query}",
            n = self.variants
        )
    }
}

#[async_trait]
impl QueryExpansion for LlmQueryExpander {
    async fn expand(&self, query: &str) -> Vec<String> {
        if self.variants == 0 {
            return vec![query.to_string()];
        }

        let request = GenerateRequest::new(&self.model, self.prompt(query))
            .with_options(GenerateOptions::new().with_temperature(0.7));

        let mut phrasings = vec![query.to_string()];
        match self.client.generate(request).await {
            Ok(response) => {
                phrasings.extend(
                    response
                        .response
                        .lines()
                        .map(|line| line.trim().trim_start_matches(['-', '*', ' ']).to_string())
                        .filter(|line| !line.is_empty() && line.as_str() != query)
                        .take(self.variants),
                );
                debug!("Expanded query into {} phrasing(s)", phrasings.len());
            }
            Err(err) => {
                warn!("Query expansion failed ({err}), searching the original only");
            }
        }
        phrasings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_names_the_variant_count() {
        let client = OllamaClient::from_config(&groundchat_config::OllamaConfig::default()).unwrap();
        let expander = LlmQueryExpander::new(client, "m", 3);
        let prompt = expander.prompt("what is a b-tree?");
        assert!(prompt.contains("3 different ways"));
        assert!(prompt.contains("what is a b-tree?"));
    }
}
