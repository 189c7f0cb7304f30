//! Ollama HTTP client.

use crate::error::{OllamaError, OllamaResult};
use crate::types::*;
use futures_util::StreamExt;
use groundchat_config::OllamaConfig;
use reqwest::Client;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Event on a streaming generation channel.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    /// An incremental output fragment.
    Token(String),
    /// End-of-stream marker. A channel that closes without this event
    /// terminated abnormally.
    Done,
}

/// Client for interacting with Ollama's API.
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    host: String,
    timeout: Duration,
}

impl OllamaClient {
    /// Create a new client from configuration.
    pub fn from_config(config: &OllamaConfig) -> OllamaResult<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds);

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(OllamaError::Http)?;

        Ok(Self {
            client,
            host: config.host.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Check if the Ollama server is available.
    pub async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.host);
        match self.client.get(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn request_error(&self, e: reqwest::Error) -> OllamaError {
        if e.is_connect() {
            OllamaError::ServerNotRunning {
                host: self.host.clone(),
            }
        } else if e.is_timeout() {
            OllamaError::Timeout {
                seconds: self.timeout.as_secs(),
            }
        } else {
            OllamaError::Http(e)
        }
    }

    async fn check_status(
        &self,
        response: reqwest::Response,
        model: &str,
    ) -> OllamaResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        if text.contains("not found") || status.as_u16() == 404 {
            return Err(OllamaError::ModelNotFound {
                model: model.to_string(),
            });
        }

        Err(OllamaError::ApiError {
            status: status.as_u16(),
            message: text,
        })
    }

    /// Generate an embedding for text.
    pub async fn embed(&self, model: &str, text: &str) -> OllamaResult<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.host);
        debug!(
            "Generating embedding with model {} for text length {}",
            model,
            text.len()
        );

        let request = EmbeddingRequest {
            model: model.to_string(),
            prompt: text.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let response = self.check_status(response, model).await?;
        let embedding_response: EmbeddingResponse = response.json().await?;
        Ok(embedding_response.embedding)
    }

    /// Generate embeddings for multiple texts.
    pub async fn embed_batch(&self, model: &str, texts: &[String]) -> OllamaResult<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(model, text).await?);
        }
        Ok(embeddings)
    }

    /// Generate text (non-streaming).
    pub async fn generate(&self, request: GenerateRequest) -> OllamaResult<GenerateResponse> {
        let url = format!("{}/api/generate", self.host);
        debug!("Generating with model {}", request.model);

        let mut request = request;
        request.stream = false;
        let model = request.model.clone();

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let response = self.check_status(response, &model).await?;
        let generate_response: GenerateResponse = response.json().await?;
        Ok(generate_response)
    }

    /// Generate text with streaming.
    ///
    /// Returns a channel receiver yielding [`StreamEvent::Token`] for each
    /// output fragment, terminated by [`StreamEvent::Done`]. Transport
    /// failures mid-stream close the channel without the marker. Dropping
    /// the receiver stops consumption of the upstream response.
    pub async fn generate_stream(
        &self,
        request: GenerateRequest,
    ) -> OllamaResult<mpsc::Receiver<StreamEvent>> {
        let url = format!("{}/api/generate", self.host);
        debug!("Starting streaming generation with model {}", request.model);

        let mut request = request;
        request.stream = true;
        let model = request.model.clone();

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let response = self.check_status(response, &model).await?;

        let (tx, rx) = mpsc::channel(100);

        tokio::spawn(async move {
            let mut stream = response.bytes_stream();

            while let Some(chunk_result) = stream.next().await {
                match chunk_result {
                    Ok(bytes) => {
                        // Each chunk is one or more JSON lines
                        let text = String::from_utf8_lossy(&bytes);
                        for line in text.lines() {
                            if line.is_empty() {
                                continue;
                            }

                            match serde_json::from_str::<StreamChunk>(line) {
                                Ok(chunk) => {
                                    if !chunk.response.is_empty()
                                        && tx
                                            .send(StreamEvent::Token(chunk.response))
                                            .await
                                            .is_err()
                                    {
                                        // Receiver dropped
                                        return;
                                    }
                                    if chunk.done {
                                        let _ = tx.send(StreamEvent::Done).await;
                                        return;
                                    }
                                }
                                Err(e) => {
                                    warn!("Failed to parse stream chunk: {}", e);
                                }
                            }
                        }
                    }
                    Err(e) => {
                        // Channel closes without the Done marker
                        warn!("Stream error: {}", e);
                        return;
                    }
                }
            }
        });

        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let config = OllamaConfig::default();
        let client = OllamaClient::from_config(&config);
        assert!(client.is_ok());
    }

    #[test]
    fn test_host_trailing_slash_trimmed() {
        let config = OllamaConfig {
            host: "http://localhost:11434/".to_string(),
            ..OllamaConfig::default()
        };
        let client = OllamaClient::from_config(&config).unwrap();
        assert_eq!(client.host(), "http://localhost:11434");
    }
}
