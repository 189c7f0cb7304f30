//! Chat session orchestration.
//!
//! A turn resolves its session, retrieves grounding context from the
//! owner's active documents, folds bounded history into the prompt, and
//! streams the model's answer back to the caller. The caller can cancel an
//! in-flight turn; only completed turns are committed to memory.

use std::sync::Arc;

use groundchat_config::ChatConfig;
use groundchat_core::{new_id, ChatId};
use groundchat_db::Database;
use groundchat_ollama::{GenerateOptions, GenerateRequest, OllamaClient, StreamEvent};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::augment::{build_prompt, AugmentedContext};
use crate::cancel::{cancel_pair, CancelHandle};
use crate::error::RagResult;
use crate::memory::ChatMemory;
use crate::retrieval::RetrievalOrchestrator;

/// One user turn.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub user_id: String,
    /// Session to continue; a fresh session is minted when absent.
    pub chat_id: Option<ChatId>,
    pub message: String,
    /// Model to generate with; the orchestrator's configured model when absent.
    pub model: Option<String>,
    /// Per-request sampling overrides. Unset fields fall back to config.
    pub options: Option<GenerateOptions>,
}

impl ChatRequest {
    pub fn new(user_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            chat_id: None,
            message: message.into(),
            model: None,
            options: None,
        }
    }

    pub fn with_chat_id(mut self, chat_id: impl Into<ChatId>) -> Self {
        self.chat_id = Some(chat_id.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_options(mut self, options: GenerateOptions) -> Self {
        self.options = Some(options);
        self
    }
}

/// How a turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The model finished the answer; the turn is in session memory.
    Completed,
    /// The caller cancelled (or dropped the stream); nothing was committed.
    Cancelled,
    /// The model stream ended abnormally; nothing was committed.
    Failed,
}

/// A streaming answer in progress.
pub struct ChatStream {
    pub chat_id: ChatId,
    /// Incremental answer fragments.
    pub tokens: mpsc::Receiver<String>,
    cancel: CancelHandle,
    outcome: oneshot::Receiver<TurnOutcome>,
}

impl ChatStream {
    /// Stop the turn. Already-received tokens stay with the caller; the
    /// turn is not committed to memory.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// How the turn ended. Call after draining `tokens`.
    pub async fn outcome(self) -> TurnOutcome {
        self.outcome.await.unwrap_or(TurnOutcome::Failed)
    }
}

pub struct ChatOrchestrator {
    db: Database,
    retriever: RetrievalOrchestrator,
    memory: Arc<ChatMemory>,
    client: OllamaClient,
    model: String,
    config: ChatConfig,
}

impl ChatOrchestrator {
    pub fn new(
        db: Database,
        retriever: RetrievalOrchestrator,
        memory: Arc<ChatMemory>,
        client: OllamaClient,
        model: impl Into<String>,
        config: ChatConfig,
    ) -> Self {
        Self {
            db,
            retriever,
            memory,
            client,
            model: model.into(),
            config,
        }
    }

    pub fn memory(&self) -> &Arc<ChatMemory> {
        &self.memory
    }

    /// Run one turn, returning a stream of answer tokens.
    pub async fn chat(&self, request: ChatRequest) -> RagResult<ChatStream> {
        let chat_id = request.chat_id.clone().unwrap_or_else(new_id);

        // Grounding comes from the user's active documents. No active
        // documents means a plain model turn; retrieval is skipped entirely.
        let active = self.db.active_document_ids(&request.user_id)?;
        let context = if active.is_empty() {
            AugmentedContext::empty()
        } else {
            self.retriever.retrieve(&request.message, active).await?
        };
        info!(
            chat_id = %chat_id,
            "Turn with {} context chunk(s)",
            context.len()
        );

        let history = self.memory.history(&chat_id);
        let model = request.model.as_deref().unwrap_or(&self.model);
        let generate = GenerateRequest::new(model, build_prompt(&history, &request.message))
            .with_system(context.system_prompt())
            .with_options(resolve_options(&self.config, request.options.as_ref()));

        let upstream = self.client.generate_stream(generate).await?;
        Ok(spawn_turn(
            chat_id,
            request.message,
            Arc::clone(&self.memory),
            upstream,
        ))
    }
}

/// Sampling parameters for a turn: config defaults overridden field by
/// field by the request.
pub fn resolve_options(config: &ChatConfig, overrides: Option<&GenerateOptions>) -> GenerateOptions {
    let mut options = GenerateOptions {
        temperature: Some(config.temperature),
        top_p: Some(config.top_p),
        top_k: Some(config.top_k),
        num_predict: Some(config.max_tokens),
    };
    if let Some(over) = overrides {
        if over.temperature.is_some() {
            options.temperature = over.temperature;
        }
        if over.top_p.is_some() {
            options.top_p = over.top_p;
        }
        if over.top_k.is_some() {
            options.top_k = over.top_k;
        }
        if over.num_predict.is_some() {
            options.num_predict = over.num_predict;
        }
    }
    options
}

/// Forward model events to the caller until completion, cancellation, or
/// failure. Memory is only written on completion, so a cancelled or failed
/// turn leaves the session exactly as it was.
fn spawn_turn(
    chat_id: ChatId,
    user_message: String,
    memory: Arc<ChatMemory>,
    mut upstream: mpsc::Receiver<StreamEvent>,
) -> ChatStream {
    let (tx, rx) = mpsc::channel(64);
    let (outcome_tx, outcome_rx) = oneshot::channel();
    let (cancel, mut token) = cancel_pair();

    let task_chat_id = chat_id.clone();
    tokio::spawn(async move {
        let mut answer = String::new();
        let outcome = loop {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!(chat_id = %task_chat_id, "Turn cancelled");
                    break TurnOutcome::Cancelled;
                }
                event = upstream.recv() => match event {
                    Some(StreamEvent::Token(fragment)) => {
                        answer.push_str(&fragment);
                        if tx.send(fragment).await.is_err() {
                            debug!(chat_id = %task_chat_id, "Stream receiver dropped");
                            break TurnOutcome::Cancelled;
                        }
                    }
                    Some(StreamEvent::Done) => break TurnOutcome::Completed,
                    None => {
                        warn!(chat_id = %task_chat_id, "Model stream ended without completing");
                        break TurnOutcome::Failed;
                    }
                }
            }
        };

        if outcome == TurnOutcome::Completed {
            memory.append_turn(&task_chat_id, &user_message, &answer);
        }
        let _ = outcome_tx.send(outcome);
    });

    ChatStream {
        chat_id,
        tokens: rx,
        cancel,
        outcome: outcome_rx,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(
        events: mpsc::Receiver<StreamEvent>,
        memory: Arc<ChatMemory>,
    ) -> ChatStream {
        spawn_turn("c1".to_string(), "question".to_string(), memory, events)
    }

    #[tokio::test]
    async fn completed_turn_streams_tokens_and_commits_memory() {
        let (tx, events) = mpsc::channel(8);
        let memory = Arc::new(ChatMemory::new(20));
        let mut stream = turn(events, Arc::clone(&memory));

        tx.send(StreamEvent::Token("Hello ".into())).await.unwrap();
        tx.send(StreamEvent::Token("there".into())).await.unwrap();
        tx.send(StreamEvent::Done).await.unwrap();

        let mut answer = String::new();
        while let Some(fragment) = stream.tokens.recv().await {
            answer.push_str(&fragment);
        }
        assert_eq!(answer, "Hello there");
        assert_eq!(stream.outcome().await, TurnOutcome::Completed);

        let history = memory.history("c1");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, "question");
        assert_eq!(history[1].content, "Hello there");
    }

    #[tokio::test]
    async fn cancelled_turn_commits_nothing() {
        let (tx, events) = mpsc::channel(8);
        let memory = Arc::new(ChatMemory::new(20));
        let mut stream = turn(events, Arc::clone(&memory));

        tx.send(StreamEvent::Token("partial".into())).await.unwrap();
        assert_eq!(stream.tokens.recv().await.as_deref(), Some("partial"));

        stream.cancel();
        while stream.tokens.recv().await.is_some() {}
        assert_eq!(stream.outcome().await, TurnOutcome::Cancelled);
        assert!(memory.history("c1").is_empty());
    }

    #[tokio::test]
    async fn abnormal_stream_end_is_a_failed_turn() {
        let (tx, events) = mpsc::channel(8);
        let memory = Arc::new(ChatMemory::new(20));
        let mut stream = turn(events, Arc::clone(&memory));

        tx.send(StreamEvent::Token("half an ans".into())).await.unwrap();
        drop(tx); // closes without Done

        while stream.tokens.recv().await.is_some() {}
        assert_eq!(stream.outcome().await, TurnOutcome::Failed);
        assert!(memory.history("c1").is_empty());
    }

    #[test]
    fn options_default_from_config() {
        let options = resolve_options(&ChatConfig::default(), None);
        assert_eq!(options.temperature, Some(0.8));
        assert_eq!(options.top_p, Some(0.90));
        assert_eq!(options.top_k, Some(30));
        assert_eq!(options.num_predict, Some(8196));
    }

    #[test]
    fn overrides_replace_only_set_fields() {
        let overrides = GenerateOptions::new().with_temperature(0.2);
        let options = resolve_options(&ChatConfig::default(), Some(&overrides));
        assert_eq!(options.temperature, Some(0.2));
        assert_eq!(options.top_k, Some(30));
    }

    #[test]
    fn request_model_falls_back_to_the_configured_default() {
        let request = ChatRequest::new("u1", "hi");
        assert_eq!(request.model.as_deref().unwrap_or("llama3.2"), "llama3.2");

        let request = request.with_model("qwen2.5:7b");
        assert_eq!(request.model.as_deref().unwrap_or("llama3.2"), "qwen2.5:7b");
    }

    #[test]
    fn request_without_chat_id_gets_a_fresh_one() {
        let request = ChatRequest::new("u1", "hi");
        assert!(request.chat_id.is_none());
        let with = request.with_chat_id("fixed");
        assert_eq!(with.chat_id.as_deref(), Some("fixed"));
    }
}
