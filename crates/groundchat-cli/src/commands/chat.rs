//! Chat command - one-shot or interactive grounded chat.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use groundchat_index::SqliteVectorIndex;
use groundchat_ollama::{GenerateOptions, OllamaClient};
use groundchat_rag::{
    ChatMemory, ChatOrchestrator, ChatRequest, LlmQueryExpander, RetrievalOrchestrator,
    TurnOutcome,
};
use tokio::runtime::Runtime;
use tracing::debug;

use super::{get_config, get_database};

pub fn run(
    user: &str,
    message: Option<String>,
    chat_id: Option<String>,
    model: Option<String>,
    temperature: Option<f32>,
) -> Result<()> {
    let db = get_database()?;
    let config = get_config()?;

    let client = OllamaClient::from_config(&config.ollama)
        .context("Failed to create Ollama client")?;
    let rt = Runtime::new().context("Failed to create async runtime")?;

    if !rt.block_on(client.is_available()) {
        anyhow::bail!(
            "Ollama is not running at {}. Start it with 'ollama serve'.",
            config.ollama.host
        );
    }

    let index = Arc::new(SqliteVectorIndex::new(
        db.clone(),
        client.clone(),
        &config.ollama.embedding_model,
    ));
    let expander = Arc::new(LlmQueryExpander::new(
        client.clone(),
        &config.ollama.model,
        config.rag.expansion_queries,
    ));
    let retriever = RetrievalOrchestrator::new(
        index,
        expander,
        config.rag.top_k,
        config.rag.similarity_threshold,
    );
    let memory = Arc::new(ChatMemory::new(config.chat.memory_window));
    let orchestrator = ChatOrchestrator::new(
        db,
        retriever,
        memory,
        client,
        config.ollama.model.clone(),
        config.chat.clone(),
    );

    let options = temperature.map(|t| GenerateOptions::new().with_temperature(t));

    match message {
        Some(message) => {
            let mut request = ChatRequest::new(user, message);
            if let Some(id) = chat_id {
                request = request.with_chat_id(id);
            }
            if let Some(model) = &model {
                request = request.with_model(model.clone());
            }
            if let Some(options) = &options {
                request = request.with_options(options.clone());
            }
            run_turn(&rt, &orchestrator, request)?;
            Ok(())
        }
        None => interactive(&rt, &orchestrator, user, chat_id, model, options),
    }
}

fn interactive(
    rt: &Runtime,
    orchestrator: &ChatOrchestrator,
    user: &str,
    chat_id: Option<String>,
    model: Option<String>,
    options: Option<GenerateOptions>,
) -> Result<()> {
    println!("{}", "Groundchat interactive session".cyan().bold());
    println!("Type your question; 'exit' or Ctrl-D ends the session.");
    println!("Press Ctrl-C during an answer to stop it.");
    println!();

    let mut session_id = chat_id;
    let stdin = io::stdin();
    loop {
        print!("{} ", "You:".cyan().bold());
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }

        let mut request = ChatRequest::new(user, line);
        if let Some(id) = &session_id {
            request = request.with_chat_id(id.clone());
        }
        if let Some(model) = &model {
            request = request.with_model(model.clone());
        }
        if let Some(options) = &options {
            request = request.with_options(options.clone());
        }

        match run_turn(rt, orchestrator, request) {
            Ok(id) => session_id = Some(id),
            Err(e) => eprintln!("{} {}", "Error:".red().bold(), e),
        }
        println!();
    }

    Ok(())
}

/// Stream one answer to the terminal. Ctrl-C cancels the turn in flight.
fn run_turn(rt: &Runtime, orchestrator: &ChatOrchestrator, request: ChatRequest) -> Result<String> {
    let mut stream = rt
        .block_on(orchestrator.chat(request))
        .context("Failed to start the turn")?;
    let chat_id = stream.chat_id.clone();
    debug!("Streaming answer for session {chat_id}");

    rt.block_on(async {
        print!("{} ", "Assistant:".green().bold());
        io::stdout().flush().ok();

        loop {
            let event = tokio::select! {
                _ = tokio::signal::ctrl_c() => None,
                token = stream.tokens.recv() => Some(token),
            };
            match event {
                None => stream.cancel(),
                Some(Some(fragment)) => {
                    print!("{fragment}");
                    io::stdout().flush().ok();
                }
                Some(None) => break,
            }
        }
        println!();

        match stream.outcome().await {
            TurnOutcome::Completed => {}
            TurnOutcome::Cancelled => println!("{}", "(stopped)".yellow()),
            TurnOutcome::Failed => {
                println!("{}", "(the model stream ended unexpectedly)".yellow())
            }
        }
    });

    Ok(chat_id)
}
