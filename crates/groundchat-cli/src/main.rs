//! Groundchat CLI - chat with your documents from the terminal.

mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Groundchat - retrieval-augmented chat over your own documents
#[derive(Parser)]
#[command(name = "groundchat")]
#[command(version)]
#[command(about = "Retrieval-augmented chat over your own documents", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// User the command acts as
    #[arg(short, long, global = true, default_value = "local")]
    user: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize groundchat (create config and database)
    Init,

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Check the Ollama server and database
    Status,

    /// Upload a document into the knowledge base
    Upload {
        /// Path to the file to upload
        path: std::path::PathBuf,

        /// Skip the model-generated document summary
        #[arg(long)]
        no_summary: bool,
    },

    /// List uploaded documents
    Docs,

    /// Toggle documents in or out of the chat's retrieval set
    Toggle {
        /// Document ids (prefixes accepted)
        ids: Vec<String>,

        /// Remove the documents from the retrieval set instead of adding
        #[arg(long)]
        off: bool,
    },

    /// Delete documents and their indexed content
    Rm {
        /// Document ids (prefixes accepted)
        ids: Vec<String>,
    },

    /// Chat with your documents
    Chat {
        /// One-shot question; omit for an interactive session
        message: Option<String>,

        /// Continue an existing session
        #[arg(long)]
        chat_id: Option<String>,

        /// Model to generate with, overriding the configured one
        #[arg(short, long)]
        model: Option<String>,

        /// Sampling temperature override
        #[arg(short, long)]
        temperature: Option<f32>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Print the config file path
    Path,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. ollama.model)
        key: String,

        /// Value to set
        value: String,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("groundchat=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("groundchat=info,warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let user = cli.user;
    let result = match cli.command {
        Commands::Init => commands::init::run(),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => commands::config::show(),
            ConfigCommands::Path => commands::config::path(),
            ConfigCommands::Set { key, value } => commands::config::set(&key, &value),
        },
        Commands::Status => commands::status::run(),
        Commands::Upload { path, no_summary } => commands::upload::run(&path, &user, no_summary),
        Commands::Docs => commands::docs::run(&user),
        Commands::Toggle { ids, off } => commands::toggle::run(&user, &ids, !off),
        Commands::Rm { ids } => commands::rm::run(&user, &ids),
        Commands::Chat {
            message,
            chat_id,
            model,
            temperature,
        } => commands::chat::run(&user, message, chat_id, model, temperature),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
