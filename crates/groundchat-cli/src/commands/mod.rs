//! CLI command implementations.

pub mod chat;
pub mod config;
pub mod docs;
pub mod init;
pub mod rm;
pub mod status;
pub mod toggle;
pub mod upload;

use anyhow::{Context, Result};
use groundchat_config::{AppPaths, Config};
use groundchat_db::Database;

/// Get the application paths.
pub fn get_paths() -> Result<AppPaths> {
    AppPaths::new().context("Failed to determine application directories")
}

/// Get a database connection, ensuring groundchat is initialized.
pub fn get_database() -> Result<Database> {
    let paths = get_paths()?;

    if !paths.is_initialized() {
        anyhow::bail!("Groundchat is not initialized. Run 'groundchat init' first.");
    }

    Database::open(&paths.database_file).context("Failed to open database")
}

/// Load the configuration file.
pub fn get_config() -> Result<Config> {
    Config::load().context("Failed to load configuration")
}

/// Resolve id prefixes against the user's documents. Ambiguous or unknown
/// prefixes are an error naming the offending input.
pub fn resolve_ids(db: &Database, user_id: &str, prefixes: &[String]) -> Result<Vec<String>> {
    let documents = db.list_documents(user_id)?;
    let mut resolved = Vec::with_capacity(prefixes.len());
    for prefix in prefixes {
        let matches: Vec<&str> = documents
            .iter()
            .filter(|d| d.id.starts_with(prefix.as_str()))
            .map(|d| d.id.as_str())
            .collect();
        match matches.as_slice() {
            [id] => resolved.push(id.to_string()),
            [] => anyhow::bail!("No document matches id '{prefix}'"),
            _ => anyhow::bail!("Id '{prefix}' is ambiguous ({} matches)", matches.len()),
        }
    }
    Ok(resolved)
}

/// Format a file size in human-readable form.
pub fn format_size(bytes: i64) -> String {
    const KB: i64 = 1024;
    const MB: i64 = KB * 1024;
    const GB: i64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
