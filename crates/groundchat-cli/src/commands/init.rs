//! Initialize groundchat.

use super::get_paths;
use anyhow::{Context, Result};
use colored::Colorize;
use groundchat_config::Config;
use groundchat_db::Database;

pub fn run() -> Result<()> {
    let paths = get_paths()?;

    if paths.is_initialized() {
        println!("{} Groundchat is already initialized.", "Note:".yellow().bold());
        println!("  Config: {}", paths.config_file.display());
        println!("  Database: {}", paths.database_file.display());
        return Ok(());
    }

    println!("{}", "Initializing groundchat...".cyan().bold());

    paths.ensure_dirs().context("Failed to create directories")?;
    println!("  {} Created directories", "✓".green());

    Config::create_default_file(&paths.config_file).context("Failed to create config file")?;
    println!(
        "  {} Created config: {}",
        "✓".green(),
        paths.config_file.display()
    );

    let _db = Database::open(&paths.database_file).context("Failed to initialize database")?;
    println!(
        "  {} Created database: {}",
        "✓".green(),
        paths.database_file.display()
    );

    println!();
    println!("{}", "Groundchat initialized successfully!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Review the config: {}", "groundchat config show".cyan());
    println!("  2. Upload a document: {}", "groundchat upload report.pdf".cyan());
    println!("  3. Start chatting: {}", "groundchat chat".cyan());

    Ok(())
}
