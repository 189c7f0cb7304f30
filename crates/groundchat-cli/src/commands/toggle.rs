//! Toggle command - include or exclude documents from retrieval.

use anyhow::{Context, Result};
use colored::Colorize;

use super::{get_database, resolve_ids};

pub fn run(user: &str, prefixes: &[String], active: bool) -> Result<()> {
    if prefixes.is_empty() {
        anyhow::bail!("No document ids given.");
    }

    let db = get_database()?;
    let ids = resolve_ids(&db, user, prefixes)?;

    let updated = db
        .set_on_chat(user, &ids, active)
        .context("Failed to update documents")?;

    let verb = if active { "Added" } else { "Removed" };
    println!(
        "{} {verb} {} document(s) {} the retrieval set:",
        "✓".green(),
        updated.len(),
        if active { "to" } else { "from" }
    );
    for doc in &updated {
        println!("  {}  {}", &doc.id[..8.min(doc.id.len())], doc.filename);
    }

    Ok(())
}
