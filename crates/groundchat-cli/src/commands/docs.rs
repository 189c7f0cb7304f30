//! Docs command - list uploaded documents.

use anyhow::Result;
use colored::Colorize;

use super::{format_size, get_database};

pub fn run(user: &str) -> Result<()> {
    let db = get_database()?;
    let documents = db.list_documents(user)?;

    if documents.is_empty() {
        println!("No documents yet. Upload one with 'groundchat upload <path>'.");
        return Ok(());
    }

    println!("{}", "Documents".cyan().bold());
    println!("{}", "─".repeat(70));
    for doc in &documents {
        let marker = if doc.on_chat {
            "●".green()
        } else {
            "○".normal()
        };
        println!(
            "{} {}  {}  {}  {}",
            marker,
            &doc.id[..8.min(doc.id.len())],
            doc.filename,
            format_size(doc.file_size),
            doc.created_at.format("%Y-%m-%d %H:%M")
        );
    }
    println!();
    println!(
        "{} = in the retrieval set, {} = excluded",
        "●".green(),
        "○".normal()
    );

    Ok(())
}
