//! Groundchat Core - Domain types shared across the groundchat crates.

mod types;

pub use types::*;
