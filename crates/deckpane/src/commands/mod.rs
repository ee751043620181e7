pub mod completion;
pub mod config;
pub mod deck;
pub mod export;
pub mod preview;
pub mod version;

use anyhow::{Context, Result};
use std::path::Path;

use deckpane::config::Config;
use deckpane::engine::{DeckEngine, DeckOptions};

fn read_deck(file: &Path) -> Result<String> {
    if !file.exists() {
        anyhow::bail!("File not found: {}", file.display());
    }
    std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))
}

fn deck_engine(config: &Config) -> DeckEngine {
    DeckEngine::new(DeckOptions {
        default_theme: config.default_theme().to_string(),
    })
}

/// Document id for a deck file: its stem.
fn doc_id_for(file: &Path) -> Result<String> {
    file.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("Cannot derive a document id from {}", file.display()))
}
