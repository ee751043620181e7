use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::path::Path;

use deckpane::api;
use deckpane::backend::{CREATE_ACTION, ExecInput, handle_exec};
use deckpane::config::Config;
use deckpane::engine::RenderEngine;
use deckpane::slides;

pub fn count(file: &Path) -> Result<()> {
    let markdown = super::read_deck(file)?;
    let config = Config::load_or_default();
    let result = super::deck_engine(&config)
        .render(&markdown)
        .with_context(|| format!("Failed to render {}", file.display()))?;
    println!("{}", slides::count_slides(&result.html));
    Ok(())
}

pub fn route(doc_id: &str, token: Option<&str>) {
    println!("{}", api::get_route(doc_id, token));
}

pub fn create(title: Option<String>) -> Result<()> {
    let payload = match title {
        Some(title) => json!({ "title": title }),
        None => Value::Null,
    };
    let input = ExecInput {
        action: CREATE_ACTION.to_string(),
        payload,
        ctx: Value::Null,
    };
    let output = handle_exec(&input);
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
