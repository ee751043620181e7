use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

use deckpane::config::Config;
use deckpane::engine::RenderEngine;
use deckpane::export::{ExportOptions, build_html_export};
use deckpane::slides;

pub fn run(file: PathBuf, output: Option<PathBuf>, pdf: bool, quiet: bool) -> Result<()> {
    let config = Config::load_or_default();
    let markdown = super::read_deck(&file)?;

    let result = super::deck_engine(&config)
        .render(&markdown)
        .with_context(|| format!("Failed to render {}", file.display()))?;

    let count = slides::count_slides(&result.html);
    if count == 0 {
        anyhow::bail!("No slides found in {}", file.display());
    }

    let output = output.unwrap_or_else(|| file.with_extension("html"));
    if output == file {
        anyhow::bail!("Refusing to overwrite the source file {}", file.display());
    }

    let (page_width, page_height) = config.page_size();
    let options = ExportOptions {
        inject_print: pdf,
        for_pdf: pdf,
        page_width,
        page_height,
        title: super::doc_id_for(&file)?,
    };
    let document = build_html_export(&result.html, &result.css, &options);

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&output, document)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    if !quiet {
        let kind = if pdf { "print-ready document" } else { "HTML document" };
        println!(
            "{}",
            format!("Exported {count} slide(s) as {kind} to {}", output.display()).green()
        );
    }
    Ok(())
}
