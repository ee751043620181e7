//! Standalone HTML document for a rendered deck, for saving or printing.

use std::fmt::Write;

use crate::constants::DEFAULT_TITLE;
use crate::engine::highlight::escape_html;

const EMPTY_DECK: &str = "<section class=\"marp-slide\"><h1>Empty slides</h1></section>";

const PRINT_SCRIPT: &str = "<script>window.addEventListener(\"load\",()=>{try{window.focus();window.print();}catch(e){}});</script>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Open the print dialog once the document loads.
    pub inject_print: bool,
    /// Add an `@page` rule sized to one slide per page.
    pub for_pdf: bool,
    pub page_width: u32,
    pub page_height: u32,
    pub title: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            inject_print: false,
            for_pdf: false,
            page_width: 1280,
            page_height: 720,
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl ExportOptions {
    pub fn pdf() -> Self {
        Self {
            for_pdf: true,
            ..Self::default()
        }
    }
}

pub fn build_html_export(html: &str, css: &str, options: &ExportOptions) -> String {
    let body = if html.is_empty() { EMPTY_DECK } else { html };

    let mut styles = String::from("body { margin: 0; }");
    if options.for_pdf {
        let _ = write!(
            styles,
            "\n@page {{ size: {}px {}px; margin: 0; }}",
            options.page_width, options.page_height
        );
    }
    let script = if options.inject_print {
        PRINT_SCRIPT
    } else {
        ""
    };

    format!(
        "<!doctype html>
<html>
<head>
<meta charset=\"utf-8\" />
<title>{title}</title>
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />
<style>
{css}
{styles}
</style>
</head>
<body>
{body}
{script}
</body>
</html>",
        title = escape_html(&options.title),
    )
}
