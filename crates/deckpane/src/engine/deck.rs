//! Built-in Marp-style engine: front-matter and comment directives, slide
//! splitting, CommonMark rendering with highlighted code, and one inline
//! SVG per slide so the preview can toggle slides individually.

use std::fmt::Write;

use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag};

use super::directives::{self, SlideDirectives};
use super::highlight::{Highlighter, escape_html};
use super::splitter;
use super::theme::Theme;
use super::{RenderEngine, RenderResult};
use crate::error::RenderError;

const DEFAULT_SIZE: (u32, u32) = (1280, 720);

#[derive(Debug, Clone)]
pub struct DeckOptions {
    /// Theme used when the deck does not name one.
    pub default_theme: String,
}

impl Default for DeckOptions {
    fn default() -> Self {
        Self {
            default_theme: "default".to_string(),
        }
    }
}

pub struct DeckEngine {
    options: DeckOptions,
    highlighter: Highlighter,
}

impl DeckEngine {
    pub fn new(options: DeckOptions) -> Self {
        Self {
            options,
            highlighter: Highlighter::new(),
        }
    }

    fn markdown_to_html(&self, content: &str, theme: &Theme) -> String {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        let mut events = Vec::new();
        let mut code: Option<(Option<String>, String)> = None;
        for event in Parser::new_ext(content, options) {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let language = match kind {
                        CodeBlockKind::Fenced(info) => {
                            info.split_whitespace().next().map(str::to_string)
                        }
                        CodeBlockKind::Indented => None,
                    };
                    code = Some((language, String::new()));
                }
                Event::End(Tag::CodeBlock(_)) => {
                    if let Some((language, source)) = code.take() {
                        let html = self.highlighter.highlight(
                            &source,
                            language.as_deref(),
                            theme.syntect_theme_name(),
                        );
                        events.push(Event::Html(CowStr::from(html)));
                    }
                }
                Event::Text(text) if code.is_some() => {
                    if let Some((_, source)) = code.as_mut() {
                        source.push_str(&text);
                    }
                }
                other => events.push(other),
            }
        }

        let mut html = String::new();
        pulldown_cmark::html::push_html(&mut html, events.into_iter());
        html
    }
}

impl RenderEngine for DeckEngine {
    fn render(&self, markdown: &str) -> Result<RenderResult, RenderError> {
        let source = markdown.replace("\r\n", "\n");
        let (globals, body) = directives::extract(&source)?;

        let theme_name = globals
            .theme
            .as_deref()
            .unwrap_or(&self.options.default_theme);
        let theme = Theme::from_name(theme_name);
        let (width, height) = slide_size(globals.size.as_deref());

        let mut raw_slides = splitter::split(body, globals.heading_divider);
        if raw_slides.is_empty() {
            raw_slides.push(String::new());
        }
        let total = raw_slides.len();

        let mut inherited = SlideDirectives::from_globals(&globals);
        let mut html = String::from("<div class=\"marpit\">");
        for (index, raw) in raw_slides.iter().enumerate() {
            let (locals, content) = directives::extract_local(raw);
            let slide = inherited.advance(&locals);
            let body_html = self.markdown_to_html(&content, &theme);
            push_slide(
                &mut html,
                &SlideFrame {
                    number: index + 1,
                    total,
                    width,
                    height,
                    theme: theme.name,
                },
                &slide,
                &body_html,
            );
        }
        html.push_str("</div>");

        log::trace!("rendered {total} slide(s) with theme {}", theme.name);
        Ok(RenderResult {
            html,
            css: theme.css(width, height),
        })
    }
}

struct SlideFrame<'a> {
    number: usize,
    total: usize,
    width: u32,
    height: u32,
    theme: &'a str,
}

fn push_slide(html: &mut String, frame: &SlideFrame<'_>, slide: &SlideDirectives, body: &str) {
    let SlideFrame {
        number,
        total,
        width,
        height,
        theme,
    } = *frame;

    let _ = write!(
        html,
        "<svg data-marpit-svg=\"\" viewBox=\"0 0 {width} {height}\">\
         <foreignObject width=\"{width}\" height=\"{height}\">\
         <section id=\"{number}\" data-theme=\"{theme}\""
    );
    if let Some(class) = &slide.class {
        let _ = write!(html, " class=\"{}\"", escape_html(class));
    }
    if slide.paginate {
        let _ = write!(
            html,
            " data-paginate=\"true\" data-marpit-pagination=\"{number}\" data-marpit-pagination-total=\"{total}\""
        );
    }
    let mut style = String::new();
    if let Some(background) = &slide.background_color {
        let _ = write!(style, "background-color:{};", escape_html(background));
    }
    if let Some(color) = &slide.color {
        let _ = write!(style, "color:{};", escape_html(color));
    }
    if !style.is_empty() {
        let _ = write!(html, " style=\"{style}\"");
    }
    html.push('>');

    if let Some(header) = &slide.header {
        let _ = write!(html, "<header>{}</header>", escape_html(header));
    }
    html.push_str(body);
    if let Some(footer) = &slide.footer {
        let _ = write!(html, "<footer>{}</footer>", escape_html(footer));
    }
    html.push_str("</section></foreignObject></svg>");
}

fn slide_size(size: Option<&str>) -> (u32, u32) {
    match size.map(str::trim) {
        Some("4:3") => (960, 720),
        Some("16:9") | None => DEFAULT_SIZE,
        Some(other) => {
            log::debug!("unknown slide size {other:?}, using 16:9");
            DEFAULT_SIZE
        }
    }
}
