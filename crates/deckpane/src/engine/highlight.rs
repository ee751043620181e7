use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

/// Syntax highlighter for fenced code blocks. Loading the syntax and theme
/// sets is the expensive part of engine construction.
pub struct Highlighter {
    syntaxes: SyntaxSet,
    themes: ThemeSet,
}

impl Highlighter {
    pub fn new() -> Self {
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            themes: ThemeSet::load_defaults(),
        }
    }

    /// Highlight `code` as a `<pre>` block with inline styles.
    /// Unknown languages and themes fall back to escaped plain text.
    pub fn highlight(&self, code: &str, language: Option<&str>, theme_name: &str) -> String {
        let syntax = language
            .and_then(|lang| self.syntaxes.find_syntax_by_token(lang))
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text());
        let Some(theme) = self.themes.themes.get(theme_name) else {
            return plain_block(code);
        };
        match highlighted_html_for_string(code, &self.syntaxes, syntax, theme) {
            Ok(html) => html,
            Err(e) => {
                log::warn!("highlighting failed for {:?}: {e}", language);
                plain_block(code)
            }
        }
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

fn plain_block(code: &str) -> String {
    format!("<pre><code>{}</code></pre>\n", escape_html(code))
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
