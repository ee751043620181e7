//! Formatting buttons above the editor. Each action rewrites the editor
//! text around the current selection.

/// Selection in the editor as byte offsets. `start == end` is a caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn caret(at: usize) -> Self {
        Self { start: at, end: at }
    }

    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Clamp to `text`, on char boundaries, with `start <= end`.
    fn clamp_to(self, text: &str) -> Self {
        let start = char_floor(text, self.start.min(self.end));
        let end = char_floor(text, self.start.max(self.end));
        Self { start, end }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolbarAction {
    Bold,
    Italic,
    Heading,
    Quote,
    Code,
    /// `None` when the user dismissed the URL prompt.
    Link(Option<String>),
    List,
    OrderedList,
    Table,
}

const TABLE_SNIPPET: &str = "| Column | Column |\n| --- | --- |\n| Cell | Cell |";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub text: String,
    pub selection: Selection,
}

/// Apply `action` to `text`. Returns `None` when nothing changes.
pub fn apply(action: &ToolbarAction, text: &str, selection: Selection) -> Option<Edit> {
    let selection = selection.clamp_to(text);
    let edit = match action {
        ToolbarAction::Bold => wrap(text, selection, "**", "**"),
        ToolbarAction::Italic => wrap(text, selection, "*", "*"),
        ToolbarAction::Code => wrap(text, selection, "`", "`"),
        ToolbarAction::Link(Some(url)) if !url.is_empty() => {
            wrap(text, selection, "[", &format!("]({url})"))
        }
        ToolbarAction::Link(_) => return None,
        ToolbarAction::Heading => prefix_line(text, selection, "# "),
        ToolbarAction::Quote => prefix_line(text, selection, "> "),
        ToolbarAction::List => prefix_line(text, selection, "- "),
        ToolbarAction::OrderedList => prefix_line(text, selection, "1. "),
        ToolbarAction::Table => append_snippet(text, TABLE_SNIPPET),
    };
    Some(edit)
}

fn wrap(text: &str, selection: Selection, before: &str, after: &str) -> Edit {
    let selected = &text[selection.start..selection.end];
    let mut out = String::with_capacity(text.len() + before.len() + after.len());
    out.push_str(&text[..selection.start]);
    out.push_str(before);
    out.push_str(selected);
    out.push_str(after);
    out.push_str(&text[selection.end..]);

    let start = selection.start + before.len();
    let end = start + selected.len();
    Edit {
        text: out,
        selection: Selection::new(start, end),
    }
}

fn prefix_line(text: &str, selection: Selection, prefix: &str) -> Edit {
    let line_start = text[..selection.start]
        .rfind('\n')
        .map(|i| i + 1)
        .unwrap_or(0);
    let mut out = String::with_capacity(text.len() + prefix.len());
    out.push_str(&text[..line_start]);
    out.push_str(prefix);
    out.push_str(&text[line_start..]);
    Edit {
        text: out,
        selection: Selection::caret(selection.start + prefix.len()),
    }
}

fn append_snippet(text: &str, snippet: &str) -> Edit {
    let mut out = text.to_string();
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(snippet);
    out.push('\n');
    let caret = out.len();
    Edit {
        text: out,
        selection: Selection::caret(caret),
    }
}

fn char_floor(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bold_wraps_selection() {
        let edit = apply(&ToolbarAction::Bold, "say hi now", Selection::new(4, 6)).unwrap();
        assert_eq!(edit.text, "say **hi** now");
        assert_eq!(edit.selection, Selection::new(6, 8));
    }

    #[test]
    fn test_wrap_at_caret() {
        let edit = apply(&ToolbarAction::Code, "ab", Selection::caret(1)).unwrap();
        assert_eq!(edit.text, "a``b");
        assert_eq!(edit.selection, Selection::caret(2));
    }

    #[test]
    fn test_heading_prefixes_current_line() {
        let edit = apply(&ToolbarAction::Heading, "one\ntwo", Selection::caret(5)).unwrap();
        assert_eq!(edit.text, "one\n# two");
        assert_eq!(edit.selection, Selection::caret(7));
    }

    #[test]
    fn test_link_without_url_is_noop() {
        assert!(apply(&ToolbarAction::Link(None), "x", Selection::caret(0)).is_none());
        let edit = apply(
            &ToolbarAction::Link(Some("https://marp.app".to_string())),
            "site",
            Selection::new(0, 4),
        )
        .unwrap();
        assert_eq!(edit.text, "[site](https://marp.app)");
    }

    #[test]
    fn test_table_appends_on_new_line() {
        let edit = apply(&ToolbarAction::Table, "# T", Selection::caret(0)).unwrap();
        assert!(edit.text.starts_with("# T\n| Column |"));
        assert!(edit.text.ends_with("| Cell | Cell |\n"));
        assert_eq!(edit.selection, Selection::caret(edit.text.len()));
    }

    #[test]
    fn test_selection_is_clamped_to_char_boundaries() {
        let edit = apply(&ToolbarAction::Italic, "héllo", Selection::new(2, 99)).unwrap();
        assert_eq!(edit.text, "h*éllo*");
    }
}
