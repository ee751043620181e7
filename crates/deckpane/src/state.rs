use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MARKDOWN, LOADING_DECK_STATUS};
use crate::engine::RenderResult;

/// Position within a deck. The constructor clamps, so a `Cursor` always
/// satisfies `current < count` when `count > 0` and `current == 0` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    count: usize,
    current: usize,
}

impl Cursor {
    pub fn new(count: usize, requested: usize) -> Self {
        let current = if count == 0 {
            0
        } else {
            requested.min(count - 1)
        };
        Self { count, current }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// Move by `delta` slides, stopping at either end.
    pub fn offset(&self, delta: isize) -> Self {
        let requested = self.current.saturating_add_signed(delta);
        Self::new(self.count, requested)
    }

    /// Keep the position for a deck of a different size.
    pub fn resized(&self, count: usize) -> Self {
        Self::new(count, self.current)
    }

    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    pub fn is_last(&self) -> bool {
        self.current >= self.count.saturating_sub(1)
    }

    pub fn label(&self) -> String {
        if self.count == 0 {
            "0 / 0".to_string()
        } else {
            format!("{} / {}", self.current + 1, self.count)
        }
    }
}

/// What the stage can show. HTML and CSS only exist together, and a failed
/// render replaces any earlier output.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Preview {
    #[default]
    Empty,
    Rendered {
        html: String,
        css: String,
        cursor: Cursor,
    },
    Failed {
        message: String,
    },
}

impl Preview {
    /// Build from an engine result, keeping `previous` as the requested position.
    pub fn rendered(result: RenderResult, previous: Cursor) -> Self {
        let count = crate::slides::count_slides(&result.html);
        Self::Rendered {
            html: result.html,
            css: result.css,
            cursor: previous.resized(count),
        }
    }

    pub fn cursor(&self) -> Cursor {
        match self {
            Self::Rendered { cursor, .. } => *cursor,
            Self::Empty | Self::Failed { .. } => Cursor::default(),
        }
    }

    pub fn html(&self) -> &str {
        match self {
            Self::Rendered { html, .. } => html,
            Self::Empty | Self::Failed { .. } => "",
        }
    }

    pub fn css(&self) -> &str {
        match self {
            Self::Rendered { css, .. } => css,
            Self::Empty | Self::Failed { .. } => "",
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { message } => Some(message),
            Self::Empty | Self::Rendered { .. } => None,
        }
    }

    pub fn has_content(&self) -> bool {
        !self.html().is_empty()
    }
}

/// Save bookkeeping for the variant that owns its persistence cycle.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SaveState {
    pub dirty: bool,
    pub saving: bool,
    /// Saves issued but not yet finished; `saving` holds while any remain.
    pub in_flight: u32,
    pub last_saved_at: Option<DateTime<Utc>>,
    /// Bumped on every edit; a save only clears `dirty` for the text it wrote.
    pub revision: u64,
}

/// Everything the reconciler projects from. One per mounted controller.
#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    pub doc_id: Option<String>,
    pub markdown: String,
    pub preview: Preview,
    pub loading: bool,
    pub status_message: String,
    /// `None` when embedded in a host editor that saves on its own.
    pub persistence: Option<SaveState>,
}

impl UiState {
    pub fn initial(doc_id: Option<String>) -> Self {
        Self {
            doc_id,
            markdown: DEFAULT_MARKDOWN.to_string(),
            preview: Preview::Empty,
            loading: true,
            status_message: LOADING_DECK_STATUS.to_string(),
            persistence: Some(SaveState::default()),
        }
    }

    pub fn embedded(doc_id: Option<String>) -> Self {
        Self {
            markdown: String::new(),
            persistence: None,
            ..Self::initial(doc_id)
        }
    }

    pub fn cursor(&self) -> Cursor {
        self.preview.cursor()
    }

    pub fn slide_count(&self) -> usize {
        self.cursor().count()
    }

    pub fn current_slide(&self) -> usize {
        self.cursor().current()
    }

    pub fn is_dirty(&self) -> bool {
        self.persistence.as_ref().is_some_and(|p| p.dirty)
    }

    pub fn is_saving(&self) -> bool {
        self.persistence.as_ref().is_some_and(|p| p.saving)
    }

    pub fn has_document(&self) -> bool {
        self.doc_id.is_some()
    }

    /// Move the cursor of a rendered deck. No-op for other previews.
    pub fn set_cursor(&mut self, next: Cursor) {
        if let Preview::Rendered { cursor, .. } = &mut self.preview {
            *cursor = next;
        }
    }
}

/// The blob stored through the host key-value API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedRecord {
    pub markdown: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl PersistedRecord {
    pub fn new(markdown: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            markdown: markdown.into(),
            updated_at: Some(at.to_rfc3339_opts(SecondsFormat::Millis, true)),
        }
    }

    /// Accept either the bare record or a `{ "value": record }` envelope.
    /// Anything without a string `markdown` field counts as absent.
    pub fn from_value(value: serde_json::Value) -> Option<Self> {
        let inner = match value {
            serde_json::Value::Object(mut map) => match map.remove("value") {
                Some(inner @ serde_json::Value::Object(_)) => inner,
                Some(other) => {
                    map.insert("value".to_string(), other);
                    serde_json::Value::Object(map)
                }
                None => serde_json::Value::Object(map),
            },
            _ => return None,
        };
        serde_json::from_value(inner).ok()
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }
}
