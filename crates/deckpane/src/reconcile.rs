//! Projection from [`UiState`] to everything the surface and header show.
//!
//! `project` is pure and idempotent; the controller calls it after every
//! state change and pushes the result out.

use crate::constants::{
    LOADING_STATUS, NO_DOCUMENT_STAGE, NO_SLIDES_FOUND, NOTHING_TO_PREVIEW, UNSAVED_STATUS,
};
use crate::host::{ActionId, ActionVariant, HeaderAction};
use crate::slides;
use crate::state::{Preview, UiState};

pub const EXPORT_PDF_LABEL: &str = "⤓";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Loading,
    Empty,
    Error,
    Placeholder,
}

impl StageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Empty => "empty",
            Self::Error => "error",
            Self::Placeholder => "placeholder",
        }
    }
}

/// What the slide area shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Message { text: String, kind: StageKind },
    /// Rendered deck with the slide at `active` marked `is-active`.
    Deck {
        html: String,
        css: String,
        active: usize,
    },
}

impl Stage {
    fn message(text: &str, kind: StageKind) -> Self {
        Self::Message {
            text: text.to_string(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FullscreenButton {
    pub active: bool,
    pub disabled: bool,
}

impl FullscreenButton {
    pub fn label(&self) -> &'static str {
        if self.active { "⤺" } else { "⤢" }
    }

    pub fn title(&self) -> &'static str {
        if self.active {
            "Exit full screen"
        } else {
            "Enter full screen"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModel {
    /// Header status; `None` clears it.
    pub status: Option<String>,
    pub pagination_label: String,
    pub prev_disabled: bool,
    pub next_disabled: bool,
    pub fullscreen: FullscreenButton,
    pub export_disabled: bool,
    pub editor_disabled: bool,
    pub toolbar_disabled: bool,
    pub actions: Vec<HeaderAction>,
    pub stage: Stage,
}

pub fn project(state: &UiState, fullscreen_active: bool) -> ViewModel {
    let cursor = state.cursor();
    let count = cursor.count();
    let nav_disabled = state.loading || count == 0;
    let export_disabled = state.loading || !state.preview.has_content();
    let editor_disabled = !state.has_document() || state.loading;

    let actions = if state.has_document() {
        vec![HeaderAction {
            id: ActionId::ExportPdf,
            label: EXPORT_PDF_LABEL.to_string(),
            disabled: export_disabled,
            variant: ActionVariant::Outline,
        }]
    } else {
        Vec::new()
    };

    ViewModel {
        status: derive_status(state),
        pagination_label: cursor.label(),
        prev_disabled: nav_disabled || cursor.is_first(),
        next_disabled: nav_disabled || cursor.is_last(),
        fullscreen: FullscreenButton {
            active: fullscreen_active,
            disabled: export_disabled,
        },
        export_disabled,
        editor_disabled,
        toolbar_disabled: editor_disabled,
        actions,
        stage: derive_stage(state),
    }
}

pub fn derive_status(state: &UiState) -> Option<String> {
    let status = if !state.status_message.is_empty() {
        state.status_message.as_str()
    } else if state.loading {
        LOADING_STATUS
    } else if !state.has_document() {
        ""
    } else if state.is_dirty() {
        UNSAVED_STATUS
    } else {
        ""
    };
    (!status.is_empty()).then(|| status.to_string())
}

/// First match wins: loading, no document, error, blank output, no slides.
pub fn derive_stage(state: &UiState) -> Stage {
    if state.loading {
        return Stage::message(LOADING_STATUS, StageKind::Loading);
    }
    if !state.has_document() {
        return Stage::message(NO_DOCUMENT_STAGE, StageKind::Empty);
    }
    match &state.preview {
        Preview::Failed { message } => Stage::message(message, StageKind::Error),
        Preview::Empty => Stage::message(NOTHING_TO_PREVIEW, StageKind::Placeholder),
        Preview::Rendered { html, css, cursor } => {
            if html.trim().is_empty() || cursor.count() == 0 {
                return Stage::message(NOTHING_TO_PREVIEW, StageKind::Placeholder);
            }
            if !slides::has_slide_graphics(html) {
                return Stage::message(NO_SLIDES_FOUND, StageKind::Placeholder);
            }
            Stage::Deck {
                html: slides::mark_active(html, cursor.current()),
                css: css.clone(),
                active: cursor.current(),
            }
        }
    }
}
