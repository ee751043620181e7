//! The preview controller: one per mounted preview.
//!
//! Every handler takes `&mut self`, runs to completion and reconciles the
//! view before returning. Work that has to happen outside the controller
//! (loading the engine, reading and writing the store) is queued as
//! [`HostRequest`]s; its completion comes back through `engine_ready`,
//! `load_finished` and `save_finished`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;

use crate::constants::{
    DEFAULT_MARKDOWN, DEFAULT_TITLE, LOAD_FAILED_STAGE, LOAD_FAILED_STATUS, LOADING_DECK_STATUS,
    SAVE_FAILED_STATUS, SAVE_FAILED_TOAST, SAVING_STATUS, UNSAVED_STATUS,
};
use crate::engine::EngineService;
use crate::error::StoreError;
use crate::export::{ExportOptions, build_html_export};
use crate::fullscreen::{FullscreenControl, FullscreenPlatform, NoFullscreen};
use crate::host::{ActionId, Header, Surface, ToastLevel};
use crate::input::KeyInput;
use crate::reconcile::{self, ViewModel};
use crate::scheduler::{Debounce, FrameSlot};
use crate::state::{PersistedRecord, Preview, UiState};
use crate::toolbar::{self, Selection, ToolbarAction};

pub const DEFAULT_SAVE_DELAY: Duration = Duration::from_millis(900);

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Quiet period after the last edit before the deck is saved.
    pub save_delay: Duration,
    /// Access token passed through to every store call.
    pub token: Option<String>,
    pub export: ExportOptions,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            save_delay: DEFAULT_SAVE_DELAY,
            token: None,
            export: ExportOptions::pdf(),
        }
    }
}

/// Work the controller needs from its host.
#[derive(Debug, Clone, PartialEq)]
pub enum HostRequest {
    /// Build the shared engine, then call `engine_ready`.
    LoadEngine,
    /// Read the persisted record, then call `load_finished`.
    Load {
        doc_id: String,
        token: Option<String>,
    },
    /// Write `record`, then call `save_finished` with `revision`.
    Save {
        doc_id: String,
        token: Option<String>,
        record: PersistedRecord,
        revision: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Created,
    Mounted,
    Unmounted,
}

pub struct PreviewController<S, F = NoFullscreen> {
    state: UiState,
    options: ControllerOptions,
    engine: Arc<EngineService>,
    surface: S,
    header: Header,
    fullscreen: FullscreenControl<F>,
    frame: FrameSlot,
    save_timer: Debounce,
    /// A render was requested before the engine was available.
    render_pending: bool,
    engine_requested: bool,
    listeners_attached: bool,
    lifecycle: Lifecycle,
    requests: Vec<HostRequest>,
}

impl<S: Surface, F: FullscreenPlatform> PreviewController<S, F> {
    /// Standalone preview that loads and saves its own deck.
    pub fn new(
        doc_id: Option<String>,
        engine: Arc<EngineService>,
        surface: S,
        header: Header,
        fullscreen: F,
        options: ControllerOptions,
    ) -> Self {
        Self::with_state(
            UiState::initial(doc_id),
            engine,
            surface,
            header,
            fullscreen,
            options,
        )
    }

    /// Preview inside a host editor that owns the text and its persistence.
    pub fn embedded(
        doc_id: Option<String>,
        engine: Arc<EngineService>,
        surface: S,
        fullscreen: F,
        options: ControllerOptions,
    ) -> Self {
        Self::with_state(
            UiState::embedded(doc_id),
            engine,
            surface,
            Header::detached(),
            fullscreen,
            options,
        )
    }

    fn with_state(
        state: UiState,
        engine: Arc<EngineService>,
        surface: S,
        header: Header,
        fullscreen: F,
        options: ControllerOptions,
    ) -> Self {
        let save_timer = Debounce::new(options.save_delay);
        Self {
            state,
            options,
            engine,
            surface,
            header,
            fullscreen: FullscreenControl::new(fullscreen),
            frame: FrameSlot::default(),
            save_timer,
            render_pending: false,
            engine_requested: false,
            listeners_attached: false,
            lifecycle: Lifecycle::Created,
            requests: Vec::new(),
        }
    }

    pub fn mount(&mut self) {
        if self.lifecycle != Lifecycle::Created {
            return;
        }
        self.lifecycle = Lifecycle::Mounted;

        self.header.set_title(Some(DEFAULT_TITLE));
        self.header.set_status(None);
        self.header.set_badge(None);
        self.header.set_actions(&[]);

        self.surface.attach_listeners();
        self.listeners_attached = true;
        if self.state.persistence.is_some() {
            self.surface.sync_editor(&self.state.markdown);
        }

        if !self.engine.is_loaded() {
            self.request_engine();
        }

        match (&self.state.persistence, &self.state.doc_id) {
            (Some(_), Some(doc_id)) => {
                log::debug!("loading deck {doc_id}");
                self.state.loading = true;
                self.state.status_message = LOADING_DECK_STATUS.to_string();
                self.requests.push(HostRequest::Load {
                    doc_id: doc_id.clone(),
                    token: self.options.token.clone(),
                });
            }
            _ => {
                self.state.loading = false;
                self.state.status_message.clear();
            }
        }
        self.apply_ui_state();
    }

    pub fn unmount(&mut self) {
        if self.lifecycle == Lifecycle::Unmounted {
            return;
        }
        self.frame.cancel();
        self.save_timer.cancel();
        self.render_pending = false;
        self.requests.clear();
        if self.listeners_attached {
            self.surface.detach_listeners();
            self.listeners_attached = false;
        }
        self.lifecycle = Lifecycle::Unmounted;
        log::debug!("preview unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        self.lifecycle == Lifecycle::Mounted
    }

    /// The shared engine finished loading.
    pub fn engine_ready(&mut self) {
        self.engine_requested = false;
        if !self.is_mounted() {
            return;
        }
        if std::mem::take(&mut self.render_pending) {
            log::debug!("engine ready, issuing deferred render");
            self.schedule_preview();
        }
    }

    pub fn load_finished(&mut self, result: Result<Option<serde_json::Value>, StoreError>) {
        if !self.is_mounted() {
            return;
        }
        match result {
            Ok(value) => {
                let record = value
                    .and_then(PersistedRecord::from_value)
                    .filter(|r| !r.markdown.is_empty());
                let last_saved_at = record.as_ref().and_then(PersistedRecord::updated_at);
                self.state.markdown = record
                    .map(|r| r.markdown)
                    .unwrap_or_else(|| DEFAULT_MARKDOWN.to_string());
                if let Some(persistence) = self.state.persistence.as_mut() {
                    persistence.dirty = false;
                    persistence.last_saved_at = last_saved_at;
                }
                self.state.loading = false;
                self.state.status_message.clear();
                self.state.preview = Preview::Empty;
                self.surface.sync_editor(&self.state.markdown);
                self.apply_ui_state();
                self.schedule_preview();
            }
            Err(e) => {
                log::error!("load failed: {e}");
                self.state.loading = false;
                self.state.status_message = LOAD_FAILED_STATUS.to_string();
                self.state.preview = Preview::Failed {
                    message: LOAD_FAILED_STAGE.to_string(),
                };
                self.apply_ui_state();
            }
        }
    }

    /// The user edited the deck. Ignored while the editor is disabled or
    /// when the text is unchanged.
    pub fn on_text_input(&mut self, text: impl Into<String>, now: Instant) {
        if !self.is_mounted() || !self.editor_enabled() {
            return;
        }
        let text = text.into();
        if text == self.state.markdown {
            return;
        }
        self.state.markdown = text;
        let owns_saves = match self.state.persistence.as_mut() {
            Some(persistence) => {
                persistence.dirty = true;
                persistence.revision += 1;
                true
            }
            None => false,
        };
        if owns_saves {
            self.state.status_message = UNSAVED_STATUS.to_string();
        }
        self.apply_ui_state();
        self.schedule_preview();
        if owns_saves {
            self.schedule_save(now);
        }
    }

    /// Apply a formatting button to the editor text. Returns the selection
    /// the editor should show afterwards.
    pub fn on_toolbar_action(
        &mut self,
        action: &ToolbarAction,
        selection: Selection,
        now: Instant,
    ) -> Option<Selection> {
        if !self.is_mounted() || !self.editor_enabled() {
            return None;
        }
        let edit = toolbar::apply(action, &self.state.markdown, selection)?;
        self.surface.sync_editor(&edit.text);
        self.on_text_input(edit.text, now);
        Some(edit.selection)
    }

    /// Replace the text from outside the editor, as the split view does.
    pub fn set_content(&mut self, text: impl Into<String>) {
        if !self.is_mounted() {
            return;
        }
        self.state.markdown = text.into();
        self.apply_ui_state();
        self.schedule_preview();
    }

    /// Render on the next frame, replacing any render already queued.
    pub fn schedule_preview(&mut self) {
        if !self.is_mounted() {
            return;
        }
        if !self.engine.is_loaded() {
            log::debug!("engine not loaded yet, deferring render");
            self.render_pending = true;
            self.request_engine();
            return;
        }
        if self.frame.request() {
            log::trace!("replaced queued render");
        }
    }

    pub fn frame_pending(&self) -> bool {
        self.is_mounted() && self.frame.is_pending()
    }

    pub fn render_pending(&self) -> bool {
        self.render_pending
    }

    /// Called once per display frame. Renders the current text if a render
    /// was requested since the last frame.
    pub fn on_frame(&mut self) {
        if !self.is_mounted() || !self.frame.take() {
            return;
        }
        let Some(engine) = self.engine.get() else {
            self.render_pending = true;
            self.request_engine();
            return;
        };

        let previous = self.state.cursor();
        self.state.preview = match engine.render(&self.state.markdown) {
            Ok(result) => Preview::rendered(result, previous),
            Err(e) => {
                log::error!("render failed: {e}");
                Preview::Failed {
                    message: e.display_message(),
                }
            }
        };
        log::trace!("rendered {} slide(s)", self.state.slide_count());
        self.apply_ui_state();
    }

    /// Restart the save delay.
    pub fn schedule_save(&mut self, now: Instant) {
        if self.is_mounted() {
            self.save_timer.arm(now);
        }
    }

    /// When the runtime should next call [`Self::on_timer`].
    pub fn next_deadline(&self) -> Option<Instant> {
        self.save_timer.deadline().filter(|_| self.is_mounted())
    }

    pub fn on_timer(&mut self, now: Instant) {
        if self.is_mounted() && self.save_timer.take_due(now) {
            self.perform_save();
        }
    }

    pub fn perform_save(&mut self) {
        if !self.is_mounted() {
            return;
        }
        let Some(doc_id) = self.state.doc_id.clone() else {
            return;
        };
        let Some(persistence) = self.state.persistence.as_mut() else {
            return;
        };
        if !persistence.dirty && !persistence.saving {
            return;
        }
        persistence.saving = true;
        persistence.in_flight += 1;
        let revision = persistence.revision;

        self.state.status_message = SAVING_STATUS.to_string();
        self.requests.push(HostRequest::Save {
            doc_id,
            token: self.options.token.clone(),
            record: PersistedRecord::new(self.state.markdown.clone(), Utc::now()),
            revision,
        });
        self.apply_ui_state();
    }

    /// A save issued at `revision` completed. Edits made since then stay dirty.
    pub fn save_finished(&mut self, revision: u64, result: Result<(), StoreError>) {
        if !self.is_mounted() {
            return;
        }
        let Some(persistence) = self.state.persistence.as_mut() else {
            return;
        };
        persistence.in_flight = persistence.in_flight.saturating_sub(1);
        persistence.saving = persistence.in_flight > 0;
        match result {
            Ok(()) => {
                if persistence.revision == revision {
                    persistence.dirty = false;
                }
                persistence.last_saved_at = Some(Utc::now());
                if persistence.saving {
                    self.state.status_message = SAVING_STATUS.to_string();
                } else {
                    self.state.status_message.clear();
                }
                self.apply_ui_state();
            }
            Err(e) => {
                log::error!("save failed: {e}");
                self.state.status_message = SAVE_FAILED_STATUS.to_string();
                self.apply_ui_state();
                self.surface.toast(ToastLevel::Error, SAVE_FAILED_TOAST);
            }
        }
    }

    pub fn change_slide(&mut self, delta: isize) {
        if !self.is_mounted() || self.state.loading || self.state.slide_count() == 0 {
            return;
        }
        let cursor = self.state.cursor();
        let next = cursor.offset(delta);
        if next == cursor {
            return;
        }
        self.state.set_cursor(next);
        self.apply_ui_state();
        self.surface.focus_stage();
    }

    /// Returns `true` when the key was consumed.
    pub fn handle_key(&mut self, input: &KeyInput) -> bool {
        if !self.is_mounted() || !self.listeners_attached {
            return false;
        }
        if input.is_save_shortcut() {
            self.perform_save();
            return true;
        }
        if input.in_text_input {
            return false;
        }
        match input.slide_delta() {
            Some(delta) => {
                self.change_slide(delta);
                true
            }
            None => false,
        }
    }

    pub fn toggle_fullscreen(&mut self) {
        if !self.is_mounted() {
            return;
        }
        self.fullscreen.toggle();
        self.apply_ui_state();
    }

    /// The platform entered or left fullscreen on its own (Escape, for one).
    pub fn on_fullscreen_change(&mut self) {
        if self.is_mounted() && self.listeners_attached {
            self.apply_ui_state();
        }
    }

    pub fn on_action(&mut self, action: ActionId) {
        match action {
            ActionId::ExportPdf => self.export_pdf(),
        }
    }

    pub fn export_pdf(&mut self) {
        if !self.is_mounted() || !self.state.preview.has_content() {
            return;
        }
        let document = build_html_export(
            self.state.preview.html(),
            self.state.preview.css(),
            &self.options.export,
        );
        if let Err(e) = self.surface.print_document(&document) {
            log::error!("pdf export failed: {e}");
            self.surface.toast(ToastLevel::Error, e.toast_message());
        }
    }

    /// Current projection of the state, as last pushed to the surface.
    pub fn view(&self) -> ViewModel {
        reconcile::project(&self.state, self.fullscreen.is_active())
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn fullscreen_platform(&self) -> &F {
        self.fullscreen.platform()
    }

    pub fn fullscreen_platform_mut(&mut self) -> &mut F {
        self.fullscreen.platform_mut()
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn engine(&self) -> &Arc<EngineService> {
        &self.engine
    }

    /// Drain the work queued since the last call.
    pub fn take_requests(&mut self) -> Vec<HostRequest> {
        std::mem::take(&mut self.requests)
    }

    fn editor_enabled(&self) -> bool {
        self.state.has_document() && !self.state.loading
    }

    fn request_engine(&mut self) {
        if !self.engine_requested {
            self.engine_requested = true;
            self.requests.push(HostRequest::LoadEngine);
        }
    }

    fn apply_ui_state(&mut self) {
        let view = self.view();
        self.header.set_badge(None);
        self.header.set_status(view.status.as_deref());
        self.header.set_actions(&view.actions);
        self.surface.present(&view);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{RenderEngine, RenderResult};
    use crate::error::{ExportError, FullscreenError, RenderError};
    use crate::input::Key;
    use crate::reconcile::{Stage, StageKind};
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        views: Vec<ViewModel>,
        editor: Vec<String>,
        toasts: Vec<String>,
        printed: Vec<String>,
        focused: usize,
        attached: bool,
        fail_print: bool,
    }

    impl Surface for Recorder {
        fn present(&mut self, view: &ViewModel) {
            self.views.push(view.clone());
        }

        fn sync_editor(&mut self, markdown: &str) {
            self.editor.push(markdown.to_string());
        }

        fn focus_stage(&mut self) {
            self.focused += 1;
        }

        fn toast(&mut self, _level: ToastLevel, message: &str) {
            self.toasts.push(message.to_string());
        }

        fn print_document(&mut self, html: &str) -> Result<(), ExportError> {
            if self.fail_print {
                return Err(std::io::Error::other("read-only").into());
            }
            self.printed.push(html.to_string());
            Ok(())
        }

        fn attach_listeners(&mut self) {
            self.attached = true;
        }

        fn detach_listeners(&mut self) {
            self.attached = false;
        }
    }

    /// One slide per non-empty line; a line reading `!` fails.
    struct Lines {
        calls: Mutex<Vec<String>>,
    }

    impl RenderEngine for Lines {
        fn render(&self, markdown: &str) -> Result<RenderResult, RenderError> {
            self.calls.lock().unwrap().push(markdown.to_string());
            if markdown.lines().any(|l| l == "!") {
                return Err(RenderError::Engine("bad deck".to_string()));
            }
            let html = markdown
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(|l| format!("<svg data-marpit-svg=\"\"><section>{l}</section></svg>"))
                .collect();
            Ok(RenderResult {
                html,
                css: "section{}".to_string(),
            })
        }
    }

    fn lines_engine() -> (Arc<Lines>, Arc<EngineService>) {
        let lines = Arc::new(Lines {
            calls: Mutex::new(Vec::new()),
        });
        let service = EngineService::preloaded(lines.clone());
        (lines, Arc::new(service))
    }

    fn controller(doc: Option<&str>) -> (Arc<Lines>, PreviewController<Recorder>) {
        let (lines, engine) = lines_engine();
        let controller = PreviewController::new(
            doc.map(str::to_string),
            engine,
            Recorder::default(),
            Header::detached(),
            NoFullscreen,
            ControllerOptions::default(),
        );
        (lines, controller)
    }

    /// Mounted, loaded with `markdown`, and rendered once.
    fn ready(markdown: &str) -> (Arc<Lines>, PreviewController<Recorder>) {
        let (lines, mut c) = controller(Some("deck"));
        c.mount();
        c.take_requests();
        c.load_finished(Ok(Some(json!({ "markdown": markdown }))));
        c.on_frame();
        (lines, c)
    }

    #[test]
    fn test_mount_requests_load() {
        let (_, mut c) = controller(Some("deck"));
        c.mount();
        assert!(c.state().loading);
        assert_eq!(
            c.take_requests(),
            vec![HostRequest::Load {
                doc_id: "deck".to_string(),
                token: None
            }]
        );
        assert!(c.surface().attached);
        assert_eq!(c.surface().editor, vec![DEFAULT_MARKDOWN.to_string()]);
    }

    #[test]
    fn test_mount_without_document() {
        let (_, mut c) = controller(None);
        c.mount();
        assert!(!c.state().loading);
        assert!(c.take_requests().is_empty());
        let view = c.surface().views.last().unwrap();
        assert_eq!(view.status, None);
        assert!(view.editor_disabled);
        assert!(matches!(
            view.stage,
            Stage::Message {
                kind: StageKind::Empty,
                ..
            }
        ));
    }

    #[test]
    fn test_fresh_mount_renders_default_deck() {
        let (_, mut c) = controller(Some("deck"));
        c.mount();
        c.load_finished(Ok(None));
        assert!(!c.state().loading);
        assert_eq!(c.state().status_message, "");
        assert_eq!(c.state().markdown, DEFAULT_MARKDOWN);
        assert!(c.frame_pending());
        c.on_frame();
        assert!(c.state().slide_count() > 0);
    }

    #[test]
    fn test_load_failure_keeps_default_content() {
        let (_, mut c) = controller(Some("deck"));
        c.mount();
        c.load_finished(Err(StoreError::Host("offline".to_string())));
        assert!(!c.state().loading);
        assert_eq!(c.state().markdown, DEFAULT_MARKDOWN);
        let view = c.view();
        assert_eq!(view.status.as_deref(), Some(LOAD_FAILED_STATUS));
        assert_eq!(
            view.stage,
            Stage::Message {
                text: LOAD_FAILED_STAGE.to_string(),
                kind: StageKind::Error
            }
        );
        assert!(!view.editor_disabled);
    }

    #[test]
    fn test_renders_coalesce_to_latest_text() {
        let (lines, mut c) = ready("a");
        lines.calls.lock().unwrap().clear();
        let now = Instant::now();

        c.on_text_input("a\nb", now);
        c.on_text_input("a\nb\nc", now);
        c.schedule_preview();
        c.on_frame();
        c.on_frame();

        assert_eq!(*lines.calls.lock().unwrap(), vec!["a\nb\nc".to_string()]);
        assert_eq!(c.state().slide_count(), 3);
    }

    #[test]
    fn test_shrinking_deck_clamps_cursor() {
        let (_, mut c) = ready("1\n2\n3\n4\n5");
        c.change_slide(4);
        assert_eq!(c.state().current_slide(), 4);

        c.on_text_input("1\n2", Instant::now());
        c.on_frame();
        assert_eq!(c.state().slide_count(), 2);
        assert_eq!(c.state().current_slide(), 1);
        assert_eq!(c.view().pagination_label, "2 / 2");
    }

    #[test]
    fn test_render_failure_resets_preview() {
        let (_, mut c) = ready("1\n2\n3");
        c.change_slide(2);
        c.on_text_input("1\n!", Instant::now());
        c.on_frame();
        assert_eq!(c.state().slide_count(), 0);
        assert_eq!(c.state().current_slide(), 0);
        assert_eq!(c.state().preview.html(), "");
        assert_eq!(c.state().preview.error(), Some("bad deck"));

        c.on_text_input("1\n2", Instant::now());
        c.on_frame();
        assert_eq!(c.state().preview.error(), None);
        assert_eq!(c.state().current_slide(), 0);
    }

    #[test]
    fn test_change_slide_is_noop_when_loading_or_empty() {
        let (_, mut c) = controller(Some("deck"));
        c.mount();
        let before = c.state().clone();
        c.change_slide(1);
        assert_eq!(*c.state(), before);

        let (_, mut c) = ready(" ");
        c.change_slide(1);
        c.change_slide(-1);
        assert_eq!(c.state().current_slide(), 0);
        assert_eq!(c.surface().focused, 0);
    }

    #[test]
    fn test_change_slide_focuses_stage_only_on_move() {
        let (_, mut c) = ready("1\n2");
        c.change_slide(-1);
        assert_eq!(c.surface().focused, 0);
        c.change_slide(1);
        assert_eq!(c.surface().focused, 1);
        c.change_slide(1);
        assert_eq!(c.surface().focused, 1);
    }

    #[test]
    fn test_edit_arms_save_and_timer_saves() {
        let (_, mut c) = ready("a");
        c.take_requests();
        let start = Instant::now();
        c.on_text_input("b", start);
        assert!(c.state().is_dirty());
        assert_eq!(c.view().status.as_deref(), Some(UNSAVED_STATUS));
        assert_eq!(c.next_deadline(), Some(start + DEFAULT_SAVE_DELAY));

        c.on_timer(start + Duration::from_millis(100));
        assert!(c.take_requests().is_empty());

        c.on_timer(start + DEFAULT_SAVE_DELAY);
        let requests = c.take_requests();
        let [HostRequest::Save { record, revision, .. }] = requests.as_slice() else {
            panic!("expected one save, got {requests:?}");
        };
        assert_eq!(record.markdown, "b");
        assert!(c.state().is_saving());
        assert_eq!(c.view().status.as_deref(), Some(SAVING_STATUS));

        c.save_finished(*revision, Ok(()));
        assert!(!c.state().is_dirty());
        assert!(!c.state().is_saving());
        assert_eq!(c.view().status, None);
        assert!(c.state().persistence.as_ref().unwrap().last_saved_at.is_some());
    }

    #[test]
    fn test_edit_during_save_stays_dirty() {
        let (_, mut c) = ready("a");
        let now = Instant::now();
        c.on_text_input("b", now);
        c.perform_save();
        let Some(HostRequest::Save { revision, .. }) = c.take_requests().pop() else {
            panic!("expected save");
        };
        c.on_text_input("c", now);
        c.save_finished(revision, Ok(()));
        assert!(c.state().is_dirty());
        assert_eq!(c.view().status.as_deref(), Some(UNSAVED_STATUS));
    }

    #[test]
    fn test_save_failure_keeps_dirty_and_toasts() {
        let (_, mut c) = ready("a");
        c.on_text_input("b", Instant::now());
        c.perform_save();
        c.take_requests();
        c.save_finished(1, Err(StoreError::Host("quota".to_string())));
        assert!(c.state().is_dirty());
        assert_eq!(c.view().status.as_deref(), Some(SAVE_FAILED_STATUS));
        assert_eq!(c.surface().toasts, vec![SAVE_FAILED_TOAST.to_string()]);
        assert!(c.take_requests().is_empty());
    }

    #[test]
    fn test_save_is_noop_when_clean() {
        let (_, mut c) = ready("a");
        c.take_requests();
        c.perform_save();
        assert!(c.take_requests().is_empty());
    }

    #[test]
    fn test_keyboard_navigation_and_save_shortcut() {
        let (_, mut c) = ready("1\n2\n3");
        assert!(c.handle_key(&KeyInput::new(Key::ArrowRight)));
        assert!(c.handle_key(&KeyInput::new(Key::ArrowDown)));
        assert_eq!(c.state().current_slide(), 2);
        assert!(c.handle_key(&KeyInput::new(Key::ArrowUp)));
        assert_eq!(c.state().current_slide(), 1);

        assert!(!c.handle_key(&KeyInput::new(Key::ArrowLeft).in_editor()));
        assert_eq!(c.state().current_slide(), 1);
        assert!(!c.handle_key(&KeyInput::new(Key::Char('x'))));

        c.on_text_input("1\n2\n3\n4", Instant::now());
        c.take_requests();
        let save = KeyInput::new(Key::Char('s')).with_ctrl().in_editor();
        assert!(c.handle_key(&save));
        assert!(matches!(
            c.take_requests().as_slice(),
            [HostRequest::Save { .. }]
        ));
    }

    #[test]
    fn test_text_input_ignored_while_loading() {
        let (lines, mut c) = controller(Some("deck"));
        c.mount();
        c.on_text_input("typed too early", Instant::now());
        assert_eq!(c.state().markdown, DEFAULT_MARKDOWN);
        assert!(!c.frame_pending());
        assert!(lines.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_export_pdf_prints_document() {
        let (_, mut c) = ready("1");
        c.on_action(ActionId::ExportPdf);
        let printed = &c.surface().printed;
        assert_eq!(printed.len(), 1);
        assert!(printed[0].contains("@page { size: 1280px 720px; margin: 0; }"));

        let (_, mut empty) = ready(" ");
        empty.export_pdf();
        assert!(empty.surface().printed.is_empty());
        assert!(empty.surface().toasts.is_empty());
    }

    #[test]
    fn test_export_pdf_failure_toasts() {
        let (_, mut c) = ready("1");
        c.surface_mut().fail_print = true;
        c.export_pdf();
        assert!(c.surface().printed.is_empty());
        assert_eq!(c.surface().toasts, vec!["Failed to prepare PDF export".to_string()]);
    }

    #[test]
    fn test_toolbar_edits_text() {
        let (_, mut c) = ready("title");
        let selection = c
            .on_toolbar_action(&ToolbarAction::Heading, Selection::caret(0), Instant::now())
            .unwrap();
        assert_eq!(c.state().markdown, "# title");
        assert_eq!(selection, Selection::caret(2));
        assert_eq!(c.surface().editor.last().map(String::as_str), Some("# title"));
        assert!(c.state().is_dirty());
    }

    #[test]
    fn test_unmount_cancels_pending_work() {
        let (lines, mut c) = ready("a");
        lines.calls.lock().unwrap().clear();
        let now = Instant::now();
        c.on_text_input("b", now);
        c.unmount();

        assert!(!c.surface().attached);
        assert!(!c.frame_pending());
        assert_eq!(c.next_deadline(), None);
        c.on_frame();
        c.on_timer(now + Duration::from_secs(5));
        assert!(lines.calls.lock().unwrap().is_empty());
        assert!(c.take_requests().is_empty());
        assert!(!c.handle_key(&KeyInput::new(Key::ArrowRight)));
    }

    #[test]
    fn test_render_waits_for_engine() {
        let lines = Arc::new(Lines {
            calls: Mutex::new(Vec::new()),
        });
        let engine = Arc::new(EngineService::new({
            let lines = lines.clone();
            move || lines.clone() as Arc<dyn RenderEngine>
        }));
        let mut c = PreviewController::new(
            Some("deck".to_string()),
            engine.clone(),
            Recorder::default(),
            Header::detached(),
            NoFullscreen,
            ControllerOptions::default(),
        );
        c.mount();
        assert_eq!(
            c.take_requests(),
            vec![
                HostRequest::LoadEngine,
                HostRequest::Load {
                    doc_id: "deck".to_string(),
                    token: None
                }
            ]
        );

        c.load_finished(Ok(Some(json!({ "markdown": "x\ny" }))));
        assert!(c.render_pending());
        assert!(!c.frame_pending());
        assert!(c.take_requests().is_empty());

        engine.load();
        c.engine_ready();
        assert!(c.frame_pending());
        c.on_frame();
        assert_eq!(c.state().slide_count(), 2);
    }

    #[test]
    fn test_empty_record_loads_default() {
        let (_, mut c) = controller(Some("deck"));
        c.mount();
        c.take_requests();
        c.load_finished(Ok(Some(json!({ "markdown": "", "updatedAt": "2024-01-01T00:00:00.000Z" }))));
        assert_eq!(c.state().markdown, DEFAULT_MARKDOWN);
        assert!(!c.state().is_dirty());
        assert!(!c.state().loading);
        assert_eq!(c.surface().editor.last().map(String::as_str), Some(DEFAULT_MARKDOWN));
        c.on_frame();
        assert!(c.state().slide_count() >= 1);
    }

    #[test]
    fn test_identical_text_is_not_an_edit() {
        let (_, mut c) = controller(Some("deck"));
        c.mount();
        c.on_text_input("b", Instant::now());
        c.load_finished(Ok(Some(json!({ "markdown": "a" }))));
        c.on_frame();
        c.take_requests();

        c.on_text_input("a", Instant::now());
        assert!(!c.state().is_dirty());
        assert!(!c.frame_pending());
        assert_eq!(c.next_deadline(), None);

        c.on_text_input("b", Instant::now());
        assert_eq!(c.state().markdown, "b");
        assert!(c.state().is_dirty());
        assert!(c.frame_pending());
    }

    #[test]
    fn test_overlapping_saves_keep_saving_status() {
        let (_, mut c) = ready("a");
        let now = Instant::now();
        c.on_text_input("b", now);
        c.perform_save();
        c.on_text_input("c", now);
        c.perform_save();
        let revisions: Vec<u64> = c
            .take_requests()
            .into_iter()
            .filter_map(|r| match r {
                HostRequest::Save { revision, .. } => Some(revision),
                _ => None,
            })
            .collect();
        assert_eq!(revisions, vec![1, 2]);

        c.save_finished(1, Ok(()));
        assert!(c.state().is_saving());
        assert!(c.state().is_dirty());
        assert_eq!(c.view().status.as_deref(), Some(SAVING_STATUS));

        c.save_finished(2, Ok(()));
        assert!(!c.state().is_saving());
        assert!(!c.state().is_dirty());
        assert_eq!(c.view().status, None);
    }

    #[derive(Default)]
    struct Toggle {
        active: bool,
        reject: bool,
    }

    impl FullscreenPlatform for Toggle {
        fn is_stage_fullscreen(&self) -> bool {
            self.active
        }

        fn request_enter(&mut self) -> Result<(), FullscreenError> {
            if self.reject {
                return Err(FullscreenError::Rejected("not allowed".to_string()));
            }
            self.active = true;
            Ok(())
        }

        fn request_exit(&mut self) -> Result<(), FullscreenError> {
            self.active = false;
            Ok(())
        }
    }

    fn with_fullscreen(platform: Toggle) -> PreviewController<Recorder, Toggle> {
        let (_, engine) = lines_engine();
        let mut c = PreviewController::new(
            Some("deck".to_string()),
            engine,
            Recorder::default(),
            Header::detached(),
            platform,
            ControllerOptions::default(),
        );
        c.mount();
        c.take_requests();
        c.load_finished(Ok(Some(json!({ "markdown": "1\n2" }))));
        c.on_frame();
        c
    }

    #[test]
    fn test_toggle_fullscreen_follows_platform() {
        let mut c = with_fullscreen(Toggle::default());
        assert!(!c.view().fullscreen.active);

        c.toggle_fullscreen();
        assert!(c.fullscreen_platform().active);
        assert!(c.surface().views.last().unwrap().fullscreen.active);

        // Left fullscreen without going through the button.
        c.fullscreen_platform_mut().active = false;
        let before = c.surface().views.len();
        c.on_fullscreen_change();
        assert_eq!(c.surface().views.len(), before + 1);
        assert!(!c.surface().views.last().unwrap().fullscreen.active);

        c.toggle_fullscreen();
        assert!(c.view().fullscreen.active);
        c.toggle_fullscreen();
        assert!(!c.view().fullscreen.active);
    }

    #[test]
    fn test_rejected_fullscreen_still_reconciles() {
        let mut c = with_fullscreen(Toggle {
            reject: true,
            ..Default::default()
        });
        let before = c.surface().views.len();
        c.toggle_fullscreen();
        assert_eq!(c.surface().views.len(), before + 1);
        assert!(!c.surface().views.last().unwrap().fullscreen.active);
        assert!(c.surface().toasts.is_empty());
    }

    #[test]
    fn test_fullscreen_change_ignored_after_unmount() {
        let mut c = with_fullscreen(Toggle::default());
        c.unmount();
        let before = c.surface().views.len();
        c.fullscreen_platform_mut().active = true;
        c.on_fullscreen_change();
        c.toggle_fullscreen();
        assert_eq!(c.surface().views.len(), before);
    }
}
