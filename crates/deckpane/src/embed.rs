//! Preview pane for the host's split editor. The host owns the text and
//! saves it; the pane only renders what it is given.

use std::sync::Arc;

use crate::constants::{PLUGIN_ID, STATE_KEY};
use crate::controller::{ControllerOptions, HostRequest, PreviewController};
use crate::engine::EngineService;
use crate::error::StoreError;
use crate::fullscreen::{FullscreenPlatform, NoFullscreen};
use crate::host::{KvStore, Surface};
use crate::state::PersistedRecord;

/// The shared document behind the split editor.
pub trait DocumentBridge {
    fn get_content(&self) -> String;
    fn set_content(&mut self, text: &str);
}

/// Copy a deck saved by the standalone preview into an empty shared document.
/// Returns whether anything was copied.
pub async fn migrate_persisted_content(
    bridge: &mut dyn DocumentBridge,
    store: &dyn KvStore,
    doc_id: &str,
    token: Option<&str>,
) -> Result<bool, StoreError> {
    if !bridge.get_content().trim().is_empty() {
        return Ok(false);
    }
    let value = store.get(PLUGIN_ID, doc_id, STATE_KEY, token).await?;
    let Some(record) = value.and_then(PersistedRecord::from_value) else {
        return Ok(false);
    };
    if record.markdown.trim().is_empty() {
        return Ok(false);
    }
    log::info!("migrating saved deck into document {doc_id}");
    bridge.set_content(&record.markdown);
    Ok(true)
}

pub struct SplitPreview<S: Surface, F: FullscreenPlatform = NoFullscreen> {
    controller: PreviewController<S, F>,
    migration_done: bool,
}

impl<S: Surface, F: FullscreenPlatform> SplitPreview<S, F> {
    /// Create and mount a pane for `doc_id`.
    pub fn new(
        doc_id: impl Into<String>,
        engine: Arc<EngineService>,
        surface: S,
        fullscreen: F,
        options: ControllerOptions,
    ) -> Self {
        let mut controller =
            PreviewController::embedded(Some(doc_id.into()), engine, surface, fullscreen, options);
        controller.mount();
        Self {
            controller,
            migration_done: false,
        }
    }

    pub fn update(&mut self, content: &str) {
        self.controller.set_content(content);
    }

    /// First-mount migration. Later calls do nothing.
    pub async fn on_document_ready(
        &mut self,
        bridge: &mut dyn DocumentBridge,
        store: &dyn KvStore,
        token: Option<&str>,
    ) -> bool {
        if std::mem::replace(&mut self.migration_done, true) {
            return false;
        }
        let Some(doc_id) = self.controller.state().doc_id.clone() else {
            return false;
        };
        match migrate_persisted_content(bridge, store, &doc_id, token).await {
            Ok(true) => {
                self.update(&bridge.get_content());
                true
            }
            Ok(false) => false,
            Err(e) => {
                log::warn!("content migration failed: {e}");
                false
            }
        }
    }

    pub fn on_frame(&mut self) {
        self.controller.on_frame();
    }

    pub fn engine_ready(&mut self) {
        self.controller.engine_ready();
    }

    pub fn take_requests(&mut self) -> Vec<HostRequest> {
        self.controller.take_requests()
    }

    pub fn controller(&self) -> &PreviewController<S, F> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut PreviewController<S, F> {
        &mut self.controller
    }

    pub fn dispose(&mut self) {
        self.controller.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{RenderEngine, RenderResult};
    use crate::error::{ExportError, RenderError};
    use crate::host::ToastLevel;
    use crate::reconcile::ViewModel;
    use crate::store::MemoryStore;
    use serde_json::json;

    #[derive(Default)]
    struct Views(Vec<ViewModel>);

    impl Surface for Views {
        fn present(&mut self, view: &ViewModel) {
            self.0.push(view.clone());
        }
        fn sync_editor(&mut self, _markdown: &str) {
            panic!("embedded pane must not touch the host editor");
        }
        fn focus_stage(&mut self) {}
        fn toast(&mut self, _level: ToastLevel, _message: &str) {}
        fn print_document(&mut self, _html: &str) -> Result<(), ExportError> {
            Ok(())
        }
    }

    struct Count;

    impl RenderEngine for Count {
        fn render(&self, markdown: &str) -> Result<RenderResult, RenderError> {
            let html = markdown
                .split("---")
                .map(|_| "<svg data-marpit-svg=\"\"></svg>")
                .collect();
            Ok(RenderResult {
                html,
                css: String::new(),
            })
        }
    }

    struct Doc(String);

    impl DocumentBridge for Doc {
        fn get_content(&self) -> String {
            self.0.clone()
        }
        fn set_content(&mut self, text: &str) {
            self.0 = text.to_string();
        }
    }

    fn pane() -> SplitPreview<Views> {
        let engine = Arc::new(EngineService::preloaded(Arc::new(Count)));
        SplitPreview::new(
            "deck",
            engine,
            Views::default(),
            NoFullscreen,
            ControllerOptions::default(),
        )
    }

    #[test]
    fn test_update_renders_without_saving() {
        let mut pane = pane();
        assert!(!pane.controller().state().loading);
        pane.update("a---b");
        pane.on_frame();
        assert_eq!(pane.controller().state().slide_count(), 2);
        assert!(pane.take_requests().is_empty());
        assert_eq!(pane.controller().view().status, None);
    }

    #[test]
    fn test_dispose_stops_rendering() {
        let mut pane = pane();
        pane.update("a");
        pane.dispose();
        pane.on_frame();
        assert_eq!(pane.controller().state().slide_count(), 0);
    }

    #[tokio::test]
    async fn test_migration_fills_empty_document_once() {
        let store = MemoryStore::default();
        store
            .put(PLUGIN_ID, "deck", STATE_KEY, json!({ "markdown": "# Saved" }), None)
            .await
            .unwrap();

        let mut pane = pane();
        let mut doc = Doc(String::new());
        assert!(pane.on_document_ready(&mut doc, &store, None).await);
        assert_eq!(doc.0, "# Saved");

        doc.0.clear();
        assert!(!pane.on_document_ready(&mut doc, &store, None).await);
        assert!(doc.0.is_empty());
    }

    #[tokio::test]
    async fn test_migration_keeps_existing_content() {
        let store = MemoryStore::default();
        store
            .put(PLUGIN_ID, "deck", STATE_KEY, json!({ "markdown": "# Saved" }), None)
            .await
            .unwrap();
        let mut doc = Doc("# Shared".to_string());
        let migrated = migrate_persisted_content(&mut doc, &store, "deck", None)
            .await
            .unwrap();
        assert!(!migrated);
        assert_eq!(doc.0, "# Shared");
    }
}
