//! Capabilities the surrounding editor lends to a preview: key-value storage,
//! the document header, and the surface the view model is drawn on.

use futures::future::BoxFuture;
use serde::Serialize;

use crate::error::{BridgeError, ExportError, StoreError};
use crate::reconcile::ViewModel;

/// Host key-value persistence. Records are JSON values addressed by
/// `(namespace, doc_id, key)`.
pub trait KvStore: Send + Sync {
    fn get(
        &self,
        namespace: &str,
        doc_id: &str,
        key: &str,
        token: Option<&str>,
    ) -> BoxFuture<'static, Result<Option<serde_json::Value>, StoreError>>;

    fn put(
        &self,
        namespace: &str,
        doc_id: &str,
        key: &str,
        value: serde_json::Value,
        token: Option<&str>,
    ) -> BoxFuture<'static, Result<(), StoreError>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionId {
    ExportPdf,
}

impl ActionId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExportPdf => "export-pdf",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionVariant {
    #[default]
    Default,
    Primary,
    Outline,
}

/// A button in the document header. Selecting it comes back to the
/// controller as [`crate::controller::PreviewController::on_action`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderAction {
    pub id: ActionId,
    pub label: String,
    pub disabled: bool,
    pub variant: ActionVariant,
}

/// The host's document header. Every call may fail; none of the failures
/// matter to the preview.
pub trait HeaderBridge: Send {
    fn set_title(&mut self, title: Option<&str>) -> Result<(), BridgeError>;
    fn set_status(&mut self, status: Option<&str>) -> Result<(), BridgeError>;
    fn set_badge(&mut self, badge: Option<&str>) -> Result<(), BridgeError>;
    fn set_actions(&mut self, actions: &[HeaderAction]) -> Result<(), BridgeError>;
}

/// Swallows every bridge failure, and every call when the host has no header.
#[derive(Default)]
pub struct Header {
    bridge: Option<Box<dyn HeaderBridge>>,
}

impl Header {
    pub fn new(bridge: Box<dyn HeaderBridge>) -> Self {
        Self {
            bridge: Some(bridge),
        }
    }

    pub fn detached() -> Self {
        Self::default()
    }

    pub fn set_title(&mut self, title: Option<&str>) {
        self.call("title", |b| b.set_title(title));
    }

    pub fn set_status(&mut self, status: Option<&str>) {
        self.call("status", |b| b.set_status(status));
    }

    pub fn set_badge(&mut self, badge: Option<&str>) {
        self.call("badge", |b| b.set_badge(badge));
    }

    pub fn set_actions(&mut self, actions: &[HeaderAction]) {
        self.call("actions", |b| b.set_actions(actions));
    }

    fn call<F>(&mut self, what: &str, f: F)
    where
        F: FnOnce(&mut Box<dyn HeaderBridge>) -> Result<(), BridgeError>,
    {
        let Some(bridge) = self.bridge.as_mut() else {
            return;
        };
        if let Err(e) = f(bridge) {
            log::debug!("header {what} update ignored: {e}");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

/// Retained-mode view the controller draws into.
pub trait Surface {
    /// Replace everything derived from state. Called after every change,
    /// so implementations should diff if redrawing is expensive.
    fn present(&mut self, view: &ViewModel);

    /// Overwrite the editor text. Only called on mount and after a load or
    /// a toolbar edit, never while the user is typing.
    fn sync_editor(&mut self, markdown: &str);

    /// Move input focus to the slide stage without scrolling.
    fn focus_stage(&mut self);

    fn toast(&mut self, level: ToastLevel, message: &str);

    /// Hand a standalone document to the platform print dialog.
    fn print_document(&mut self, html: &str) -> Result<(), ExportError>;

    /// Start delivering keyboard and fullscreen-change events.
    fn attach_listeners(&mut self) {}

    fn detach_listeners(&mut self) {}
}
