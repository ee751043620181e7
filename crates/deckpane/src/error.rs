//! Error types shared by the preview core and its host adapters.
//!
//! None of these are fatal: the controller recovers from each locally and
//! reflects the failure in the view instead of propagating it.

use thiserror::Error;

/// Fallback shown when the engine fails without a usable message.
pub const GENERIC_RENDER_ERROR: &str = "Render error";

/// The rendering engine rejected the document.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid front-matter: {0}")]
    FrontMatter(#[from] serde_yaml::Error),

    #[error("{0}")]
    Engine(String),
}

impl RenderError {
    /// Human-readable text for the stage, never empty.
    pub fn display_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            GENERIC_RENDER_ERROR.to_string()
        } else {
            message
        }
    }
}

/// Key-value persistence failures reported by the host.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid store key: {0}")]
    InvalidKey(String),

    #[error("{0}")]
    Host(String),
}

/// Header/title bridge failures. Always swallowed by [`crate::host::Header`].
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Header bridge unavailable")]
    Unavailable,

    #[error("{0}")]
    Host(String),
}

#[derive(Debug, Error)]
pub enum FullscreenError {
    #[error("Fullscreen API unavailable")]
    Unavailable,

    #[error("Fullscreen request rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExportError {
    /// Text for the toast shown when a PDF export fails.
    pub fn toast_message(&self) -> &'static str {
        match self {
            Self::Io(_) => "Failed to prepare PDF export",
        }
    }
}

/// Failure of the host's action executor.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("{0}")]
    Host(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_error_message_falls_back_when_empty() {
        let err = RenderError::Engine("  ".to_string());
        assert_eq!(err.display_message(), GENERIC_RENDER_ERROR);
    }

    #[test]
    fn test_render_error_message_keeps_engine_text() {
        let err = RenderError::Engine("bad directive".to_string());
        assert_eq!(err.display_message(), "bad directive");
    }

    #[test]
    fn test_export_io_error_toast() {
        let err = ExportError::from(std::io::Error::other("disk full"));
        assert_eq!(err.toast_message(), "Failed to prepare PDF export");
        assert_eq!(err.to_string(), "I/O error: disk full");
    }
}
