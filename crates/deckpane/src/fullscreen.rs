//! Fullscreen for the slide stage. The platform is the only source of truth:
//! whether the stage is fullscreen is asked again every time it matters.

use crate::error::FullscreenError;

pub trait FullscreenPlatform {
    /// Whether the stage is the platform's current fullscreen element.
    fn is_stage_fullscreen(&self) -> bool;

    fn request_enter(&mut self) -> Result<(), FullscreenError>;

    fn request_exit(&mut self) -> Result<(), FullscreenError>;
}

/// Platform without fullscreen support. Requests fail and the stage is
/// never fullscreen.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFullscreen;

impl FullscreenPlatform for NoFullscreen {
    fn is_stage_fullscreen(&self) -> bool {
        false
    }

    fn request_enter(&mut self) -> Result<(), FullscreenError> {
        Err(FullscreenError::Unavailable)
    }

    fn request_exit(&mut self) -> Result<(), FullscreenError> {
        Err(FullscreenError::Unavailable)
    }
}

pub struct FullscreenControl<P> {
    platform: P,
}

impl<P: FullscreenPlatform> FullscreenControl<P> {
    pub fn new(platform: P) -> Self {
        Self { platform }
    }

    pub fn is_active(&self) -> bool {
        self.platform.is_stage_fullscreen()
    }

    /// Exit when the stage is fullscreen, enter otherwise. Failures are logged
    /// and dropped; callers re-derive the button either way.
    pub fn toggle(&mut self) {
        let result = if self.is_active() {
            self.platform.request_exit()
        } else {
            self.platform.request_enter()
        };
        if let Err(e) = result {
            log::error!("toggle fullscreen failed: {e}");
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }
}
