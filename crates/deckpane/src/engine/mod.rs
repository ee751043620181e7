pub mod deck;
pub mod directives;
pub mod highlight;
pub mod splitter;
pub mod theme;

use std::sync::{Arc, OnceLock};

use crate::error::RenderError;

pub use deck::{DeckEngine, DeckOptions};

/// HTML and CSS produced together by one engine call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderResult {
    pub html: String,
    pub css: String,
}

/// Turns deck Markdown into slide HTML. Implementations are stateless between
/// calls, so one instance is shared by every preview.
pub trait RenderEngine: Send + Sync {
    fn render(&self, markdown: &str) -> Result<RenderResult, RenderError>;
}

type EngineFactory = Box<dyn Fn() -> Arc<dyn RenderEngine> + Send + Sync>;

/// Lazily built engine shared between previews.
///
/// The factory runs at most once, on the first [`EngineService::load`].
/// Until then [`EngineService::get`] returns `None` and callers must wait
/// for the load to finish.
pub struct EngineService {
    engine: OnceLock<Arc<dyn RenderEngine>>,
    factory: EngineFactory,
}

impl EngineService {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Arc<dyn RenderEngine> + Send + Sync + 'static,
    {
        Self {
            engine: OnceLock::new(),
            factory: Box::new(factory),
        }
    }

    /// Service backed by the built-in deck engine.
    pub fn builtin(options: DeckOptions) -> Self {
        Self::new(move || {
            log::debug!("building deck engine (theme {})", options.default_theme);
            Arc::new(DeckEngine::new(options.clone())) as Arc<dyn RenderEngine>
        })
    }

    /// Service whose engine is already available.
    pub fn preloaded(engine: Arc<dyn RenderEngine>) -> Self {
        let service = Self::new({
            let engine = engine.clone();
            move || engine.clone()
        });
        let _ = service.engine.set(engine);
        service
    }

    pub fn get(&self) -> Option<Arc<dyn RenderEngine>> {
        self.engine.get().cloned()
    }

    /// Build the engine if needed. Blocking; call off the UI loop.
    pub fn load(&self) -> Arc<dyn RenderEngine> {
        self.engine.get_or_init(|| (self.factory)()).clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.engine.get().is_some()
    }
}

impl std::fmt::Debug for EngineService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineService")
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
