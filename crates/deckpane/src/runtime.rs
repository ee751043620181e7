//! Event loop that owns a [`PreviewController`] and performs the host work
//! it asks for: engine loading, store reads and writes, frames and timers.

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, MissedTickBehavior};

use crate::constants::{PLUGIN_ID, STATE_KEY};
use crate::controller::{HostRequest, PreviewController};
use crate::error::StoreError;
use crate::fullscreen::FullscreenPlatform;
use crate::host::{ActionId, KvStore, Surface};
use crate::input::KeyInput;
use crate::toolbar::{Selection, ToolbarAction};

pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Input delivered to a running preview.
#[derive(Debug)]
pub enum Event {
    TextInput(String),
    Key(KeyInput),
    Prev,
    Next,
    ToggleFullscreen,
    FullscreenChanged,
    Action(ActionId),
    Toolbar {
        action: ToolbarAction,
        selection: Selection,
        reply: Option<oneshot::Sender<Selection>>,
    },
    Unmount,
}

enum Completion {
    EngineReady,
    Loaded(Result<Option<serde_json::Value>, StoreError>),
    Saved {
        revision: u64,
        result: Result<(), StoreError>,
    },
}

/// Drive `controller` until an [`Event::Unmount`] arrives or every sender is
/// dropped. Saves still in flight are awaited before the controller is
/// handed back.
pub async fn run<S, F>(
    mut controller: PreviewController<S, F>,
    store: Arc<dyn KvStore>,
    mut events: mpsc::UnboundedReceiver<Event>,
    frame_interval: Duration,
) -> PreviewController<S, F>
where
    S: Surface,
    F: FullscreenPlatform,
{
    let mut inflight: FuturesUnordered<BoxFuture<'static, Completion>> = FuturesUnordered::new();
    let mut frames = tokio::time::interval(frame_interval);
    frames.set_missed_tick_behavior(MissedTickBehavior::Delay);

    controller.mount();

    loop {
        dispatch(&mut controller, store.as_ref(), &mut inflight);
        if !controller.is_mounted() {
            break;
        }

        let deadline = controller.next_deadline();
        let wake_at = deadline.map_or_else(Instant::now, Instant::from_std);

        tokio::select! {
            event = events.recv() => match event {
                Some(event) => handle_event(&mut controller, event),
                None => controller.unmount(),
            },
            Some(done) = inflight.next(), if !inflight.is_empty() => {
                complete(&mut controller, done);
            }
            _ = frames.tick(), if controller.frame_pending() => controller.on_frame(),
            _ = tokio::time::sleep_until(wake_at), if deadline.is_some() => {
                controller.on_timer(Instant::now().into_std());
            }
        }
    }

    if !inflight.is_empty() {
        log::debug!("waiting for {} pending host call(s)", inflight.len());
    }
    while inflight.next().await.is_some() {}
    controller
}

fn handle_event<S: Surface, F: FullscreenPlatform>(
    controller: &mut PreviewController<S, F>,
    event: Event,
) {
    let now = Instant::now().into_std();
    match event {
        Event::TextInput(text) => controller.on_text_input(text, now),
        Event::Key(input) => {
            controller.handle_key(&input);
        }
        Event::Prev => controller.change_slide(-1),
        Event::Next => controller.change_slide(1),
        Event::ToggleFullscreen => controller.toggle_fullscreen(),
        Event::FullscreenChanged => controller.on_fullscreen_change(),
        Event::Action(action) => controller.on_action(action),
        Event::Toolbar {
            action,
            selection,
            reply,
        } => {
            let next = controller.on_toolbar_action(&action, selection, now);
            if let (Some(next), Some(reply)) = (next, reply) {
                let _ = reply.send(next);
            }
        }
        Event::Unmount => controller.unmount(),
    }
}

fn dispatch<S: Surface, F: FullscreenPlatform>(
    controller: &mut PreviewController<S, F>,
    store: &dyn KvStore,
    inflight: &mut FuturesUnordered<BoxFuture<'static, Completion>>,
) {
    // Completions can queue more work, so keep going until the queue is dry.
    loop {
        let requests = controller.take_requests();
        if requests.is_empty() {
            return;
        }
        for request in requests {
            match request {
                HostRequest::LoadEngine => {
                    if controller.engine().is_loaded() {
                        controller.engine_ready();
                        continue;
                    }
                    let engine = Arc::clone(controller.engine());
                    inflight.push(
                        async move {
                            match tokio::task::spawn_blocking(move || engine.load()).await {
                                Ok(_) => log::debug!("render engine loaded"),
                                Err(e) => log::error!("render engine failed to load: {e}"),
                            }
                            Completion::EngineReady
                        }
                        .boxed(),
                    );
                }
                HostRequest::Load { doc_id, token } => {
                    let read = store.get(PLUGIN_ID, &doc_id, STATE_KEY, token.as_deref());
                    inflight.push(read.map(Completion::Loaded).boxed());
                }
                HostRequest::Save {
                    doc_id,
                    token,
                    record,
                    revision,
                } => {
                    let value = match serde_json::to_value(&record) {
                        Ok(value) => value,
                        Err(e) => {
                            controller.save_finished(revision, Err(e.into()));
                            continue;
                        }
                    };
                    let write = store.put(PLUGIN_ID, &doc_id, STATE_KEY, value, token.as_deref());
                    inflight.push(
                        write
                            .map(move |result| Completion::Saved { revision, result })
                            .boxed(),
                    );
                }
            }
        }
    }
}

fn complete<S: Surface, F: FullscreenPlatform>(
    controller: &mut PreviewController<S, F>,
    done: Completion,
) {
    match done {
        Completion::EngineReady => controller.engine_ready(),
        Completion::Loaded(result) => controller.load_finished(result),
        Completion::Saved { revision, result } => controller.save_finished(revision, result),
    }
}
