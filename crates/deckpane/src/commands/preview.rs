use anyhow::{Context, Result};
use chrono::Utc;
use colored::Colorize;
use notify_debouncer_mini::notify::RecursiveMode;
use notify_debouncer_mini::{DebounceEventResult, new_debouncer};
use std::fmt::Write;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedSender};

use deckpane::config::Config;
use deckpane::constants::{PLUGIN_ID, SAVING_STATUS, STATE_KEY};
use deckpane::controller::{ControllerOptions, PreviewController};
use deckpane::engine::highlight::escape_html;
use deckpane::engine::{DeckOptions, EngineService};
use deckpane::error::{BridgeError, ExportError};
use deckpane::export::ExportOptions;
use deckpane::fullscreen::NoFullscreen;
use deckpane::host::{ActionId, Header, HeaderAction, HeaderBridge, KvStore, Surface, ToastLevel};
use deckpane::input::{Key, KeyInput};
use deckpane::reconcile::{Stage, ViewModel};
use deckpane::runtime::{self, Event};
use deckpane::state::PersistedRecord;
use deckpane::store::FileStore;

const WATCH_DEBOUNCE: Duration = Duration::from_millis(150);

const PREVIEW_STYLES: &str = "\
body { margin: 0; font-family: system-ui, sans-serif; background: #2b2b2b; }
.deckpane-bar { display: flex; gap: 1em; align-items: center; padding: 6px 12px; background: #1e1e1e; color: #ddd; font-size: 14px; }
.deckpane-bar .status { flex: 1; opacity: 0.7; }
.deckpane-bar button[disabled] { opacity: 0.4; }
.stage { display: flex; justify-content: center; align-items: center; min-height: calc(100vh - 40px); }
.stage-message { color: #bbb; font-size: 18px; }
.stage-error { color: #f88; }
.marpit { width: 100%; max-width: 1280px; }
.marpit > svg { display: none; }
.marpit > svg.is-active { display: block; width: 100%; height: auto; }";

const KEY_HELP: &str = "keys: n/enter next, p previous, s save, e export, q quit";

pub fn run(file: PathBuf, out: Option<PathBuf>, slide: Option<usize>, quiet: bool) -> Result<()> {
    let markdown = super::read_deck(&file)?;
    let config = Config::load_or_default();
    let doc_id = super::doc_id_for(&file)?;
    let out = out.unwrap_or_else(|| file.with_extension("preview.html"));

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    rt.block_on(serve(Session {
        file,
        out,
        doc_id,
        markdown,
        start_slide: slide.unwrap_or(1),
        config,
        quiet,
    }))
}

struct Session {
    file: PathBuf,
    out: PathBuf,
    doc_id: String,
    markdown: String,
    start_slide: usize,
    config: Config,
    quiet: bool,
}

async fn serve(session: Session) -> Result<()> {
    let Session {
        file,
        out,
        doc_id,
        markdown,
        start_slide,
        config,
        quiet,
    } = session;

    let store = Arc::new(FileStore::new(config.store_dir()?));
    let seed = serde_json::to_value(PersistedRecord::new(markdown, Utc::now()))?;
    store
        .put(PLUGIN_ID, &doc_id, STATE_KEY, seed, None)
        .await
        .with_context(|| format!("Failed to seed store at {}", store.dir().display()))?;

    let (tx, rx) = mpsc::unbounded_channel();

    let _watcher = watch_file(&file, tx.clone())?;
    spawn_key_reader(tx.clone());
    let signal_tx = tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = signal_tx.send(Event::Unmount);
        }
    });

    let (page_width, page_height) = config.page_size();
    let options = ControllerOptions {
        save_delay: config.save_delay(),
        token: None,
        export: ExportOptions {
            page_width,
            page_height,
            title: doc_id.clone(),
            ..ExportOptions::pdf()
        },
    };
    let engine = Arc::new(EngineService::builtin(DeckOptions {
        default_theme: config.default_theme().to_string(),
    }));
    let surface = HtmlFileSurface::new(out.clone(), doc_id.clone(), start_slide, tx, quiet);
    let controller = PreviewController::new(
        Some(doc_id),
        engine,
        surface,
        Header::new(Box::new(TerminalHeader::new(quiet))),
        NoFullscreen,
        options,
    );

    if !quiet {
        println!(
            "Previewing {} {}",
            file.display().to_string().bold(),
            format!("→ {}", out.display()).dimmed()
        );
        println!("{}", KEY_HELP.dimmed());
    }

    let controller = runtime::run(controller, store, rx, config.frame_interval()).await;

    if !quiet {
        let slides = controller.state().slide_count();
        println!("{}", format!("Preview closed ({slides} slide(s)).").green());
    }
    Ok(())
}

/// Feed the file's content to the preview whenever it changes on disk.
fn watch_file(
    file: &Path,
    tx: UnboundedSender<Event>,
) -> Result<notify_debouncer_mini::Debouncer<notify_debouncer_mini::notify::RecommendedWatcher>> {
    let file = std::fs::canonicalize(file)
        .with_context(|| format!("Failed to resolve {}", file.display()))?;
    let dir = file
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let watched = file.clone();
    let mut debouncer = new_debouncer(WATCH_DEBOUNCE, move |res: DebounceEventResult| {
        let events = match res {
            Ok(events) => events,
            Err(e) => {
                log::warn!("file watch error: {e:?}");
                return;
            }
        };
        // Editors often save by renaming over the file, so the directory is
        // watched and events for other files are skipped. Unchanged text is
        // dropped by the controller, so every read is forwarded.
        if !events.iter().any(|e| e.path.file_name() == watched.file_name()) {
            return;
        }
        match std::fs::read_to_string(&watched) {
            Ok(text) => {
                log::debug!("{} changed", watched.display());
                let _ = tx.send(Event::TextInput(text));
            }
            Err(e) => log::warn!("failed to re-read {}: {e}", watched.display()),
        }
    })
    .context("Failed to start file watcher")?;

    debouncer
        .watcher()
        .watch(&dir, RecursiveMode::NonRecursive)
        .with_context(|| format!("Failed to watch {}", dir.display()))?;
    Ok(debouncer)
}

fn spawn_key_reader(tx: UnboundedSender<Event>) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let Some(event) = parse_key_command(&line) else {
                eprintln!("{}", KEY_HELP.yellow());
                continue;
            };
            let quit = matches!(event, Event::Unmount);
            if tx.send(event).is_err() || quit {
                break;
            }
        }
    });
}

fn parse_key_command(line: &str) -> Option<Event> {
    let event = match line.trim() {
        "" | "n" => Event::Key(KeyInput::new(Key::ArrowRight)),
        "p" => Event::Key(KeyInput::new(Key::ArrowLeft)),
        "s" => Event::Key(KeyInput::new(Key::Char('s')).with_ctrl()),
        "e" => Event::Action(ActionId::ExportPdf),
        "q" => Event::Unmount,
        _ => return None,
    };
    Some(event)
}

/// Writes the current stage to an HTML file on every reconcile.
struct HtmlFileSurface {
    out: PathBuf,
    title: String,
    /// Slides still to advance once the first deck is shown.
    start_steps: usize,
    events: UnboundedSender<Event>,
    quiet: bool,
    last_page: String,
}

impl HtmlFileSurface {
    fn new(
        out: PathBuf,
        title: String,
        start_slide: usize,
        events: UnboundedSender<Event>,
        quiet: bool,
    ) -> Self {
        Self {
            out,
            title,
            start_steps: start_slide.saturating_sub(1),
            events,
            quiet,
            last_page: String::new(),
        }
    }

    fn print_path(&self) -> PathBuf {
        self.out.with_extension("print.html")
    }
}

impl Surface for HtmlFileSurface {
    fn present(&mut self, view: &ViewModel) {
        let page = render_page(view, &self.title);
        if page != self.last_page {
            match std::fs::write(&self.out, &page) {
                Ok(()) => self.last_page = page,
                Err(e) => log::error!("failed to write {}: {e}", self.out.display()),
            }
        }

        if self.start_steps > 0 && matches!(view.stage, Stage::Deck { .. }) {
            for _ in 0..std::mem::take(&mut self.start_steps) {
                let _ = self.events.send(Event::Next);
            }
        }
    }

    fn sync_editor(&mut self, markdown: &str) {
        // The file on disk is the editor; it is never written back.
        log::trace!("editor holds {} byte(s)", markdown.len());
    }

    fn focus_stage(&mut self) {}

    fn toast(&mut self, level: ToastLevel, message: &str) {
        match level {
            ToastLevel::Error => eprintln!("{}", message.red()),
            ToastLevel::Success if !self.quiet => println!("{}", message.green()),
            ToastLevel::Info if !self.quiet => println!("{message}"),
            _ => {}
        }
    }

    fn print_document(&mut self, html: &str) -> Result<(), ExportError> {
        let path = self.print_path();
        std::fs::write(&path, html)?;
        if !self.quiet {
            println!(
                "{}",
                format!("Print-ready deck written to {}", path.display()).green()
            );
        }
        Ok(())
    }

    fn attach_listeners(&mut self) {
        log::debug!("listening for key commands");
    }

    fn detach_listeners(&mut self) {
        log::debug!("stopped listening for key commands");
    }
}

fn render_page(view: &ViewModel, title: &str) -> String {
    let (css, stage_class, body) = match &view.stage {
        Stage::Deck { html, css, .. } => (css.as_str(), "stage-deck".to_string(), html.clone()),
        Stage::Message { text, kind } => (
            "",
            format!("stage-message stage-{}", kind.as_str()),
            format!("<p>{}</p>", escape_html(text)),
        ),
    };

    let mut page = String::new();
    let _ = write!(
        page,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta http-equiv=\"refresh\" content=\"1\">\n<title>{}</title>\n\
         <style>\n{css}\n{PREVIEW_STYLES}\n</style>\n</head>\n<body>\n",
        escape_html(title)
    );
    let _ = write!(
        page,
        "<header class=\"deckpane-bar\">\
         <span class=\"status\">{}</span>\
         <button{}>&#8249;</button>\
         <span class=\"pagination\">{}</span>\
         <button{}>&#8250;</button>\
         <button title=\"{}\"{}>{}</button>\
         </header>\n",
        escape_html(view.status.as_deref().unwrap_or("")),
        disabled_attr(view.prev_disabled),
        escape_html(&view.pagination_label),
        disabled_attr(view.next_disabled),
        view.fullscreen.title(),
        disabled_attr(view.fullscreen.disabled),
        view.fullscreen.label(),
    );
    let _ = write!(
        page,
        "<main class=\"stage {stage_class}\">{body}</main>\n</body>\n</html>\n"
    );
    page
}

fn disabled_attr(disabled: bool) -> &'static str {
    if disabled { " disabled" } else { "" }
}

/// Prints the header's status changes as terminal lines.
struct TerminalHeader {
    quiet: bool,
    status: Option<String>,
}

impl TerminalHeader {
    fn new(quiet: bool) -> Self {
        Self {
            quiet,
            status: None,
        }
    }
}

impl HeaderBridge for TerminalHeader {
    fn set_title(&mut self, title: Option<&str>) -> Result<(), BridgeError> {
        if let (Some(title), false) = (title, self.quiet) {
            println!("{}", title.bold());
        }
        Ok(())
    }

    fn set_status(&mut self, status: Option<&str>) -> Result<(), BridgeError> {
        if self.status.as_deref() == status {
            return Ok(());
        }
        let previous = std::mem::replace(&mut self.status, status.map(str::to_string));
        if self.quiet {
            return Ok(());
        }
        match status {
            Some(text) => println!("{}", text.dimmed()),
            None if previous.as_deref() == Some(SAVING_STATUS) => {
                println!("{}", "Saved".green());
            }
            None => {}
        }
        Ok(())
    }

    fn set_badge(&mut self, _badge: Option<&str>) -> Result<(), BridgeError> {
        Ok(())
    }

    fn set_actions(&mut self, actions: &[HeaderAction]) -> Result<(), BridgeError> {
        log::trace!("{} header action(s)", actions.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckpane::reconcile::{FullscreenButton, StageKind};

    fn view(stage: Stage) -> ViewModel {
        ViewModel {
            status: Some("Unsaved <changes>".to_string()),
            pagination_label: "2 / 3".to_string(),
            prev_disabled: false,
            next_disabled: true,
            fullscreen: FullscreenButton {
                active: false,
                disabled: false,
            },
            export_disabled: false,
            editor_disabled: false,
            toolbar_disabled: false,
            actions: Vec::new(),
            stage,
        }
    }

    #[test]
    fn test_page_shows_deck_and_controls() {
        let page = render_page(
            &view(Stage::Deck {
                html: "<div class=\"marpit\"><svg class=\"is-active\"></svg></div>".to_string(),
                css: "section { color: red; }".to_string(),
                active: 1,
            }),
            "talk",
        );
        assert!(page.contains("<title>talk</title>"));
        assert!(page.contains("section { color: red; }"));
        assert!(page.contains("Unsaved &lt;changes&gt;"));
        assert!(page.contains("<span class=\"pagination\">2 / 3</span>"));
        assert!(page.contains("<button disabled>&#8250;</button>"));
        assert!(page.contains("<svg class=\"is-active\">"));
    }

    #[test]
    fn test_page_escapes_messages() {
        let page = render_page(
            &view(Stage::Message {
                text: "bad <yaml>".to_string(),
                kind: StageKind::Error,
            }),
            "talk",
        );
        assert!(page.contains("stage-message stage-error"));
        assert!(page.contains("<p>bad &lt;yaml&gt;</p>"));
    }

    #[test]
    fn test_key_commands() {
        assert!(matches!(parse_key_command(""), Some(Event::Key(_))));
        assert!(matches!(parse_key_command("q"), Some(Event::Unmount)));
        assert!(matches!(
            parse_key_command("e"),
            Some(Event::Action(ActionId::ExportPdf))
        ));
        let Some(Event::Key(save)) = parse_key_command(" s ") else {
            panic!("expected a key event");
        };
        assert!(save.is_save_shortcut());
        assert!(parse_key_command("x").is_none());
    }

    #[test]
    fn test_start_slide_advances_after_first_deck() {
        let dir = tempfile::TempDir::new().unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut surface =
            HtmlFileSurface::new(dir.path().join("deck.preview.html"), "deck".into(), 3, tx, true);

        surface.present(&view(Stage::Message {
            text: "Loading…".to_string(),
            kind: StageKind::Loading,
        }));
        assert!(rx.try_recv().is_err());

        let deck = view(Stage::Deck {
            html: "<svg></svg>".to_string(),
            css: String::new(),
            active: 0,
        });
        surface.present(&deck);
        surface.present(&deck);
        assert!(matches!(rx.try_recv(), Ok(Event::Next)));
        assert!(matches!(rx.try_recv(), Ok(Event::Next)));
        assert!(rx.try_recv().is_err());
        assert!(dir.path().join("deck.preview.html").exists());
    }
}
