/// Namespace under which this plugin stores its key-value records.
pub const PLUGIN_ID: &str = "marp";

/// Key of the persisted `{ markdown, updatedAt }` blob.
pub const STATE_KEY: &str = "marpState";

/// Key of the per-document metadata record (`{ isMarp: true }`).
pub const META_KEY: &str = "meta";

/// Declared document type handled by this plugin.
pub const SLIDE_DOC_TYPE: &str = "marp-slide";

pub const DEFAULT_TITLE: &str = "Marp Slides";

pub const ROUTE_PREFIX: &str = "/marp";

pub const DEFAULT_MARKDOWN: &str = "---
marp: true
theme: default
paginate: true
class: lead
---

# Welcome to Marp

- Edit Markdown in the left pane
- Use front-matter directives to configure slides
- Export HTML through the top bar
";

/// Markdown the backend writes into a deck created through `marp.create`.
pub const CREATED_DECK_MARKDOWN: &str = "---
marp: true
theme: default
paginate: true
class: lead
---

# Welcome to Marp

Use the left pane to edit Markdown.
";

pub const LOADING_DECK_STATUS: &str = "Loading Marp deck…";
pub const LOADING_STATUS: &str = "Loading…";
pub const UNSAVED_STATUS: &str = "Unsaved changes";
pub const SAVING_STATUS: &str = "Saving…";
pub const SAVE_FAILED_STATUS: &str = "Failed to save";
pub const SAVE_FAILED_TOAST: &str = "Failed to save Marp deck";
pub const LOAD_FAILED_STATUS: &str = "Failed to load Marp deck";
pub const LOAD_FAILED_STAGE: &str = "Failed to load data. Try reloading.";
pub const NO_DOCUMENT_STAGE: &str = "No document selected";
pub const NOTHING_TO_PREVIEW: &str = "Nothing to preview yet.";
pub const NO_SLIDES_FOUND: &str = "No slides found";
