//! Live slide-deck preview for Markdown documents.
//!
//! [`controller::PreviewController`] is the core: a synchronous state machine
//! that keeps a rendered deck, its slide cursor and the derived UI in step
//! with the text. Hosts plug in through the traits in [`host`] and
//! [`fullscreen`]; [`runtime::run`] drives a controller on tokio.

pub mod api;
pub mod backend;
pub mod config;
pub mod constants;
pub mod controller;
pub mod embed;
pub mod engine;
pub mod error;
pub mod export;
pub mod fullscreen;
pub mod host;
pub mod input;
pub mod reconcile;
pub mod runtime;
pub mod scheduler;
pub mod slides;
pub mod state;
pub mod store;
pub mod toolbar;
