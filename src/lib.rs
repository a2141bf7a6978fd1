//! Mention editor core - Elm-style mention composition
//!
//! This crate derives the mention being typed from raw input state, runs
//! debounced, stale-safe entity searches, and places the suggestion menu and
//! hover previews against the caret. The host feeds it input events and
//! draws the snapshots it emits.

pub mod cli;
pub mod commands;
pub mod config;
pub mod config_paths;
pub mod cursor;
pub mod entity;
pub mod hover;
#[cfg(feature = "http")]
pub mod http;
pub mod markdown;
pub mod messages;
pub mod model;
pub mod overlay;
pub mod provider;
pub mod query;
pub mod replay;
pub mod runtime;
pub mod tracing;
pub mod trigger;
pub mod update;
pub mod view;

// Re-export commonly used types
pub use commands::Cmd;
pub use config::MentionConfig;
pub use entity::{Entity, RawEntity};
pub use messages::Msg;
pub use model::{EditorModel, TextBuffer};
pub use runtime::Runtime;
pub use trigger::{Category, TriggerTable};
pub use view::RenderSnapshot;
