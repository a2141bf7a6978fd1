//! Tracing infrastructure for development diagnostics
//!
//! Provides structured logging with scoped filtering for debugging
//! debounce, stale-result and overlay placement issues.
//!
//! # Usage
//!
//! Configure via RUST_LOG environment variable:
//! - `RUST_LOG=debug` - all debug logs
//! - `RUST_LOG=controller=debug` - phase transitions only
//! - `RUST_LOG=mention_editor::query=debug` - module-level filtering
//!
//! # Log Files
//!
//! Logs are written to `~/.config/mention-editor/logs/mentions.log` with daily rotation.
//! File logging uses debug level by default for more verbose troubleshooting.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::model::{EditorModel, Focus, Phase};

/// Initialize tracing subscriber with console and file logging
///
/// Console output goes to stderr so JSON on stdout stays clean, and
/// respects RUST_LOG (default `warn`).
pub fn init() {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // Console layer - respects RUST_LOG
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_filter(console_filter);

    // File layer - always debug level for troubleshooting
    let file_layer = match crate::config_paths::ensure_logs_dir() {
        Ok(logs_dir) => {
            let file_appender =
                tracing_appender::rolling::daily(logs_dir, crate::config_paths::LOG_FILE_PREFIX);
            Some(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new("debug")),
            )
        }
        Err(e) => {
            eprintln!("Warning: Could not initialize file logging: {}", e);
            None
        }
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}

/// Lightweight snapshot of controller state for diffing
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerSnapshot {
    pub phase: Phase,
    pub focus: Focus,
    pub query: Option<String>,
    pub results: usize,
    pub caret: usize,
}

impl ControllerSnapshot {
    pub fn from_model(model: &EditorModel) -> Self {
        Self {
            phase: model.phase(),
            focus: model.focus,
            query: model.dispatcher.current_query().map(str::to_string),
            results: model.dispatcher.results().len(),
            caret: model.buffer.caret(),
        }
    }

    /// Generate a diff description between two snapshots
    pub fn diff(&self, other: &ControllerSnapshot) -> Option<String> {
        let mut changes = Vec::new();
        if self.phase != other.phase {
            changes.push(format!("phase: {:?} → {:?}", self.phase, other.phase));
        }
        if self.focus != other.focus {
            changes.push(format!("focus: {:?} → {:?}", self.focus, other.focus));
        }
        if self.query != other.query {
            changes.push(format!("query: {:?} → {:?}", self.query, other.query));
        }
        if self.results != other.results {
            changes.push(format!("results: {} → {}", self.results, other.results));
        }
        if self.caret != other.caret {
            changes.push(format!("caret: {} → {}", self.caret, other.caret));
        }

        if changes.is_empty() {
            None
        } else {
            Some(changes.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MentionConfig;

    #[test]
    fn test_diff_reports_changed_fields_only() {
        let model = EditorModel::new(MentionConfig::default());
        let before = ControllerSnapshot::from_model(&model);
        let mut after = before.clone();
        assert_eq!(before.diff(&after), None);

        after.phase = Phase::Composing;
        after.query = Some("fr".into());
        let diff = before.diff(&after).unwrap();
        assert!(diff.contains("phase: Idle → Composing"));
        assert!(diff.contains("query"));
        assert!(!diff.contains("caret"));
    }
}
