//! Mention editor configuration persistence
//!
//! Stores user preferences in `~/.config/mention-editor/config.yaml`.
//! Every field has a serde default, so partial files are fine.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::entity::InsertionStyle;
use crate::overlay::Offset;
use crate::query::DispatchConfig;
use crate::trigger::TriggerTable;

/// Configuration that persists across sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentionConfig {
    /// Quiet period before a query is sent (milliseconds)
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Maximum number of menu entries
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Gap between the caret and the suggestion menu
    #[serde(default = "default_offset")]
    pub menu_offset: Offset,
    /// Gap between a hovered link and its preview
    #[serde(default = "default_offset")]
    pub tooltip_offset: Offset,
    #[serde(default)]
    pub triggers: TriggerTable,
    /// What a selected entity is inserted as
    #[serde(default)]
    pub insertion: InsertionStyle,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Recognise `@"multi word"` mentions
    #[serde(default = "default_quoted_mentions")]
    pub quoted_mentions: bool,
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_max_results() -> usize {
    6
}

fn default_offset() -> Offset {
    Offset::new(0.0, 3.0)
}

fn default_api_base() -> String {
    "https://api.are.na/v2".to_string()
}

fn default_request_timeout_ms() -> u64 {
    5000
}

fn default_quoted_mentions() -> bool {
    true
}

impl Default for MentionConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            max_results: default_max_results(),
            menu_offset: default_offset(),
            tooltip_offset: default_offset(),
            triggers: TriggerTable::default(),
            insertion: InsertionStyle::default(),
            api_base: default_api_base(),
            request_timeout_ms: default_request_timeout_ms(),
            quoted_mentions: default_quoted_mentions(),
        }
    }
}

impl MentionConfig {
    /// Load config from the user config directory, or return defaults
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load config from `path`, falling back to defaults on any failure
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to `path`
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Save config to the user config directory
    pub fn save(&self) -> Result<(), String> {
        let path = crate::config_paths::config_file()
            .ok_or_else(|| "No config directory available".to_string())?;
        self.save_to(&path)
    }

    pub fn dispatch(&self) -> DispatchConfig {
        DispatchConfig {
            delay_ms: self.debounce_ms,
            max_results: self.max_results,
            insertion: self.insertion,
            triggers: self.triggers.clone(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
