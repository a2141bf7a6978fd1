//! Controller model - the complete state of one mention editor
//!
//! This module contains all the state types following the Elm Architecture pattern.

pub mod buffer;
pub mod menu;

pub use buffer::{byte_to_char, char_to_byte, TextBuffer};
pub use menu::MenuState;

use serde::Serialize;

use crate::config::MentionConfig;
use crate::cursor::{analyze, focused_lines, FocusedLines, FocusedToken};
use crate::hover::HoverResolver;
use crate::overlay::AnchorRect;
use crate::query::QueryDispatcher;
use crate::trigger::{TriggerMatch, TriggerResolver};

/// Where keyboard input goes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Focus {
    /// The text input
    #[default]
    Input,
    /// The suggestion list; `MenuState::focused_index` says which item
    Menu,
}

/// Controller phase, derived from the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No trigger active (or the active one was dismissed)
    Idle,
    /// Trigger matched, query empty or waiting out the debounce
    Composing,
    /// Query dispatched, waiting for results
    Searching,
    /// Results or a status message are on screen
    MenuOpen,
}

/// A mention the user closed the menu on. It stays closed until the
/// mention text or its position changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DismissedMention {
    pub start: usize,
    pub trigger: char,
    pub query: String,
}

impl DismissedMention {
    pub fn matches(&self, mention: &TriggerMatch) -> bool {
        self.start == mention.start && self.trigger == mention.trigger && self.query == mention.query
    }
}

impl From<&TriggerMatch> for DismissedMention {
    fn from(mention: &TriggerMatch) -> Self {
        Self {
            start: mention.start,
            trigger: mention.trigger,
            query: mention.query.clone(),
        }
    }
}

/// The complete controller model
#[derive(Debug, Clone)]
pub struct EditorModel {
    pub config: MentionConfig,
    /// Current input value and selection
    pub buffer: TextBuffer,
    /// Non-whitespace run at the caret
    pub token: FocusedToken,
    /// Mention being composed, if the focused token is one
    pub mention: Option<TriggerMatch>,
    pub lines: FocusedLines,
    pub resolver: TriggerResolver,
    pub dispatcher: QueryDispatcher,
    pub menu: MenuState,
    pub hover: HoverResolver,
    /// Caret rectangle as last measured by the host
    pub caret_anchor: Option<AnchorRect>,
    pub focus: Focus,
    pub dismissed: Option<DismissedMention>,
}

impl EditorModel {
    pub fn new(config: MentionConfig) -> Self {
        let buffer = TextBuffer::default();
        let resolver = TriggerResolver::new(config.triggers.clone(), config.quoted_mentions);
        let dispatcher = QueryDispatcher::new(config.dispatch());
        Self {
            token: analyze(&buffer),
            lines: focused_lines(&buffer),
            mention: None,
            buffer,
            resolver,
            dispatcher,
            menu: MenuState::new(),
            hover: HoverResolver::new(),
            caret_anchor: None,
            focus: Focus::Input,
            dismissed: None,
            config,
        }
    }

    /// The current mention was dismissed with Escape or blur
    pub fn is_dismissed(&self) -> bool {
        match (&self.dismissed, &self.mention) {
            (Some(dismissed), Some(mention)) => dismissed.matches(mention),
            _ => false,
        }
    }

    /// Menu panel is shown: a live mention with results or a status
    pub fn menu_visible(&self) -> bool {
        self.mention.is_some() && !self.is_dismissed() && self.dispatcher.has_content()
    }

    pub fn phase(&self) -> Phase {
        if self.mention.is_none() || self.is_dismissed() {
            Phase::Idle
        } else if self.dispatcher.is_searching() {
            Phase::Searching
        } else if self.dispatcher.has_content() {
            Phase::MenuOpen
        } else {
            Phase::Composing
        }
    }
}

impl Default for EditorModel {
    fn default() -> Self {
        Self::new(MentionConfig::default())
    }
}
