//! Message types for the Elm-style architecture
//!
//! All state changes flow through these message types.

use std::str::FromStr;

use crate::entity::RawEntity;
use crate::hover::HoverTarget;
use crate::overlay::{AnchorRect, Size};
use crate::provider::ProviderError;
use crate::query::{QueryToken, TimerId};

/// Keys the controller reacts to. Everything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Tab,
    Escape,
    Enter,
    Space,
    ArrowUp,
    ArrowDown,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub shift: bool,
}

impl KeyPress {
    pub fn new(key: Key) -> Self {
        Self { key, shift: false }
    }

    pub fn shifted(key: Key) -> Self {
        Self { key, shift: true }
    }
}

/// Parses names like `tab`, `shift+tab`, `arrow_down`, `esc`
impl FromStr for KeyPress {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let (shift, name) = match lower.strip_prefix("shift+") {
            Some(rest) => (true, rest),
            None => (false, lower.as_str()),
        };
        let key = match name {
            "tab" => Key::Tab,
            "escape" | "esc" => Key::Escape,
            "enter" | "return" => Key::Enter,
            "space" => Key::Space,
            "up" | "arrow_up" | "arrowup" => Key::ArrowUp,
            "down" | "arrow_down" | "arrowdown" => Key::ArrowDown,
            other if other.chars().count() == 1 => Key::Other,
            other => return Err(format!("unknown key '{}'", other)),
        };
        Ok(Self { key, shift })
    }
}

/// Text input messages
#[derive(Debug, Clone)]
pub enum EditorMsg {
    /// Value or selection of the input changed (typing, caret moves, paste)
    InputChanged {
        text: String,
        selection_start: usize,
        selection_end: usize,
    },
    /// Host measured the caret's pixel rectangle
    CaretMeasured(AnchorRect),
    /// Key pressed while the input or the menu has focus
    KeyPressed(KeyPress),
}

/// Debounce and search completion messages
#[derive(Debug, Clone)]
pub enum QueryMsg {
    /// Debounce timer fired
    DebounceElapsed { timer: TimerId },
    /// Search provider finished (possibly for a stale query)
    SearchCompleted {
        token: QueryToken,
        outcome: Result<Vec<RawEntity>, ProviderError>,
    },
}

/// Suggestion menu messages
#[derive(Debug, Clone)]
pub enum MenuMsg {
    /// Host rendered the panel and measured it
    PanelMeasured { panel: Size, viewport: Size },
    /// An item was clicked
    ItemClicked(usize),
    /// Focus left both the menu and the input
    Blurred,
}

/// Hover preview messages
#[derive(Debug, Clone)]
pub enum HoverMsg {
    /// Pointer moved over a link (`Some`) or off every link (`None`)
    PointerMoved(Option<HoverTarget>),
    /// Lookup provider finished
    LookupCompleted {
        token: QueryToken,
        outcome: Result<Option<RawEntity>, ProviderError>,
    },
    /// Host rendered the tooltip and measured it
    TooltipMeasured { panel: Size, viewport: Size },
    /// Pointer left the preview area
    Blurred,
}

/// Top-level message type
#[derive(Debug, Clone)]
pub enum Msg {
    Editor(EditorMsg),
    Query(QueryMsg),
    Menu(MenuMsg),
    Hover(HoverMsg),
}

impl Msg {
    /// Shorthand for an input change with a collapsed caret
    pub fn input(text: impl Into<String>, caret: usize) -> Self {
        Msg::Editor(EditorMsg::InputChanged {
            text: text.into(),
            selection_start: caret,
            selection_end: caret,
        })
    }

    pub fn key(key: KeyPress) -> Self {
        Msg::Editor(EditorMsg::KeyPressed(key))
    }
}
