//! Render snapshots handed to the host
//!
//! The host owns drawing. After every state change that needs a redraw the
//! runtime builds a `RenderSnapshot` from the model and passes it to the
//! host's `RenderSurface`.

use serde::Serialize;

use crate::cursor::FocusedLines;
use crate::entity::Entity;
use crate::model::{EditorModel, Focus, Phase};
use crate::overlay::{AnchorRect, OverlayPlacement};

/// Suggestion menu as the host should draw it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuView {
    pub open: bool,
    pub status: Option<String>,
    pub items: Vec<Entity>,
    pub focused_index: usize,
    pub placement: OverlayPlacement,
}

/// Hover preview as the host should draw it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipView {
    pub visible: bool,
    pub loading: bool,
    pub entity: Option<Entity>,
    pub anchor: Option<AnchorRect>,
    pub placement: OverlayPlacement,
}

/// Everything the host needs to render one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSnapshot {
    pub value: String,
    pub selection_start: usize,
    pub selection_end: usize,
    pub focused_lines: FocusedLines,
    pub phase: Phase,
    pub focus: Focus,
    pub caret_anchor: Option<AnchorRect>,
    pub menu: MenuView,
    pub tooltip: TooltipView,
}

/// Receives snapshots. Any `FnMut(&RenderSnapshot)` closure is a surface.
pub trait RenderSurface: Send {
    fn render(&mut self, snapshot: &RenderSnapshot);
}

impl<F> RenderSurface for F
where
    F: FnMut(&RenderSnapshot) + Send,
{
    fn render(&mut self, snapshot: &RenderSnapshot) {
        self(snapshot)
    }
}

impl EditorModel {
    pub fn snapshot(&self) -> RenderSnapshot {
        let open = self.menu_visible();
        RenderSnapshot {
            value: self.buffer.text().to_string(),
            selection_start: self.buffer.selection_start(),
            selection_end: self.buffer.selection_end(),
            focused_lines: self.lines.clone(),
            phase: self.phase(),
            focus: self.focus,
            caret_anchor: self.caret_anchor,
            menu: MenuView {
                open,
                status: open
                    .then(|| self.dispatcher.status().map(str::to_string))
                    .flatten(),
                items: if open {
                    self.dispatcher.results().to_vec()
                } else {
                    Vec::new()
                },
                focused_index: self.menu.focused_index,
                placement: self.menu.positioner.placement(),
            },
            tooltip: TooltipView {
                visible: self.hover.is_visible(),
                loading: self.hover.is_loading(),
                entity: self.hover.entity().cloned(),
                anchor: self.hover.anchor(),
                placement: self.hover.placement(),
            },
        }
    }
}
