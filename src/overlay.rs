//! Anchored overlay placement
//!
//! Computes where a floating panel (mention menu, hover preview) goes relative
//! to an anchor rectangle so it stays inside the viewport. Placement needs the
//! panel's measured size, which only exists after it has been rendered once,
//! so the positioner keeps its last placement and only recomputes when the
//! anchor or the panel's content changes.

use serde::{Deserialize, Serialize};

/// On-screen rectangle a panel is anchored to (caret or hovered link)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AnchorRect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl AnchorRect {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    /// Whole-pixel version used for change detection
    fn snapped(&self) -> (i64, i64, i64, i64) {
        (
            self.top.round() as i64,
            self.left.round() as i64,
            self.width.round() as i64,
            self.height.round() as i64,
        )
    }
}

/// Pixel offset between anchor and panel
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    pub x: f64,
    pub y: f64,
}

impl Offset {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Measured panel size, or viewport size
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Top-left corner of the panel
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct OverlayPlacement {
    pub top: f64,
    pub left: f64,
}

impl OverlayPlacement {
    /// Get the right edge X coordinate for a panel of `size`
    pub fn right(&self, size: Size) -> f64 {
        self.left + size.width
    }
}

/// Place a panel below the anchor, flipping above when it would overflow the
/// bottom and there is room above, and shifting left by exactly the right-edge
/// overflow.
pub fn compute_placement(
    anchor: AnchorRect,
    panel: Size,
    viewport: Size,
    offset: Offset,
) -> OverlayPlacement {
    let below = anchor.top + anchor.height + offset.y;
    let above = anchor.top - panel.height - offset.y;
    let top = if below + panel.height > viewport.height && above >= 0.0 {
        above
    } else {
        // Showing the top of an overflowing panel beats hiding it off the top
        below
    };

    let mut left = anchor.left + offset.x;
    let overflow = left + panel.width - viewport.width;
    if overflow > 0.0 {
        left -= overflow;
    }

    OverlayPlacement { top, left }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RepositionKey {
    anchor: (i64, i64, i64, i64),
    content: u64,
}

/// Stateful positioner with a reposition gate
#[derive(Debug, Clone, Default)]
pub struct OverlayPositioner {
    last_placement: OverlayPlacement,
    last_key: Option<RepositionKey>,
}

impl OverlayPositioner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn placement(&self) -> OverlayPlacement {
        self.last_placement
    }

    /// True when the anchor rectangle (to the pixel) or the content identity
    /// differs from the last computed placement
    pub fn should_reposition(&self, anchor: AnchorRect, content: u64) -> bool {
        self.last_key
            != Some(RepositionKey {
                anchor: anchor.snapped(),
                content,
            })
    }

    /// Recompute the placement when `should_reposition` is set, otherwise
    /// return the previous one untouched
    pub fn place(
        &mut self,
        anchor: AnchorRect,
        panel: Size,
        viewport: Size,
        offset: Offset,
        should_reposition: bool,
    ) -> OverlayPlacement {
        if should_reposition {
            self.last_placement = compute_placement(anchor, panel, viewport, offset);
        }
        self.last_placement
    }

    /// Gate and place in one step, remembering the key that was used
    pub fn reposition(
        &mut self,
        anchor: AnchorRect,
        content: u64,
        panel: Size,
        viewport: Size,
        offset: Offset,
    ) -> OverlayPlacement {
        let gate = self.should_reposition(anchor, content);
        if gate {
            tracing::trace!(content, "repositioning overlay");
            self.last_key = Some(RepositionKey {
                anchor: anchor.snapped(),
                content,
            });
        }
        self.place(anchor, panel, viewport, offset, gate)
    }

    /// Forget the last key so the next measurement repositions
    pub fn invalidate(&mut self) {
        self.last_key = None;
    }
}
