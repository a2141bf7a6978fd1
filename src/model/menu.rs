//! Suggestion menu state: keyboard focus and panel placement

use crate::overlay::OverlayPositioner;

/// Focus state of the suggestion menu
#[derive(Debug, Clone, Default)]
pub struct MenuState {
    /// Item that keyboard focus lands on (or sits on) inside the list
    pub focused_index: usize,
    /// Placement of the panel relative to the caret
    pub positioner: OverlayPositioner,
    /// Result generation the focus index belongs to
    seen_generation: u64,
}

impl MenuState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset focus to the first item when the result set changed.
    /// Returns true if a reset happened.
    pub fn sync(&mut self, generation: u64) -> bool {
        if self.seen_generation == generation {
            return false;
        }
        self.seen_generation = generation;
        self.focused_index = 0;
        true
    }

    /// Move keyboard focus by `delta`, wrapping at both ends
    pub fn move_focus(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.focused_index = 0;
            return;
        }
        let len = len as isize;
        let current = (self.focused_index as isize).min(len - 1);
        self.focused_index = (current + delta).rem_euclid(len) as usize;
    }

    /// Forget focus and placement; the next open starts fresh
    pub fn reset(&mut self) {
        self.focused_index = 0;
        self.positioner.invalidate();
    }
}
