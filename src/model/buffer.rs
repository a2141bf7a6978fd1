//! Immutable text buffer snapshots.
//!
//! The host replaces the snapshot wholesale on every edit or caret move.
//! All offsets are character offsets, never byte offsets.

use serde::Serialize;
use std::ops::Range;

/// A snapshot of the input's text and selection.
///
/// Invariant: `selection_start <= selection_end <= len_chars()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextBuffer {
    text: String,
    selection_start: usize,
    selection_end: usize,
}

impl TextBuffer {
    /// Create a snapshot, clamping the selection into the valid range
    pub fn new(text: impl Into<String>, selection_start: usize, selection_end: usize) -> Self {
        let text = text.into();
        let len = text.chars().count();
        let selection_end = selection_end.min(len);
        let selection_start = selection_start.min(selection_end);
        Self {
            text,
            selection_start,
            selection_end,
        }
    }

    /// Create a snapshot with a collapsed selection at `caret`
    pub fn with_caret(text: impl Into<String>, caret: usize) -> Self {
        Self::new(text, caret, caret)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn selection_start(&self) -> usize {
        self.selection_start
    }

    pub fn selection_end(&self) -> usize {
        self.selection_end
    }

    /// The caret is the selection end, as reported by the input element
    pub fn caret(&self) -> usize {
        self.selection_end
    }

    pub fn is_collapsed(&self) -> bool {
        self.selection_start == self.selection_end
    }

    pub fn len_chars(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Character at a char offset, None if out of bounds
    pub fn char_at(&self, offset: usize) -> Option<char> {
        self.text.chars().nth(offset)
    }

    /// Slice by character range, clamped to the buffer
    pub fn slice(&self, range: Range<usize>) -> String {
        let len = self.len_chars();
        let start = range.start.min(len);
        let end = range.end.min(len).max(start);
        self.text.chars().skip(start).take(end - start).collect()
    }

    /// Replace `range` with `insert` and place a collapsed caret at `caret`
    pub fn splice(&self, range: Range<usize>, insert: &str, caret: usize) -> Self {
        let start_byte = char_to_byte(&self.text, range.start);
        let end_byte = char_to_byte(&self.text, range.end.max(range.start));
        let mut text = String::with_capacity(self.text.len() + insert.len());
        text.push_str(&self.text[..start_byte]);
        text.push_str(insert);
        text.push_str(&self.text[end_byte..]);
        Self::with_caret(text, caret)
    }
}

/// Convert a char offset to a byte offset (clamped to the end of `text`)
pub fn char_to_byte(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// Convert a byte offset (on a char boundary) to a char offset
pub fn byte_to_char(text: &str, byte_offset: usize) -> usize {
    text[..byte_offset.min(text.len())].chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_selection() {
        let buf = TextBuffer::new("hello", 7, 9);
        assert_eq!(buf.selection_start(), 5);
        assert_eq!(buf.selection_end(), 5);

        let buf = TextBuffer::new("hello", 4, 2);
        assert_eq!(buf.selection_start(), 2);
        assert_eq!(buf.selection_end(), 2);
    }

    #[test]
    fn test_utf8_offsets_are_chars() {
        let buf = TextBuffer::with_caret("héllo", 2);
        assert_eq!(buf.len_chars(), 5);
        assert_eq!(buf.char_at(1), Some('é'));
        assert_eq!(buf.slice(0..2), "hé");
        assert_eq!(char_to_byte(buf.text(), 2), 3);
        assert_eq!(byte_to_char(buf.text(), 3), 2);
    }

    #[test]
    fn test_splice_replaces_range() {
        let buf = TextBuffer::with_caret("hi @fr world", 6);
        let next = buf.splice(3..6, "[Ann](/ann)", 14);
        assert_eq!(next.text(), "hi [Ann](/ann) world");
        assert_eq!(next.caret(), 14);
        assert!(next.is_collapsed());
    }
}
