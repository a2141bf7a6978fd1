//! Focused-token analysis
//!
//! Derives "the thing being typed" from a buffer snapshot. The focused token
//! is the whitespace-delimited run the caret sits in, e.g. with `hello wo|rld`
//! the focused token is `world`. Pure functions, no state.

use serde::Serialize;

use crate::model::TextBuffer;

/// The maximal non-whitespace run containing the caret
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FocusedToken {
    pub text: String,
    /// Char offset of the first character of the token
    pub start: usize,
    /// Char offset one past the last character of the token
    pub end: usize,
}

impl FocusedToken {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Compute the focused token at the caret (`selection_end`).
///
/// The run before the caret and the run after it are joined, so a caret
/// that splits a word still yields the whole word. A caret in whitespace
/// yields an empty token at the caret offset.
pub fn analyze(buffer: &TextBuffer) -> FocusedToken {
    let chars: Vec<char> = buffer.text().chars().collect();
    let caret = buffer.caret().min(chars.len());

    let start = chars[..caret]
        .iter()
        .rposition(|c| c.is_whitespace())
        .map_or(0, |i| i + 1);
    let end = chars[caret..]
        .iter()
        .position(|c| c.is_whitespace())
        .map_or(chars.len(), |i| caret + i);

    FocusedToken {
        text: chars[start..end].iter().collect(),
        start,
        end,
    }
}

/// Lines partitioned around the selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FocusedLines {
    pub before: Vec<String>,
    pub focused: Vec<String>,
    pub after: Vec<String>,
    /// Index of the first focused line
    pub first_focused: usize,
}

/// Split the buffer into newline-delimited lines and partition them into
/// the lines before, intersecting, and after `[selection_start, selection_end]`.
///
/// A collapsed selection focuses exactly one line; a selection crossing N
/// newlines focuses N + 1 lines.
pub fn focused_lines(buffer: &TextBuffer) -> FocusedLines {
    let text = buffer.text();
    let first = line_index(text, buffer.selection_start());
    let last = line_index(text, buffer.selection_end());

    let mut lines = FocusedLines {
        first_focused: first,
        ..Default::default()
    };
    for (i, line) in text.split('\n').enumerate() {
        let bucket = if i < first {
            &mut lines.before
        } else if i <= last {
            &mut lines.focused
        } else {
            &mut lines.after
        };
        bucket.push(line.to_string());
    }
    lines
}

/// Zero-based line number containing a char offset
pub fn line_index(text: &str, offset: usize) -> usize {
    text.chars().take(offset).filter(|&c| c == '\n').count()
}
