//! Command types for the Elm-style architecture
//!
//! Commands represent side effects that should be performed after an update.
//! The runtime executes them; update functions only describe them.

use crate::query::{QueryToken, TimerId};
use crate::trigger::Category;

/// Commands returned by update functions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Cmd {
    /// No command - do nothing
    #[default]
    None,
    /// Emit a fresh render snapshot to the host
    Redraw,
    /// Execute multiple commands
    Batch(Vec<Cmd>),

    // === Mention search ===
    /// Start (or restart) the debounce timer.
    /// After delay_ms, sends Msg::Query(DebounceElapsed { timer })
    ScheduleSearch { timer: TimerId, delay_ms: u64 },
    /// Clear the pending debounce timer, if any
    CancelSearchTimer,
    /// Call the search provider on a worker.
    /// Sends Msg::Query(SearchCompleted) when done
    RunSearch {
        token: QueryToken,
        category: Category,
        query: String,
    },

    // === Hover previews ===
    /// Call the lookup provider on a worker.
    /// Sends Msg::Hover(LookupCompleted) when done
    RunLookup { token: QueryToken, path: String },
}

impl Cmd {
    /// Create a batch of commands
    pub fn batch(cmds: Vec<Cmd>) -> Self {
        Cmd::Batch(cmds)
    }

    /// Combine optional commands, dropping the empty ones
    pub fn combine(cmds: impl IntoIterator<Item = Option<Cmd>>) -> Option<Cmd> {
        let mut cmds: Vec<Cmd> = cmds
            .into_iter()
            .flatten()
            .filter(|c| *c != Cmd::None)
            .collect();
        match cmds.len() {
            0 => None,
            1 => cmds.pop(),
            _ => Some(Cmd::Batch(cmds)),
        }
    }

    /// Check if this command requires a redraw
    pub fn needs_redraw(&self) -> bool {
        match self {
            Cmd::None => false,
            Cmd::Redraw => true,
            Cmd::Batch(cmds) => cmds.iter().any(|c| c.needs_redraw()),
            // Timers and provider calls report back through messages
            Cmd::ScheduleSearch { .. } => false,
            Cmd::CancelSearchTimer => false,
            Cmd::RunSearch { .. } => false,
            Cmd::RunLookup { .. } => false,
        }
    }

    /// Iterate over this command and, for batches, every nested command
    pub fn flatten(&self) -> Vec<&Cmd> {
        match self {
            Cmd::Batch(cmds) => cmds.iter().flat_map(|c| c.flatten()).collect(),
            other => vec![other],
        }
    }
}
