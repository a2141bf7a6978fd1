//! Update functions for the Elm-style architecture
//!
//! All state transformations flow through these functions.

mod editor;
mod hover;
mod menu;
mod query;

use crate::commands::Cmd;
use crate::messages::{HoverMsg, MenuMsg, Msg};
use crate::model::EditorModel;

#[cfg(debug_assertions)]
use crate::tracing::ControllerSnapshot;
#[cfg(debug_assertions)]
use tracing::{debug, span, Level};

pub use editor::{intercepts_key, refresh, select_entity, update_editor};
pub use hover::update_hover;
pub use menu::{dismiss, update_menu};
pub use query::update_query;

/// Main update function - dispatches to sub-handlers
///
/// In debug builds, this wraps with tracing instrumentation.
/// In release builds, it's a direct dispatch with zero overhead.
#[inline]
pub fn update(model: &mut EditorModel, msg: Msg) -> Option<Cmd> {
    #[cfg(debug_assertions)]
    {
        update_traced(model, msg)
    }
    #[cfg(not(debug_assertions))]
    {
        update_inner(model, msg)
    }
}

/// Inner update logic (no tracing)
fn update_inner(model: &mut EditorModel, msg: Msg) -> Option<Cmd> {
    let result = match msg {
        Msg::Editor(m) => editor::update_editor(model, m),
        Msg::Query(m) => query::update_query(model, m),
        Msg::Menu(m) => menu::update_menu(model, m),
        Msg::Hover(m) => hover::update_hover(model, m),
    };

    // New result set: keyboard focus starts over at the first item
    model.menu.sync(model.dispatcher.generation());

    result
}

#[cfg(debug_assertions)]
fn update_traced(model: &mut EditorModel, msg: Msg) -> Option<Cmd> {
    // Skip logging for noisy pointer and measurement messages
    let is_noisy = matches!(
        &msg,
        Msg::Hover(HoverMsg::PointerMoved(_) | HoverMsg::TooltipMeasured { .. })
            | Msg::Menu(MenuMsg::PanelMeasured { .. })
    );

    let msg_name = msg_type_name(&msg);
    let _span = if is_noisy {
        None
    } else {
        Some(span!(Level::DEBUG, "update", msg = %msg_name).entered())
    };

    let before = ControllerSnapshot::from_model(model);

    if !is_noisy {
        debug!(target: "message", msg = %msg_name, "processing");
    }

    let result = update_inner(model, msg);

    let after = ControllerSnapshot::from_model(model);
    if let Some(diff) = before.diff(&after) {
        debug!(target: "controller", %diff, "state changed");
    }

    result
}

/// Get a display name for a message type
///
/// Example outputs:
/// - `Editor::KeyPressed(KeyPress { key: Tab, shift: false })`
/// - `Query::DebounceElapsed { timer: TimerId(3) }`
#[cfg(debug_assertions)]
fn msg_type_name(msg: &Msg) -> String {
    match msg {
        Msg::Editor(m) => format!("Editor::{:?}", m),
        // Payloads can be large; the variant is enough
        Msg::Query(crate::messages::QueryMsg::SearchCompleted { token, outcome }) => format!(
            "Query::SearchCompleted(token {}, {})",
            token.0,
            match outcome {
                Ok(results) => format!("{} results", results.len()),
                Err(e) => e.to_string(),
            }
        ),
        Msg::Query(m) => format!("Query::{:?}", m),
        Msg::Menu(m) => format!("Menu::{:?}", m),
        Msg::Hover(HoverMsg::LookupCompleted { token, .. }) => {
            format!("Hover::LookupCompleted(token {})", token.0)
        }
        Msg::Hover(m) => format!("Hover::{:?}", m),
    }
}
