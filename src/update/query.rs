//! Debounce and search completion handlers

use crate::commands::Cmd;
use crate::messages::QueryMsg;
use crate::model::EditorModel;

/// Handle query messages
pub fn update_query(model: &mut EditorModel, msg: QueryMsg) -> Option<Cmd> {
    match msg {
        QueryMsg::DebounceElapsed { timer } => {
            if model.is_dismissed() {
                return None;
            }
            model.dispatcher.on_timer_fired(timer)
        }
        QueryMsg::SearchCompleted { token, outcome } => {
            model.dispatcher.on_search_completed(token, outcome)
        }
    }
}
