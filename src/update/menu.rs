//! Suggestion menu message handlers

use crate::commands::Cmd;
use crate::messages::MenuMsg;
use crate::model::{DismissedMention, EditorModel, Focus};

use super::editor::select_entity;

/// Handle suggestion menu messages
pub fn update_menu(model: &mut EditorModel, msg: MenuMsg) -> Option<Cmd> {
    match msg {
        MenuMsg::PanelMeasured { panel, viewport } => {
            if !model.menu_visible() {
                return None;
            }
            let anchor = model.caret_anchor?;
            let before = model.menu.positioner.placement();
            let after = model.menu.positioner.reposition(
                anchor,
                model.dispatcher.generation(),
                panel,
                viewport,
                model.config.menu_offset,
            );
            (after != before).then_some(Cmd::Redraw)
        }

        MenuMsg::ItemClicked(index) => select_entity(model, index),

        MenuMsg::Blurred => {
            if model.menu_visible() {
                dismiss(model)
            } else {
                model.focus = Focus::Input;
                None
            }
        }
    }
}

/// Close the menu without touching the buffer. The mention stays closed
/// until its text or position changes.
pub fn dismiss(model: &mut EditorModel) -> Option<Cmd> {
    let mention = model.mention.as_ref()?;
    tracing::debug!("Dismissed menu for {:?}", mention.query);
    model.dismissed = Some(DismissedMention::from(mention));
    model.focus = Focus::Input;
    model.menu.reset();
    let clear = model.dispatcher.clear();
    Cmd::combine([clear, Some(Cmd::Redraw)])
}
