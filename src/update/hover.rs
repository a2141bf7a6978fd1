//! Hover preview message handlers

use crate::commands::Cmd;
use crate::messages::HoverMsg;
use crate::model::EditorModel;

/// Handle hover preview messages
pub fn update_hover(model: &mut EditorModel, msg: HoverMsg) -> Option<Cmd> {
    match msg {
        HoverMsg::PointerMoved(target) => model.hover.on_pointer_moved(target),
        HoverMsg::LookupCompleted { token, outcome } => {
            model.hover.on_lookup_completed(token, outcome)
        }
        HoverMsg::TooltipMeasured { panel, viewport } => {
            let offset = model.config.tooltip_offset;
            model.hover.on_measured(panel, viewport, offset)
        }
        HoverMsg::Blurred => model.hover.hide(),
    }
}
