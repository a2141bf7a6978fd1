//! Text input message handlers: analysis on every change, selection, keys

use crate::commands::Cmd;
use crate::cursor::{analyze, focused_lines};
use crate::messages::{EditorMsg, Key, KeyPress};
use crate::model::{EditorModel, Focus, TextBuffer};

use super::menu::dismiss;

/// Handle text input messages
pub fn update_editor(model: &mut EditorModel, msg: EditorMsg) -> Option<Cmd> {
    match msg {
        EditorMsg::InputChanged {
            text,
            selection_start,
            selection_end,
        } => {
            model.buffer = TextBuffer::new(text, selection_start, selection_end);
            refresh(model)
        }

        EditorMsg::CaretMeasured(anchor) => {
            if model.caret_anchor == Some(anchor) {
                return None;
            }
            model.caret_anchor = Some(anchor);
            model.menu_visible().then_some(Cmd::Redraw)
        }

        EditorMsg::KeyPressed(key) => match key_action(model, key)? {
            KeyAction::Dismiss => dismiss(model),
            KeyAction::EnterMenu => {
                model.focus = Focus::Menu;
                model.menu.focused_index = 0;
                Some(Cmd::Redraw)
            }
            KeyAction::LeaveMenu => {
                model.focus = Focus::Input;
                Some(Cmd::Redraw)
            }
            KeyAction::MoveFocus(delta) => {
                let len = model.dispatcher.results().len();
                model.menu.move_focus(delta, len);
                Some(Cmd::Redraw)
            }
            KeyAction::Select => select_entity(model, model.menu.focused_index),
        },
    }
}

/// Re-derive the focused token, focused lines and mention from the buffer
/// and feed the result to the dispatcher
pub fn refresh(model: &mut EditorModel) -> Option<Cmd> {
    model.token = analyze(&model.buffer);
    model.lines = focused_lines(&model.buffer);
    model.mention = model.resolver.resolve_at(&model.buffer, &model.token);

    // A dismissal lasts until the mention itself changes
    let still_dismissed = match (&model.dismissed, &model.mention) {
        (Some(dismissed), Some(mention)) => dismissed.matches(mention),
        _ => false,
    };
    if !still_dismissed {
        model.dismissed = None;
    }

    let dispatch = if still_dismissed {
        model.dispatcher.on_token_changed(None)
    } else {
        model.dispatcher.on_token_changed(model.mention.as_ref())
    };

    if !model.menu_visible() {
        model.focus = Focus::Input;
        model.menu.reset();
    }

    // The host always needs the new value and partition
    Cmd::combine([dispatch, Some(Cmd::Redraw)])
}

/// Splice the entity at `index` over the mention being composed.
///
/// Bare mentions are replaced from their start up to the caret; quoted
/// mentions are replaced whole. One space follows the insertion unless the
/// next character is already whitespace, and the caret lands after it.
pub fn select_entity(model: &mut EditorModel, index: usize) -> Option<Cmd> {
    if !model.menu_visible() {
        return None;
    }
    let mention = model.mention.clone()?;
    let entity = model.dispatcher.results().get(index)?.clone();

    let caret = model.buffer.caret();
    let end = if mention.quoted {
        mention.end.max(caret)
    } else {
        caret
    };
    let followed_by_space = model.buffer.char_at(end).is_some_and(char::is_whitespace);

    let mut insert = entity.insertion_text.clone();
    if !followed_by_space {
        insert.push(' ');
    }
    let new_caret = mention.start + entity.insertion_text.chars().count() + 1;

    tracing::info!(
        "Inserting {} {:?} over {}..{}",
        entity.category,
        entity.id,
        mention.start,
        end
    );
    model.buffer = model.buffer.splice(mention.start..end, &insert, new_caret);
    model.dismissed = None;
    model.focus = Focus::Input;
    refresh(model)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    Dismiss,
    EnterMenu,
    LeaveMenu,
    MoveFocus(isize),
    Select,
}

fn key_action(model: &EditorModel, key: KeyPress) -> Option<KeyAction> {
    if !model.menu_visible() {
        return None;
    }
    let has_items = !model.dispatcher.results().is_empty();

    match (model.focus, key.key, key.shift) {
        (_, Key::Escape, _) => Some(KeyAction::Dismiss),
        (Focus::Input, Key::Tab, false) if has_items => Some(KeyAction::EnterMenu),
        (Focus::Menu, Key::Tab, true) => Some(KeyAction::LeaveMenu),
        (Focus::Menu, Key::ArrowDown, _) => Some(KeyAction::MoveFocus(1)),
        (Focus::Menu, Key::ArrowUp, _) => Some(KeyAction::MoveFocus(-1)),
        (Focus::Menu, Key::Enter | Key::Space, _) if has_items => Some(KeyAction::Select),
        _ => None,
    }
}

/// True when the controller consumes `key`; the host should then suppress
/// the key's default behavior (focus traversal, newline, typed space)
pub fn intercepts_key(model: &EditorModel, key: KeyPress) -> bool {
    key_action(model, key).is_some()
}
