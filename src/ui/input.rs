//! Keyboard input handling.
//!
//! Routes keystrokes by focus: list navigation and form-opening keys while
//! the list has focus, field editing and submission while a form does.

use crate::app::{App, AppEvent, Focus};
use crate::registry::Mode;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::Action;

/// Index of the deletion-flag checkbox within the edit form.
const EDIT_FLAG_FIELD: usize = 2;

pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    tx: &mpsc::Sender<AppEvent>,
) -> Action {
    // Ctrl+C quits regardless of focus.
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return Action::Quit;
    }

    match app.focus {
        Focus::List => handle_list_input(app, code, tx),
        Focus::Form => handle_form_input(app, code, tx),
    }
}

fn handle_list_input(app: &mut App, code: KeyCode, tx: &mpsc::Sender<AppEvent>) -> Action {
    match code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Char('j') | KeyCode::Down => app.cursor_down(),
        KeyCode::Char('k') | KeyCode::Up => app.cursor_up(),
        KeyCode::Char('a') => app.begin_add(),
        KeyCode::Enter => app.begin_edit_at_cursor(),
        KeyCode::Char('d') => app.request_delete(tx),
        KeyCode::Char('r') => app.reload(tx),
        KeyCode::Esc => app.close_form(),
        _ => {}
    }
    Action::Continue
}

fn handle_form_input(app: &mut App, code: KeyCode, tx: &mpsc::Sender<AppEvent>) -> Action {
    let fields = app.field_count();
    let on_flag_field = app.list.mode() == Mode::Editing && app.field == EDIT_FLAG_FIELD;

    match code {
        KeyCode::Esc => app.close_form(),
        KeyCode::Tab | KeyCode::Down => {
            if fields > 0 {
                app.field = (app.field + 1) % fields;
            }
        }
        KeyCode::BackTab | KeyCode::Up => {
            if fields > 0 {
                app.field = (app.field + fields - 1) % fields;
            }
        }
        KeyCode::Enter => match app.list.mode() {
            Mode::Adding => app.submit_add(tx),
            Mode::Editing => app.submit_edit(tx),
            Mode::Idle => {}
        },
        KeyCode::Char(' ') if on_flag_field => {
            app.edit_form.marked_for_deletion = !app.edit_form.marked_for_deletion;
        }
        KeyCode::Char(c) => {
            if let Some(field) = active_text_field(app) {
                field.push(c);
            }
        }
        KeyCode::Backspace => {
            if let Some(field) = active_text_field(app) {
                field.pop();
            }
        }
        _ => {}
    }
    Action::Continue
}

/// The text field under the form cursor, if the cursor is on one (the edit
/// form's deletion flag is a checkbox, not text).
fn active_text_field(app: &mut App) -> Option<&mut String> {
    match (app.list.mode(), app.field) {
        (Mode::Adding, 0) => Some(&mut app.add_form.name),
        (Mode::Adding, 1) => Some(&mut app.add_form.url),
        (Mode::Editing, 0) => Some(&mut app.edit_form.url),
        (Mode::Editing, 1) => Some(&mut app.edit_form.content_type),
        _ => None,
    }
}
