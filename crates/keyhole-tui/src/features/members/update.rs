//! Members panel reducer.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembersAction {
    None,
    SignOut,
    Quit,
}

pub fn handle_members_key(key: KeyEvent) -> MembersAction {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('c') if ctrl => MembersAction::Quit,
        KeyCode::Esc | KeyCode::Char('q') => MembersAction::Quit,
        KeyCode::Enter | KeyCode::Char('l') => MembersAction::SignOut,
        _ => MembersAction::None,
    }
}
