//! Credential form reducer.
//!
//! Handles keys while nobody is signed in. Submitting needs the task
//! sequence, so it is reported back as `FormAction::Submit` for the top-level
//! reducer to turn into an effect.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::state::{FormField, FormState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    None,
    Submit,
    Quit,
}

pub fn handle_form_key(form: &mut FormState, key: KeyEvent) -> FormAction {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Esc => FormAction::Quit,
        KeyCode::Char('c') if ctrl => FormAction::Quit,
        KeyCode::Char('t') if ctrl => {
            form.toggle_mode();
            FormAction::None
        }
        KeyCode::Tab | KeyCode::Down => {
            form.focus = form.focus.next();
            FormAction::None
        }
        KeyCode::BackTab | KeyCode::Up => {
            form.focus = form.focus.prev();
            FormAction::None
        }
        KeyCode::Enter => match form.focus {
            FormField::Toggle => {
                form.toggle_mode();
                FormAction::None
            }
            FormField::Email | FormField::Password | FormField::Submit => FormAction::Submit,
        },
        KeyCode::Backspace => {
            form.hint = None;
            form.backspace();
            FormAction::None
        }
        KeyCode::Char(c) if !ctrl => {
            form.hint = None;
            form.insert_char(c);
            FormAction::None
        }
        _ => FormAction::None,
    }
}

#[cfg(test)]
mod tests {
    use keyhole_core::form::AuthMode;

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_enter_on_text_field_submits() {
        let mut form = FormState::default();
        assert_eq!(handle_form_key(&mut form, key(KeyCode::Enter)), FormAction::Submit);
    }

    #[test]
    fn test_enter_on_toggle_switches_mode() {
        let mut form = FormState {
            focus: FormField::Toggle,
            ..Default::default()
        };
        assert_eq!(handle_form_key(&mut form, key(KeyCode::Enter)), FormAction::None);
        assert_eq!(form.draft.mode, AuthMode::SignUp);
    }

    #[test]
    fn test_ctrl_t_toggles_and_keeps_fields() {
        let mut form = FormState::default();
        for c in "a@b.com".chars() {
            handle_form_key(&mut form, key(KeyCode::Char(c)));
        }

        handle_form_key(&mut form, ctrl('t'));
        handle_form_key(&mut form, ctrl('t'));

        assert_eq!(form.draft.mode, AuthMode::SignIn);
        assert_eq!(form.draft.email, "a@b.com");
    }

    #[test]
    fn test_shift_tab_moves_focus_back() {
        let mut form = FormState::default();
        handle_form_key(&mut form, key(KeyCode::BackTab));
        assert_eq!(form.focus, FormField::Toggle);
        handle_form_key(&mut form, key(KeyCode::Down));
        assert_eq!(form.focus, FormField::Email);
    }

    #[test]
    fn test_typing_clears_hint() {
        let mut form = FormState {
            hint: Some("Please enter your email address.".to_string()),
            ..Default::default()
        };
        handle_form_key(&mut form, key(KeyCode::Char('a')));
        assert!(form.hint.is_none());
    }

    #[test]
    fn test_quit_keys() {
        let mut form = FormState::default();
        assert_eq!(handle_form_key(&mut form, key(KeyCode::Esc)), FormAction::Quit);
        assert_eq!(handle_form_key(&mut form, ctrl('c')), FormAction::Quit);
        // Plain 'q' is text.
        assert_eq!(handle_form_key(&mut form, key(KeyCode::Char('q'))), FormAction::None);
        assert_eq!(form.draft.email, "q");
    }
}
