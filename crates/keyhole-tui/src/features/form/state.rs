use keyhole_core::form::CredentialDraft;

/// Focusable controls of the credential form, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Email,
    Password,
    Submit,
    Toggle,
}

impl FormField {
    const ORDER: [FormField; 4] = [
        FormField::Email,
        FormField::Password,
        FormField::Submit,
        FormField::Toggle,
    ];

    fn index(self) -> usize {
        match self {
            FormField::Email => 0,
            FormField::Password => 1,
            FormField::Submit => 2,
            FormField::Toggle => 3,
        }
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// Credential form UI state.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub draft: CredentialDraft,
    pub focus: FormField,
    /// Inline message under the form (missing field, submit in progress).
    pub hint: Option<String>,
}

impl FormState {
    /// Empty sign-in form with the email field focused.
    pub fn reset(&mut self) {
        self.draft.reset();
        self.focus = FormField::Email;
        self.hint = None;
    }

    pub fn toggle_mode(&mut self) {
        self.draft.toggle_mode();
        self.hint = None;
    }

    fn focused_text_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            FormField::Email => Some(&mut self.draft.email),
            FormField::Password => Some(&mut self.draft.password),
            FormField::Submit | FormField::Toggle => None,
        }
    }

    /// Appends a character to the focused text field.
    pub fn insert_char(&mut self, c: char) {
        if let Some(text) = self.focused_text_mut() {
            text.push(c);
        }
    }

    /// Removes the last character of the focused text field.
    pub fn backspace(&mut self) {
        if let Some(text) = self.focused_text_mut() {
            text.pop();
        }
    }

    /// Inserts pasted text into the focused field, dropping line breaks.
    pub fn paste(&mut self, text: &str) {
        for c in text.chars().filter(|c| !c.is_control()) {
            self.insert_char(c);
        }
    }
}
