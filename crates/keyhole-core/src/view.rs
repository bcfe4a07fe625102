//! View selection.
//!
//! Which screen to show is a pure function of the session state. Screen text
//! lives here so every front-end renders the same words.

use crate::form::PASSWORD_HINT_LEN;
use crate::providers::Identity;
use crate::session::SessionState;

pub const LOADING_TEXT: &str = "Loading...";
pub const MEMBERS_HEADING: &str = "Day 9 goal reached!";
pub const MEMBERS_SUBHEADING: &str = "Members-only page";
pub const MEMBERS_NOTE: &str = "Only signed-in users can see this page.";
pub const LOG_OUT_LABEL: &str = "Log out";
pub const EMAIL_PLACEHOLDER: &str = "Email address";

/// Screen to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View<'a> {
    Loading,
    Authenticated(&'a Identity),
    Unauthenticated,
}

impl<'a> View<'a> {
    pub fn of(session: &'a SessionState) -> Self {
        match session {
            SessionState::Loading => View::Loading,
            SessionState::Authenticated(identity) => View::Authenticated(identity),
            SessionState::Unauthenticated => View::Unauthenticated,
        }
    }
}

pub fn welcome_line(identity: &Identity) -> String {
    format!("Welcome, {}", identity.email)
}

pub fn password_placeholder() -> String {
    format!("Password (at least {PASSWORD_HINT_LEN} characters)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_follows_session() {
        assert_eq!(View::of(&SessionState::Loading), View::Loading);
        assert_eq!(
            View::of(&SessionState::Unauthenticated),
            View::Unauthenticated
        );

        let session = SessionState::Authenticated(Identity::new("u1", "a@b.com"));
        match View::of(&session) {
            View::Authenticated(identity) => {
                assert_eq!(welcome_line(identity), "Welcome, a@b.com");
            }
            other => panic!("expected authenticated view, got {other:?}"),
        }
    }

    #[test]
    fn test_password_placeholder() {
        assert_eq!(password_placeholder(), "Password (at least 6 characters)");
    }
}
