//! TUI reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use keyhole_core::form::Notice;
use keyhole_core::providers::Identity;
use keyhole_core::session::SessionChange;
use keyhole_core::view::View;

use crate::common::TaskKind;
use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::form::{FormAction, handle_form_key};
use crate::members::{MembersAction, handle_members_key};
use crate::overlays;
use crate::state::AppState;

/// The main reducer function.
///
/// Takes the current state and an event, mutates state, and returns effects
/// for the runtime to execute.
pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            app.spinner_frame = app.spinner_frame.wrapping_add(1);
            vec![]
        }
        UiEvent::Terminal(term_event) => handle_terminal_event(app, term_event),
        UiEvent::SessionChanged(identity) => {
            handle_session_changed(app, identity);
            vec![]
        }
        UiEvent::TaskStarted { kind, started } => {
            tracing::debug!(?kind, id = started.id.0, "task started");
            app.tasks.state_mut(kind).on_started(&started);
            vec![]
        }
        UiEvent::TaskCompleted { kind, completed } => {
            let ok = app.tasks.state_mut(kind).finish_if_active(completed.id);
            if ok {
                update(app, *completed.result)
            } else {
                tracing::debug!(?kind, id = completed.id.0, "dropping stale task result");
                vec![]
            }
        }
        UiEvent::SubmitFinished(result) => {
            app.form.hint = None;
            if let Some(notice) = Notice::from_submit(&result) {
                app.notice = Some(notice);
            }
            vec![]
        }
        UiEvent::SignOutFinished(result) => {
            if let Err(err) = result {
                app.notice = Some(Notice::Error(err.message));
            }
            vec![]
        }
    }
}

fn handle_session_changed(app: &mut AppState, identity: Option<Identity>) {
    let change = app.session.apply(identity);
    tracing::info!(
        ?change,
        email = app.session.identity().map(|i| i.email.as_str()),
        "session changed"
    );
    // The draft belongs to one sign-in attempt; any identity change ends it.
    match change {
        SessionChange::SignedIn | SessionChange::SignedOut | SessionChange::Switched => {
            app.form.reset();
        }
        SessionChange::Unchanged => {}
    }
}

fn handle_terminal_event(app: &mut AppState, event: Event) -> Vec<UiEffect> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(app, key),
        Event::Paste(text) => {
            if app.notice.is_none() && matches!(View::of(&app.session), View::Unauthenticated) {
                app.form.hint = None;
                app.form.paste(&text);
            }
            vec![]
        }
        _ => vec![],
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('c') {
        return vec![UiEffect::Quit];
    }

    if app.notice.is_some() {
        if overlays::is_dismiss_key(key) {
            app.notice = None;
        }
        return vec![];
    }

    match View::of(&app.session) {
        View::Loading => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
                vec![UiEffect::Quit]
            } else {
                vec![]
            }
        }
        View::Authenticated(_) => match handle_members_key(key) {
            MembersAction::SignOut => start_sign_out(app),
            MembersAction::Quit => vec![UiEffect::Quit],
            MembersAction::None => vec![],
        },
        View::Unauthenticated => match handle_form_key(&mut app.form, key) {
            FormAction::Submit => start_submit(app),
            FormAction::Quit => vec![UiEffect::Quit],
            FormAction::None => vec![],
        },
    }
}

/// Starts a submit unless one is already in flight or a field is empty.
fn start_submit(app: &mut AppState) -> Vec<UiEffect> {
    if app.tasks.state(TaskKind::Submit).is_running() {
        app.form.hint = Some("Submitting...".to_string());
        return vec![];
    }
    if let Err(missing) = app.form.draft.check_required() {
        app.form.hint = Some(missing.to_string());
        return vec![];
    }

    app.form.hint = None;
    let task = app.task_seq.next_id();
    app.tasks.state_mut(TaskKind::Submit).begin(task);
    vec![UiEffect::Submit {
        task,
        draft: app.form.draft.clone(),
    }]
}

fn start_sign_out(app: &mut AppState) -> Vec<UiEffect> {
    if app.tasks.state(TaskKind::SignOut).is_running() {
        return vec![];
    }
    let task = app.task_seq.next_id();
    app.tasks.state_mut(TaskKind::SignOut).begin(task);
    vec![UiEffect::SignOut { task }]
}
