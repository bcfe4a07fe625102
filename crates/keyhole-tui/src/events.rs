//! UI event types.
//!
//! All external inputs (terminal, session notifications, task results) are
//! converted to `UiEvent` before being processed by the reducer.
//!
//! ## Task Lifecycle Events
//!
//! Provider calls use a uniform lifecycle:
//! - The runtime emits `UiEvent::TaskStarted` once a task is actually spawned
//! - The runtime emits `UiEvent::TaskCompleted` with the result event when done
//! - The reducer is the only place that mutates `TaskState`

use crossterm::event::Event as CrosstermEvent;
use keyhole_core::form::SubmitOutcome;
use keyhole_core::providers::{Identity, ProviderError};

use crate::common::{TaskCompleted, TaskKind, TaskStarted};

#[derive(Debug)]
pub enum UiEvent {
    /// Periodic tick (spinner animation, render cadence).
    Tick,
    /// Raw terminal input.
    Terminal(CrosstermEvent),
    /// Provider reported the current identity.
    SessionChanged(Option<Identity>),
    TaskStarted {
        kind: TaskKind,
        started: TaskStarted,
    },
    TaskCompleted {
        kind: TaskKind,
        completed: TaskCompleted<Box<UiEvent>>,
    },
    /// Result of a credential submit.
    SubmitFinished(Result<SubmitOutcome, ProviderError>),
    /// Result of a sign-out call.
    SignOutFinished(Result<(), ProviderError>),
}
