//! Application state composition.
//!
//! ```text
//! AppState
//! ├── session: SessionState  (driven only by provider notifications)
//! ├── form: FormState        (credential draft, focus, inline hint)
//! ├── notice: Option<Notice> (modal outcome notice)
//! ├── task_seq: TaskSeq      (async task id generator)
//! └── tasks: Tasks           (submit / sign-out lifecycle)
//! ```

use keyhole_core::form::Notice;
use keyhole_core::session::SessionState;

use crate::common::{TaskSeq, Tasks};
use crate::form::FormState;

/// Combined application state for the TUI.
#[derive(Debug)]
pub struct AppState {
    pub session: SessionState,
    pub form: FormState,
    pub notice: Option<Notice>,
    pub task_seq: TaskSeq,
    pub tasks: Tasks,
    /// Spinner animation frame counter (incremented on tick).
    pub spinner_frame: usize,
    pub should_quit: bool,
    /// Provider name for the status line.
    pub provider_name: String,
}

impl AppState {
    pub fn new(provider_name: impl Into<String>) -> Self {
        Self {
            session: SessionState::default(),
            form: FormState::default(),
            notice: None,
            task_seq: TaskSeq::default(),
            tasks: Tasks::default(),
            spinner_frame: 0,
            should_quit: false,
            provider_name: provider_name.into(),
        }
    }
}
