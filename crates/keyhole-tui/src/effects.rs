//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! They represent I/O and task spawning only, which keeps the reducer pure.

use keyhole_core::form::CredentialDraft;

use crate::common::TaskId;

/// Effects returned by the reducer for the runtime to execute.
#[derive(Debug)]
pub enum UiEffect {
    /// Quit the application.
    Quit,

    /// Send the draft to the provider.
    Submit {
        task: TaskId,
        draft: CredentialDraft,
    },

    /// Sign the current user out.
    SignOut { task: TaskId },
}
