//! Credential form feature (state/update/render).

mod render;
mod state;
mod update;

pub use render::render_form;
pub use state::{FormField, FormState};
pub use update::{FormAction, handle_form_key};
