//! Members-only panel shown while signed in.

mod render;
mod update;

pub use render::render_members;
pub use update::{MembersAction, handle_members_key};
