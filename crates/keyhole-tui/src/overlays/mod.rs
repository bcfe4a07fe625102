//! Overlay modules for the TUI.
//!
//! Overlays are modal UI components that temporarily take over keyboard input.
//!
//! - `notice.rs`: Outcome notice shown after a credential call
//! - `render_utils.rs`: Shared rendering utilities for boxed views

pub mod notice;
pub mod render_utils;

pub use notice::{is_dismiss_key, render_notice};
