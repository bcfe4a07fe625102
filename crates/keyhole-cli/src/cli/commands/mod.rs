pub mod config;
pub mod tui;
