//! Core keyhole library (providers, session, form, config).

pub mod config;
pub mod form;
pub mod providers;
pub mod session;
pub mod view;
