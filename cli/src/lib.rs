//! triage-cli library: front-ends around `triage_core::Relay`, exposed for unit tests.

pub mod app;
pub mod commands;
pub mod console;
pub mod flow;
pub mod tui;
