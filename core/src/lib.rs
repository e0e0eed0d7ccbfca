//! triage-core: relays chat queries to the TriageAgency CLI and streams its output
//! back into a message sink.
pub mod api;
pub mod config;
pub mod env;
pub mod error;
pub mod relay;
pub mod runner;
pub mod sink;
