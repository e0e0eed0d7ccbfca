//! Stable re-exports for consumers (`cli` and external crates).
//!
//! Prefer importing from `triage_core::api` instead of reaching into internal modules.

pub use crate::config::{
    load_default, load_from, AppConfig, LoggingConfig, RelayConfig, TuiConfig,
};
pub use crate::env::{parse_env_file, parse_env_line, resolve_session_env};
pub use crate::error::{CliError, FailureKind, RelayError};
pub use crate::relay::{notice, Relay, RelayReport, RelaySettings, Transcript};
pub use crate::runner::{LaunchSpec, ProcessRunner, RunnerPlugin, RunnerSession};
pub use crate::sink::{MessageId, MessageSink};
