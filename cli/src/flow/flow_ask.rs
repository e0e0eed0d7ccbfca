//! One-shot flow: relay a single query to stdout and mirror its outcome in the exit code.
use triage_core::api as core_api;
use triage_core::api::CliError;

use crate::commands::cli::AskArgs;
use crate::console::ConsoleSink;

pub async fn run_ask_flow(relay: &core_api::Relay, ask: &AskArgs) -> Result<i32, CliError> {
    let mut sink = ConsoleSink::new(std::io::stdout(), ask.format);
    let outcome = relay.handle(&ask.query_text(), &mut sink).await;
    sink.finish()?;
    Ok(exit_code_for(&outcome))
}

/// The failure has already been rendered to stdout, so it only shapes the exit code.
pub fn exit_code_for(outcome: &Result<core_api::RelayReport, core_api::RelayError>) -> i32 {
    match outcome {
        Ok(report) => report.exit_code,
        Err(err) => {
            tracing::debug!(error = %err, kind = ?err.kind(), "ask failed");
            err.exit_code()
        }
    }
}
