//! Console chat: a prompt loop over stdin for terminals that cannot host the full-screen chat.
use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};
use triage_core::api as core_api;
use triage_core::api::CliError;

use crate::commands::cli::OutputFormat;
use crate::console::ConsoleSink;

const PROMPT: &str = "\n> ";

pub async fn run_console_flow(relay: &core_api::Relay) -> Result<i32, CliError> {
    let mut sink = ConsoleSink::new(std::io::stdout(), OutputFormat::Text);
    relay.greet(&mut sink).await?;
    sink.finish()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print_prompt()?;
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                tracing::debug!("console chat interrupted");
                None
            }
        };
        let Some(line) = line else {
            break;
        };
        if is_quit(&line) {
            break;
        }

        // the failure is already on screen; keep the session going
        if let Err(err) = relay.handle(&line, &mut sink).await {
            tracing::debug!(error = %err, "query failed");
        }
        sink.finish()?;
    }

    println!();
    Ok(0)
}

fn print_prompt() -> std::io::Result<()> {
    let mut out = std::io::stdout();
    out.write_all(PROMPT.as_bytes())?;
    out.flush()
}

fn is_quit(line: &str) -> bool {
    matches!(line.trim(), "/quit" | "/exit")
}
