//! Full-screen chat flow.
use triage_core::api as core_api;
use triage_core::api::CliError;

pub async fn run_tui_flow(
    relay: core_api::Relay,
    cfg: &core_api::TuiConfig,
) -> Result<i32, CliError> {
    tracing::info!(
        max_messages = cfg.max_messages,
        auto_scroll = cfg.auto_scroll,
        "starting full-screen chat"
    );
    crate::tui::run_chat(relay, cfg).await
}
