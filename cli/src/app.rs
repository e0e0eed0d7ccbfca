//! Assembly: merge config sources, build the relay, and dispatch to a front-end.
use std::sync::Arc;

use triage_core::api as core_api;
use triage_core::api::CliError;

use crate::commands::cli::{Args, ChatArgs, Commands};
use crate::flow::{ask, console, tui};

/// Config file (explicit or searched), then `TRIAGE_*` env, then CLI flags.
pub fn load_config(args: &Args) -> Result<core_api::AppConfig, CliError> {
    let mut cfg = match args.config.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(path) => core_api::load_from(std::path::Path::new(path)),
        None => core_api::load_default(),
    }
    .map_err(|e| CliError::Config(e.to_string()))?;
    apply_cli_overrides(&mut cfg, args);
    Ok(cfg)
}

pub fn apply_cli_overrides(cfg: &mut core_api::AppConfig, args: &Args) {
    if let Some(bin) = args.bin.as_deref().filter(|s| !s.trim().is_empty()) {
        cfg.relay.binary = bin.to_string();
    }
    if let Some(root) = args.project_root.as_deref().filter(|s| !s.trim().is_empty()) {
        cfg.relay.project_root = Some(root.to_string());
    }
}

pub fn build_relay(cfg: &core_api::AppConfig) -> Result<core_api::Relay, CliError> {
    let settings = core_api::RelaySettings::from_config(&cfg.relay)?;
    tracing::debug!(
        binary = %settings.binary.display(),
        project_root = %settings.project_root.display(),
        env_file = %settings.env_file.display(),
        "relay configured"
    );
    Ok(core_api::Relay::new(
        settings,
        Arc::new(core_api::ProcessRunner::new()),
    ))
}

/// Whether this invocation will hand the terminal to the full-screen chat.
pub fn wants_tui(args: &Args, cfg: &core_api::AppConfig) -> bool {
    let no_tui = match &args.command {
        None => false,
        Some(Commands::Chat(chat)) => chat.no_tui,
        Some(Commands::Ask(_)) => return false,
    };
    if no_tui || !cfg.tui.enabled {
        return false;
    }
    match crate::tui::check_tui_support() {
        Ok(()) => true,
        Err(reason) => {
            // tracing is not initialised yet
            eprintln!("full-screen chat unavailable ({reason}); using console chat");
            false
        }
    }
}

#[tracing::instrument(name = "cli.run_app", skip_all, fields(use_tui = use_tui))]
pub async fn run_app(
    args: Args,
    cfg: core_api::AppConfig,
    use_tui: bool,
) -> Result<i32, CliError> {
    let relay = build_relay(&cfg)?;

    match args.command.unwrap_or(Commands::Chat(ChatArgs::default())) {
        Commands::Ask(ask_args) => ask::run_ask_flow(&relay, &ask_args).await,
        Commands::Chat(_) if use_tui => tui::run_tui_flow(relay, &cfg.tui).await,
        Commands::Chat(_) => console::run_console_flow(&relay).await,
    }
}
