mod app;
mod events;
mod sink;
mod terminal;
mod ui;

use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use triage_core::api::{CliError, Relay, RelayError, RelayReport, TuiConfig};

pub use app::{ChatAction, ChatApp, ChatMessage, ChatStatus, Role};
pub use events::{InputEvent, InputReader};
pub use sink::{ChannelSink, ChatEvent};
pub use terminal::{check_tui_support, restore_terminal, setup_terminal, ChatTerminal};

type RelayTask = JoinHandle<Result<RelayReport, RelayError>>;

/// Full-screen chat session. Restores the terminal on every exit path.
pub async fn run_chat(relay: Relay, cfg: &TuiConfig) -> Result<i32, CliError> {
    let mut terminal = setup_terminal().map_err(CliError::Command)?;
    let result = chat_loop(&mut terminal, relay, cfg).await;
    restore_terminal(&mut terminal);
    result
}

async fn chat_loop(
    terminal: &mut ChatTerminal,
    relay: Relay,
    cfg: &TuiConfig,
) -> Result<i32, CliError> {
    let mut app = ChatApp::new(cfg.clone());
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let ids = Arc::new(AtomicU64::new(1));

    relay
        .greet(&mut ChannelSink::new(event_tx.clone(), ids.clone()))
        .await?;

    let (input_reader, mut input_rx) = InputReader::start();
    let mut tick = tokio::time::interval(Duration::from_millis(cfg.update_interval_ms.max(16)));
    let mut in_flight: Option<RelayTask> = None;

    tracing::debug!("chat loop starting");
    let outcome = loop {
        tokio::select! {
            Some(event) = event_rx.recv() => app.handle_event(event),
            Some(input) = input_rx.recv() => {
                let action = match input {
                    InputEvent::Key(key) => app.handle_key(key),
                    InputEvent::Mouse(mouse) => {
                        app.handle_mouse(mouse);
                        ChatAction::None
                    }
                    InputEvent::Resize => ChatAction::None,
                };
                match action {
                    ChatAction::Quit => break Ok(0),
                    ChatAction::Submit(query) => {
                        let relay = relay.clone();
                        let mut sink = ChannelSink::new(event_tx.clone(), ids.clone());
                        in_flight = Some(tokio::spawn(async move {
                            relay.handle(&query, &mut sink).await
                        }));
                        app.begin_query();
                    }
                    ChatAction::None => {}
                }
            }
            result = join_in_flight(&mut in_flight) => {
                in_flight = None;
                // renders sent before the task ended are already queued
                while let Ok(event) = event_rx.try_recv() {
                    app.handle_event(event);
                }
                if let Err(ref err) = result {
                    tracing::debug!(error = %err, "query failed");
                }
                app.finish_query(&result);
            }
            _ = tick.tick() => {}
        }

        if let Err(e) = terminal.draw(|f| ui::draw(f, &app)) {
            break Err(CliError::Command(format!("draw failed: {e}")));
        }
    };

    input_reader.stop();
    if in_flight.is_some() {
        tracing::info!("chat closed while a query was in flight");
    }
    outcome
}

async fn join_in_flight(task: &mut Option<RelayTask>) -> Result<RelayReport, RelayError> {
    match task {
        Some(handle) => match handle.await {
            Ok(result) => result,
            Err(e) => Err(RelayError::Spawn(format!("relay task failed: {e}"))),
        },
        None => std::future::pending().await,
    }
}
