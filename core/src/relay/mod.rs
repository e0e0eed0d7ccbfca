//! Relay: forwards one query to the triage binary and streams its combined
//! output into a single chat message.
pub mod notice;
mod transcript;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::RelayConfig;
use crate::env::resolve_session_env;
use crate::error::RelayError;
use crate::runner::{pump_lines, LaunchSpec, LineStream, LineTap, RunnerPlugin};
use crate::sink::{MessageId, MessageSink};

pub use transcript::Transcript;

/// Resolved, absolute form of [`RelayConfig`].
#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub binary: PathBuf,
    pub project_root: PathBuf,
    pub env_file: PathBuf,
    pub required_key: String,
    pub decision_marker: String,
    pub command_prefix: Vec<String>,
    pub stream: bool,
    pub line_channel_capacity: usize,
}

impl RelaySettings {
    pub fn from_config(cfg: &RelayConfig) -> Result<Self, RelayError> {
        let binary = expand(&cfg.binary)?;

        let project_root = match cfg
            .project_root
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(p) => expand(p)?,
            None => std::env::current_dir().map_err(|e| {
                RelayError::Config(format!("failed to determine project root: {e}"))
            })?,
        };

        let env_file = {
            let p = expand(&cfg.env_file)?;
            if p.is_absolute() {
                p
            } else {
                project_root.join(p)
            }
        };

        if cfg.required_key.trim().is_empty() {
            return Err(RelayError::Config("relay.required_key is empty".to_string()));
        }

        Ok(Self {
            binary,
            project_root,
            env_file,
            required_key: cfg.required_key.trim().to_string(),
            decision_marker: cfg.decision_marker.clone(),
            command_prefix: cfg.command_prefix.clone(),
            stream: cfg.stream,
            line_channel_capacity: cfg.line_channel_capacity.max(1),
        })
    }

    /// `<prefix…> --query <query> --stream <true|false>`
    pub fn args_for(&self, query: &str) -> Vec<String> {
        let mut args = self.command_prefix.clone();
        args.push("--query".to_string());
        args.push(query.to_string());
        args.push("--stream".to_string());
        args.push(self.stream.to_string());
        args
    }
}

fn expand(raw: &str) -> Result<PathBuf, RelayError> {
    shellexpand::full(raw)
        .map(|s| PathBuf::from(s.as_ref()))
        .map_err(|e| RelayError::Config(format!("failed to expand `{raw}`: {e}")))
}

/// Ok result of one relayed query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayReport {
    pub exit_code: i32,
    pub lines: usize,
    pub decision: Option<String>,
    pub content: String,
}

#[derive(Clone)]
pub struct Relay {
    settings: RelaySettings,
    runner: Arc<dyn RunnerPlugin>,
    ambient: Option<HashMap<String, String>>,
}

impl Relay {
    pub fn new(settings: RelaySettings, runner: Arc<dyn RunnerPlugin>) -> Self {
        Self {
            settings,
            runner,
            ambient: None,
        }
    }

    /// Use a fixed ambient environment instead of reading the process environment
    /// on every query.
    pub fn with_ambient_env(mut self, ambient: HashMap<String, String>) -> Self {
        self.ambient = Some(ambient);
        self
    }

    pub fn settings(&self) -> &RelaySettings {
        &self.settings
    }

    /// Send the session greeting. Call once per new chat session.
    pub async fn greet(&self, sink: &mut dyn MessageSink) -> Result<MessageId, RelayError> {
        sink.send_message(notice::WELCOME)
            .await
            .map_err(RelayError::Sink)
    }

    /// Relay one query. Every failure has already been rendered into the sink
    /// when this returns `Err`.
    #[tracing::instrument(name = "relay.handle", skip_all, fields(run_id = tracing::field::Empty))]
    pub async fn handle(
        &self,
        query: &str,
        sink: &mut dyn MessageSink,
    ) -> Result<RelayReport, RelayError> {
        let query = query.trim();
        if query.is_empty() {
            tracing::info!("empty query rejected");
            sink.send_message(notice::EMPTY_QUERY)
                .await
                .map_err(RelayError::Sink)?;
            return Err(RelayError::EmptyQuery);
        }

        let run_id = uuid::Uuid::new_v4().to_string();
        tracing::Span::current().record("run_id", run_id.as_str());
        tracing::info!(query_len = query.len(), "relay started");

        let id = sink.send_message("").await.map_err(RelayError::Sink)?;
        let mut rendered = String::new();

        match self.stream(query, sink, id, &mut rendered).await {
            Ok(report) => {
                tracing::info!(
                    exit_code = report.exit_code,
                    lines = report.lines,
                    decision = report.decision.as_deref().unwrap_or("-"),
                    "relay finished"
                );
                Ok(report)
            }
            Err(err) => {
                tracing::warn!(error = %err, kind = ?err.kind(), "relay failed");
                let content = self.failure_content(&err, &rendered);
                if let Err(e) = sink.update_message(id, &content).await {
                    tracing::error!(error = %e, "failed to render failure notice");
                }
                Err(err)
            }
        }
    }

    fn failure_content(&self, err: &RelayError, rendered: &str) -> String {
        match err {
            RelayError::NonZeroExit { code } => format!("{rendered}{}", notice::exit_status(*code)),
            RelayError::BinaryNotFound { path } => notice::binary_not_found(path),
            RelayError::MissingCredential { key } => {
                notice::missing_credential(key, &self.settings.env_file)
            }
            other => notice::runtime(other),
        }
    }

    async fn stream(
        &self,
        query: &str,
        sink: &mut dyn MessageSink,
        id: MessageId,
        rendered: &mut String,
    ) -> Result<RelayReport, RelayError> {
        let env = self.session_env()?;
        if !env.contains_key(&self.settings.required_key) {
            return Err(RelayError::MissingCredential {
                key: self.settings.required_key.clone(),
            });
        }

        let spec = LaunchSpec {
            program: self.settings.binary.clone(),
            args: self.settings.args_for(query),
            envs: env,
            cwd: self.settings.project_root.clone(),
        };
        let mut session = self.runner.start_session(&spec).await?;
        tracing::debug!(runner = self.runner.name(), "session started");

        let (line_tx, mut line_rx) = mpsc::channel::<LineTap>(self.settings.line_channel_capacity);
        let pumps = [
            session
                .stdout()
                .map(|rd| pump_lines(rd, LineStream::Stdout, line_tx.clone())),
            session
                .stderr()
                .map(|rd| pump_lines(rd, LineStream::Stderr, line_tx.clone())),
        ];
        drop(line_tx);

        let mut transcript = Transcript::new(self.settings.decision_marker.clone());
        while let Some(tap) = line_rx.recv().await {
            tracing::debug!(stream = tap.stream.label(), line = %tap.line, "line");
            transcript.push(tap.line);
            let content = transcript.render();
            sink.update_message(id, &content)
                .await
                .map_err(RelayError::Sink)?;
            *rendered = content;
        }

        for pump in pumps.into_iter().flatten() {
            let pumped = pump
                .await
                .map_err(|e| RelayError::Spawn(format!("output pump task failed: {e}")))
                .and_then(|r| r);
            if let Err(err) = pumped {
                tracing::warn!(
                    pid = ?session.pid(),
                    error = %err,
                    "output pump failed; child is left running and not awaited"
                );
                return Err(err);
            }
        }

        let exit_code = session.wait().await?;
        if exit_code != 0 {
            return Err(RelayError::NonZeroExit { code: exit_code });
        }

        Ok(RelayReport {
            exit_code,
            lines: transcript.len(),
            decision: transcript.decision().map(str::to_string),
            content: rendered.clone(),
        })
    }

    fn session_env(&self) -> Result<HashMap<String, String>, RelayError> {
        let env_file: &Path = &self.settings.env_file;
        match &self.ambient {
            Some(ambient) => resolve_session_env(ambient.clone(), env_file),
            // non-UTF-8 variables are not forwarded
            None => resolve_session_env(
                std::env::vars_os()
                    .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?))),
                env_file,
            ),
        }
    }
}
