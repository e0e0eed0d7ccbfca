use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncRead;
use tokio::process::{Child, Command};

use crate::error::RelayError;

use super::exit::normalize_exit;
use super::traits::{RunnerPlugin, RunnerSession};
use super::types::LaunchSpec;

/// Spawns the triage binary as a local child process.
#[derive(Debug, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RunnerPlugin for ProcessRunner {
    fn name(&self) -> &str {
        "process"
    }

    async fn start_session(&self, spec: &LaunchSpec) -> Result<Box<dyn RunnerSession>, RelayError> {
        // A missing cwd also surfaces as NotFound from spawn.
        if !spec.cwd.is_dir() {
            return Err(RelayError::Spawn(format!(
                "project root is not a directory: {}",
                spec.cwd.display()
            )));
        }

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .env_clear()
            .envs(&spec.envs)
            .current_dir(&spec.cwd)
            .stdin(Stdio::null());

        #[cfg(unix)]
        let merged_rx = {
            let (rx, tx) = std::io::pipe()
                .map_err(|e| RelayError::Spawn(format!("failed to create output pipe: {e}")))?;
            let tx_err = tx
                .try_clone()
                .map_err(|e| RelayError::Spawn(format!("failed to clone output pipe: {e}")))?;
            cmd.stdout(tx).stderr(tx_err);
            rx
        };
        #[cfg(not(unix))]
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

        let spawned = cmd.spawn();
        // `cmd` holds the parent's write ends; EOF only arrives once they are closed
        drop(cmd);
        let child = spawned.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => RelayError::BinaryNotFound {
                path: spec.program.clone(),
            },
            _ => RelayError::Spawn(e.to_string()),
        })?;

        tracing::debug!(
            pid = child.id(),
            program = %spec.program.display(),
            "child spawned"
        );

        #[cfg(unix)]
        let merged = {
            let rx = tokio::net::unix::pipe::Receiver::from_owned_fd(merged_rx.into())
                .map_err(|e| RelayError::Spawn(format!("failed to register output pipe: {e}")))?;
            Some(Box::new(rx) as Box<dyn AsyncRead + Unpin + Send>)
        };
        #[cfg(not(unix))]
        let merged = None;

        Ok(Box::new(ProcessSession { child, merged }))
    }
}

/// On unix stdout and stderr share one pipe, handed out by `stdout`, so lines
/// keep the order the child wrote them in.
struct ProcessSession {
    child: Child,
    merged: Option<Box<dyn AsyncRead + Unpin + Send>>,
}

#[async_trait]
impl RunnerSession for ProcessSession {
    fn stdout(&mut self) -> Option<Box<dyn AsyncRead + Unpin + Send>> {
        if let Some(merged) = self.merged.take() {
            return Some(merged);
        }
        self.child
            .stdout
            .take()
            .map(|s| Box::new(s) as Box<dyn AsyncRead + Unpin + Send>)
    }

    fn stderr(&mut self) -> Option<Box<dyn AsyncRead + Unpin + Send>> {
        self.child
            .stderr
            .take()
            .map(|s| Box::new(s) as Box<dyn AsyncRead + Unpin + Send>)
    }

    fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    async fn wait(&mut self) -> Result<i32, RelayError> {
        let status = self.child.wait().await?;
        Ok(normalize_exit(status))
    }
}
