#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use async_trait::async_trait;
use tokio::io::{AsyncRead, ReadBuf};
use triage_core::api::{
    LaunchSpec, MessageId, MessageSink, RelayError, RelaySettings, RunnerPlugin, RunnerSession,
};

pub const MARKER: &str = "🤖 Triage decision:";

pub fn settings_in(root: &Path) -> RelaySettings {
    RelaySettings {
        binary: PathBuf::from("/opt/triage/bin/gleam"),
        project_root: root.to_path_buf(),
        env_file: root.join(".env"),
        required_key: "OPENROUTER_API_KEY".to_string(),
        decision_marker: MARKER.to_string(),
        command_prefix: vec!["run".to_string(), "--".to_string()],
        stream: true,
        line_channel_capacity: 16,
    }
}

pub fn ambient_with_key() -> HashMap<String, String> {
    [
        ("OPENROUTER_API_KEY".to_string(), "sk-test".to_string()),
        ("PATH".to_string(), "/usr/bin:/bin".to_string()),
    ]
    .into_iter()
    .collect()
}

/// Scripted child: fixed output, fixed exit code, counts launches.
#[derive(Default)]
pub struct FakeRunner {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub exit_code: i32,
    pub missing_binary: bool,
    /// stdout fails with an io error on the first read.
    pub broken_stdout: bool,
    pub launches: AtomicUsize,
    pub waits: Arc<AtomicUsize>,
    pub last_spec: Mutex<Option<LaunchSpec>>,
}

impl FakeRunner {
    pub fn with_stdout(stdout: &str, exit_code: i32) -> Arc<Self> {
        Arc::new(Self {
            stdout: stdout.as_bytes().to_vec(),
            exit_code,
            ..Self::default()
        })
    }

    pub fn missing() -> Arc<Self> {
        Arc::new(Self {
            missing_binary: true,
            ..Self::default()
        })
    }

    pub fn wait_count(&self) -> usize {
        self.waits.load(Ordering::SeqCst)
    }

    pub fn launch_count(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn last_spec(&self) -> Option<LaunchSpec> {
        self.last_spec.lock().unwrap().clone()
    }
}

#[async_trait]
impl RunnerPlugin for FakeRunner {
    fn name(&self) -> &str {
        "fake"
    }

    async fn start_session(&self, spec: &LaunchSpec) -> Result<Box<dyn RunnerSession>, RelayError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        *self.last_spec.lock().unwrap() = Some(spec.clone());
        if self.missing_binary {
            return Err(RelayError::BinaryNotFound {
                path: spec.program.clone(),
            });
        }
        Ok(Box::new(FakeSession {
            stdout: Some(self.stdout.clone()),
            stderr: Some(self.stderr.clone()),
            exit_code: self.exit_code,
            broken_stdout: self.broken_stdout,
            waits: self.waits.clone(),
        }))
    }
}

struct FakeSession {
    stdout: Option<Vec<u8>>,
    stderr: Option<Vec<u8>>,
    exit_code: i32,
    broken_stdout: bool,
    waits: Arc<AtomicUsize>,
}

struct BrokenPipe;

impl AsyncRead for BrokenPipe {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        Poll::Ready(Err(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "pipe closed",
        )))
    }
}

#[async_trait]
impl RunnerSession for FakeSession {
    fn stdout(&mut self) -> Option<Box<dyn AsyncRead + Unpin + Send>> {
        if self.broken_stdout {
            self.broken_stdout = false;
            self.stdout = None;
            return Some(Box::new(BrokenPipe));
        }
        self.stdout
            .take()
            .map(|b| Box::new(std::io::Cursor::new(b)) as Box<dyn AsyncRead + Unpin + Send>)
    }

    fn stderr(&mut self) -> Option<Box<dyn AsyncRead + Unpin + Send>> {
        self.stderr
            .take()
            .map(|b| Box::new(std::io::Cursor::new(b)) as Box<dyn AsyncRead + Unpin + Send>)
    }

    fn pid(&self) -> Option<u32> {
        Some(4242)
    }

    async fn wait(&mut self) -> Result<i32, RelayError> {
        self.waits.fetch_add(1, Ordering::SeqCst);
        Ok(self.exit_code)
    }
}

/// Keeps every message and every update it receives.
#[derive(Default)]
pub struct RecordingSink {
    pub messages: Vec<String>,
    pub updates: Vec<(MessageId, String)>,
    pub fail_updates: bool,
}

impl RecordingSink {
    pub fn last_content(&self) -> &str {
        self.messages.last().map(String::as_str).unwrap_or("")
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn send_message(&mut self, content: &str) -> anyhow::Result<MessageId> {
        self.messages.push(content.to_string());
        Ok(MessageId(self.messages.len() as u64 - 1))
    }

    async fn update_message(&mut self, id: MessageId, content: &str) -> anyhow::Result<()> {
        if self.fail_updates {
            anyhow::bail!("message {} is gone", id.0);
        }
        let slot = self
            .messages
            .get_mut(id.0 as usize)
            .ok_or_else(|| anyhow::anyhow!("unknown message {}", id.0))?;
        *slot = content.to_string();
        self.updates.push((id, content.to_string()));
        Ok(())
    }
}
