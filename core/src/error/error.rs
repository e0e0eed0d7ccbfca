use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("relay failed: {0}")]
    Relay(#[from] RelayError),
    #[error("command failed: {0}")]
    Command(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// The failure categories a user can see for one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    EmptyInput,
    MissingCredential,
    BinaryNotFound,
    NonZeroExit,
    Runtime,
}

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("empty query")]
    EmptyQuery,
    #[error("{key} not found in environment")]
    MissingCredential { key: String },
    #[error("binary not found at {}", path.display())]
    BinaryNotFound { path: PathBuf },
    #[error("CLI exited with code {code}")]
    NonZeroExit { code: i32 },
    #[error("invalid env line at {line} in {} (expected KEY=VALUE)", path.display())]
    EnvFile { path: PathBuf, line: usize },
    #[error("config error: {0}")]
    Config(String),
    #[error("spawn failed: {0}")]
    Spawn(String),
    #[error("stream io error: {stream} {source}")]
    StreamIo {
        stream: &'static str,
        source: std::io::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("sink error: {0}")]
    Sink(#[source] anyhow::Error),
}

impl RelayError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::EmptyQuery => FailureKind::EmptyInput,
            Self::MissingCredential { .. } => FailureKind::MissingCredential,
            Self::BinaryNotFound { .. } => FailureKind::BinaryNotFound,
            Self::NonZeroExit { .. } => FailureKind::NonZeroExit,
            Self::EnvFile { .. }
            | Self::Config(_)
            | Self::Spawn(_)
            | Self::StreamIo { .. }
            | Self::Io(_)
            | Self::Sink(_) => FailureKind::Runtime,
        }
    }

    /// Process exit code used by one-shot front-ends.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NonZeroExit { code } => *code,
            Self::EmptyQuery => 2,
            Self::MissingCredential { .. } | Self::EnvFile { .. } | Self::Config(_) => 11,
            Self::BinaryNotFound { .. } | Self::Spawn(_) | Self::StreamIo { .. } | Self::Io(_) => 20,
            Self::Sink(_) => 50,
        }
    }
}
