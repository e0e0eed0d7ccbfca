use async_trait::async_trait;
use tokio::io::AsyncRead;

use crate::error::RelayError;

use super::types::LaunchSpec;

#[async_trait]
pub trait RunnerSession: Send {
    /// Hands out the stdout pipe once; later calls return `None`.
    ///
    /// A session that merges stderr into stdout returns the combined pipe here
    /// and `None` from [`RunnerSession::stderr`].
    fn stdout(&mut self) -> Option<Box<dyn AsyncRead + Unpin + Send>>;
    /// Hands out the stderr pipe once; later calls return `None`.
    fn stderr(&mut self) -> Option<Box<dyn AsyncRead + Unpin + Send>>;
    fn pid(&self) -> Option<u32> {
        None
    }
    /// Waits for exit and returns the normalised exit code.
    async fn wait(&mut self) -> Result<i32, RelayError>;
}

#[async_trait]
pub trait RunnerPlugin: Send + Sync {
    fn name(&self) -> &str;
    async fn start_session(&self, spec: &LaunchSpec) -> Result<Box<dyn RunnerSession>, RelayError>;
}
