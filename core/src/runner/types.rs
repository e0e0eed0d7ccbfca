use std::collections::HashMap;
use std::path::PathBuf;

/// Everything needed to start one child for one query.
#[derive(Debug, Clone)]
pub struct LaunchSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// The complete child environment; nothing else is inherited.
    pub envs: HashMap<String, String>,
    pub cwd: PathBuf,
}
