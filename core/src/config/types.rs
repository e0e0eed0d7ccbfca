use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub relay: RelayConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub tui: TuiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Path to the triage executable. `~` is expanded.
    #[serde(default = "default_binary")]
    pub binary: String,

    /// Working directory for the child. Empty or unset means the current directory.
    #[serde(default)]
    pub project_root: Option<String>,

    /// KEY=VALUE file, relative to `project_root` unless absolute.
    #[serde(default = "default_env_file")]
    pub env_file: String,

    /// Credential that must be present in the resolved environment.
    #[serde(default = "default_required_key")]
    pub required_key: String,

    #[serde(default = "default_decision_marker")]
    pub decision_marker: String,

    /// Arguments placed before `--query <q> --stream <bool>`.
    #[serde(default = "default_command_prefix")]
    pub command_prefix: Vec<String>,

    #[serde(default = "default_stream")]
    pub stream: bool,

    #[serde(default = "default_line_channel_capacity")]
    pub line_channel_capacity: usize,
}

fn default_binary() -> String {
    "~/.local/bin/gleam".to_string()
}

fn default_env_file() -> String {
    ".env".to_string()
}

fn default_required_key() -> String {
    "OPENROUTER_API_KEY".to_string()
}

fn default_decision_marker() -> String {
    "🤖 Triage decision:".to_string()
}

fn default_command_prefix() -> Vec<String> {
    vec!["run".to_string(), "--".to_string()]
}

fn default_stream() -> bool {
    true
}

fn default_line_channel_capacity() -> usize {
    1024
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            project_root: None,
            env_file: default_env_file(),
            required_key: default_required_key(),
            decision_marker: default_decision_marker(),
            command_prefix: default_command_prefix(),
            stream: default_stream(),
            line_channel_capacity: default_line_channel_capacity(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr. Ignored while the full-screen TUI is active.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default = "default_logging_file")]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "triage_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_file() -> bool {
    true
}

fn default_logging_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: default_logging_file(),
            level: default_logging_level(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuiConfig {
    #[serde(default = "default_tui_enabled")]
    pub enabled: bool,

    #[serde(default = "default_update_interval_ms")]
    pub update_interval_ms: u64,

    /// Oldest messages are dropped past this count.
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,

    #[serde(default = "default_auto_scroll")]
    pub auto_scroll: bool,
}

fn default_tui_enabled() -> bool {
    true
}

fn default_update_interval_ms() -> u64 {
    50
}

fn default_max_messages() -> usize {
    500
}

fn default_auto_scroll() -> bool {
    true
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            enabled: default_tui_enabled(),
            update_interval_ms: default_update_interval_ms(),
            max_messages: default_max_messages(),
            auto_scroll: default_auto_scroll(),
        }
    }
}
