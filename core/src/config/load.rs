use std::path::{Path, PathBuf};

use super::types::AppConfig;

/// Get the default data directory: ~/.triage
pub fn get_triage_data_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(PathBuf::from(home).join(".triage"))
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    // Priority 1: ~/.triage/config.toml (highest)
    let user_config = get_triage_data_dir()?.join("config.toml");

    // Priority 2: ./triage.toml (current directory)
    let local_config = Path::new("triage.toml");

    let mut cfg = if user_config.exists() {
        read_config(&user_config)?
    } else if local_config.exists() {
        read_config(local_config)?
    } else {
        AppConfig::default()
    };

    apply_env_overrides(&mut cfg, |k| std::env::var(k).ok());
    Ok(cfg)
}

/// Load an explicit config file; a missing file is an error here.
pub fn load_from(path: &Path) -> anyhow::Result<AppConfig> {
    let mut cfg = read_config(path)?;
    apply_env_overrides(&mut cfg, |k| std::env::var(k).ok());
    Ok(cfg)
}

fn read_config(path: &Path) -> anyhow::Result<AppConfig> {
    let s = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    toml::from_str::<AppConfig>(&s)
        .map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", path.display()))
}

/// Environment variable overrides (Priority 0: highest). Empty values are ignored.
pub fn apply_env_overrides<F>(cfg: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());

    if let Some(v) = non_empty("TRIAGE_BIN") {
        cfg.relay.binary = v;
    }
    if let Some(v) = non_empty("TRIAGE_PROJECT_ROOT") {
        cfg.relay.project_root = Some(v);
    }
    if let Some(v) = non_empty("TRIAGE_ENV_FILE") {
        cfg.relay.env_file = v;
    }
}
