//! Session environment: the ambient process environment overlaid with an optional
//! `KEY=VALUE` file from the project root.
use std::collections::HashMap;
use std::path::Path;

use crate::error::RelayError;

/// Parse one env-file line.
///
/// Returns `None` for blank lines, `#` comments and lines that are not `KEY=VALUE`.
/// The line is split on the first `=` and both sides are trimmed. No quoting or
/// escaping is applied.
pub fn parse_env_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (k, v) = line.split_once('=')?;
    let key = k.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), v.trim().to_string()))
}

fn is_skippable(line: &str) -> bool {
    let line = line.trim();
    line.is_empty() || line.starts_with('#')
}

/// Read every pair from `path`, in file order. A missing file yields no pairs.
pub fn parse_env_file(path: &Path) -> Result<Vec<(String, String)>, RelayError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "env file absent");
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)?;
    let mut out = Vec::new();

    for (idx, raw_line) in content.lines().enumerate() {
        if is_skippable(raw_line) {
            continue;
        }
        let pair = parse_env_line(raw_line).ok_or_else(|| RelayError::EnvFile {
            path: path.to_path_buf(),
            line: idx + 1,
        })?;
        out.push(pair);
    }

    Ok(out)
}

/// Copy `ambient`, then overlay the pairs from `env_file`; file values win.
pub fn resolve_session_env<I>(
    ambient: I,
    env_file: &Path,
) -> Result<HashMap<String, String>, RelayError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut env: HashMap<String, String> = ambient.into_iter().collect();
    let file_envs = parse_env_file(env_file)?;
    let overlaid = file_envs.len();
    for (k, v) in file_envs {
        env.insert(k, v);
    }
    tracing::debug!(
        path = %env_file.display(),
        overlaid,
        total = env.len(),
        "session env resolved"
    );
    Ok(env)
}
