//! User-visible message texts.
use std::path::Path;

use crate::error::RelayError;

pub const WELCOME: &str = "👋 **Welcome to TriageAgency!**\n\n\
I'm an AI assistant that routes your questions to specialized agents:\n\
- 🔧 **Tech Agent**: Programming, debugging, architecture, DevOps\n\
- ✨ **Creative Agent**: Writing, brainstorming, storytelling, content creation\n\n\
Ask me anything, and I'll automatically route it to the right agent!";

pub const EMPTY_QUERY: &str = "❌ Please provide a query.";

pub fn missing_credential(key: &str, env_file: &Path) -> String {
    let file = env_file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| ".env".to_string());
    format!("❌ **Error**: {key} not found in environment.\n\nPlease set it in the `{file}` file.")
}

pub fn binary_not_found(path: &Path) -> String {
    format!(
        "❌ **Error**: triage binary not found at `{}`.\n\n\
         Please ensure it is installed and the path is correct.",
        path.display()
    )
}

pub fn exit_status(code: i32) -> String {
    format!("\n\n❌ **Error**: CLI exited with code {code}")
}

pub fn runtime(err: &RelayError) -> String {
    format!("❌ **Error**: {err}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_notice_names_key_and_file() {
        let text = missing_credential("OPENROUTER_API_KEY", Path::new("/srv/app/.env.local"));
        assert!(text.contains("OPENROUTER_API_KEY not found"));
        assert!(text.contains("`.env.local`"));
    }

    #[test]
    fn exit_notice_carries_code() {
        assert_eq!(exit_status(2), "\n\n❌ **Error**: CLI exited with code 2");
    }
}
