use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Jsonl,
}

#[derive(Parser, Debug)]
#[command(name = "triage", version, about = "Chat front-end for the TriageAgency CLI")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Explicit config file; skips the ~/.triage/config.toml and ./triage.toml lookup.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Path to the triage binary.
    #[arg(long = "bin", global = true)]
    pub bin: Option<String>,

    /// Working directory for the triage binary; its `.env` is read from here.
    #[arg(long, global = true)]
    pub project_root: Option<String>,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct ChatArgs {
    /// Use the line-based console chat even on a capable terminal.
    #[arg(long)]
    pub no_tui: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct AskArgs {
    /// Query text; multiple words are joined with spaces.
    #[arg(required = true, trailing_var_arg = true)]
    pub query: Vec<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl AskArgs {
    pub fn query_text(&self) -> String {
        self.query.join(" ")
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive chat (default).
    Chat(ChatArgs),
    /// Relay a single query and exit with its status.
    Ask(AskArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_invocation_has_no_subcommand() {
        let args = Args::try_parse_from(["triage"]).unwrap();
        assert!(args.command.is_none());
        assert!(args.bin.is_none());
    }

    #[test]
    fn ask_joins_words_and_accepts_global_flags() {
        let args = Args::try_parse_from([
            "triage",
            "ask",
            "--format",
            "jsonl",
            "--bin",
            "/opt/gleam",
            "is",
            "rust",
            "fast?",
        ])
        .unwrap();
        assert_eq!(args.bin.as_deref(), Some("/opt/gleam"));
        match args.command {
            Some(Commands::Ask(ask)) => {
                assert_eq!(ask.query_text(), "is rust fast?");
                assert_eq!(ask.format, OutputFormat::Jsonl);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn chat_accepts_no_tui() {
        let args = Args::try_parse_from(["triage", "chat", "--no-tui"]).unwrap();
        assert!(matches!(args.command, Some(Commands::Chat(ChatArgs { no_tui: true }))));
    }
}
