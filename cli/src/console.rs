//! Line-oriented rendering of relay messages for plain terminals and pipes.
use std::io::Write;

use async_trait::async_trait;
use serde::Serialize;
use triage_core::api::{MessageId, MessageSink};

use crate::commands::cli::OutputFormat;

const REPRINT_SEPARATOR: &str = "\n----\n";

/// Renders sink calls onto a writer.
///
/// Text mode appends only the new suffix while an update extends what is
/// already on screen, and reprints the whole message otherwise (the decision
/// prefix reshapes the message once it appears). Jsonl mode writes one object
/// per call.
pub struct ConsoleSink<W: Write + Send> {
    out: W,
    format: OutputFormat,
    next_id: u64,
    current: Option<MessageId>,
    printed: String,
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    ts: String,
    event: &'static str,
    id: u64,
    content: &'a str,
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self {
            out,
            format,
            next_id: 1,
            current: None,
            printed: String::new(),
        }
    }

    /// Terminate the current text message with a newline if it lacks one.
    pub fn finish(&mut self) -> std::io::Result<()> {
        if self.format == OutputFormat::Text && !self.printed.is_empty() && !self.printed.ends_with('\n')
        {
            self.out.write_all(b"\n")?;
            self.printed.push('\n');
        }
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_json(&mut self, event: &'static str, id: MessageId, content: &str) -> anyhow::Result<()> {
        let record = JsonRecord {
            ts: chrono::Utc::now().to_rfc3339(),
            event,
            id: id.0,
            content,
        };
        serde_json::to_writer(&mut self.out, &record)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}

#[async_trait]
impl<W: Write + Send> MessageSink for ConsoleSink<W> {
    async fn send_message(&mut self, content: &str) -> anyhow::Result<MessageId> {
        let id = MessageId(self.next_id);
        self.next_id += 1;

        match self.format {
            OutputFormat::Jsonl => self.write_json("message", id, content)?,
            OutputFormat::Text => {
                self.finish()?;
                if self.current.is_some() {
                    self.out.write_all(b"\n")?;
                }
                self.out.write_all(content.as_bytes())?;
                self.out.flush()?;
                self.printed = content.to_string();
            }
        }
        self.current = Some(id);
        Ok(id)
    }

    async fn update_message(&mut self, id: MessageId, content: &str) -> anyhow::Result<()> {
        if self.format == OutputFormat::Jsonl {
            return self.write_json("update", id, content);
        }
        if self.current != Some(id) {
            anyhow::bail!("message {} is no longer on screen", id.0);
        }

        match content.strip_prefix(self.printed.as_str()) {
            Some(suffix) => self.out.write_all(suffix.as_bytes())?,
            None => {
                self.out.write_all(REPRINT_SEPARATOR.as_bytes())?;
                self.out.write_all(content.as_bytes())?;
            }
        }
        self.out.flush()?;
        self.printed = content.to_string();
        Ok(())
    }
}
