use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use triage_core::api::{MessageId, MessageSink};

/// Sink calls, forwarded to the UI loop in the order they were made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    Message { id: MessageId, content: String },
    Update { id: MessageId, content: String },
}

/// `MessageSink` that feeds the chat UI through an unbounded channel.
///
/// Sinks built from the same counter hand out unique ids, so several queries
/// over one session never collide.
#[derive(Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ChatEvent>,
    ids: Arc<AtomicU64>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<ChatEvent>, ids: Arc<AtomicU64>) -> Self {
        Self { tx, ids }
    }

    fn forward(&self, event: ChatEvent) -> anyhow::Result<()> {
        self.tx
            .send(event)
            .map_err(|_| anyhow::anyhow!("chat window closed"))
    }
}

#[async_trait]
impl MessageSink for ChannelSink {
    async fn send_message(&mut self, content: &str) -> anyhow::Result<MessageId> {
        let id = MessageId(self.ids.fetch_add(1, Ordering::Relaxed));
        self.forward(ChatEvent::Message {
            id,
            content: content.to_string(),
        })?;
        Ok(id)
    }

    async fn update_message(&mut self, id: MessageId, content: &str) -> anyhow::Result<()> {
        self.forward(ChatEvent::Update {
            id,
            content: content.to_string(),
        })
    }
}
