use async_trait::async_trait;

/// Handle for a message previously sent through a [`MessageSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub u64);

/// The chat surface the relay renders into.
///
/// `update_message` replaces the whole content of an existing message.
#[async_trait]
pub trait MessageSink: Send {
    async fn send_message(&mut self, content: &str) -> anyhow::Result<MessageId>;
    async fn update_message(&mut self, id: MessageId, content: &str) -> anyhow::Result<()>;
}
