use super::logging_models::MessageSnapshot;
use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;

/// Snapshots kept before the oldest-looking entry is evicted.
pub const MAX_TRACKED_MESSAGES: usize = 10_000;

/// Per-guild server settings. The log channel is the only setting so far.
#[async_trait]
pub trait ServerSettingsStore: Send + Sync {
    async fn get_log_channel(&self, guild_id: u64) -> Result<Option<u64>>;
    async fn set_log_channel(&self, guild_id: u64, channel_id: u64) -> Result<()>;
}

pub struct LoggingService<S: ServerSettingsStore> {
    store: S,
    messages: DashMap<u64, MessageSnapshot>,
}

impl<S: ServerSettingsStore> LoggingService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            messages: DashMap::new(),
        }
    }

    /// Looked up on every event; nothing is cached in-process.
    pub async fn log_channel(&self, guild_id: u64) -> Result<Option<u64>> {
        self.store.get_log_channel(guild_id).await
    }

    pub async fn set_log_channel(&self, guild_id: u64, channel_id: u64) -> Result<()> {
        self.store.set_log_channel(guild_id, channel_id).await?;
        tracing::info!(guild_id, channel_id, "Log channel updated");
        Ok(())
    }

    pub fn remember_message(&self, snapshot: MessageSnapshot) {
        self.messages.insert(snapshot.message_id, snapshot);

        // Snowflakes grow with time, so the smallest id is the oldest message.
        if self.messages.len() > MAX_TRACKED_MESSAGES {
            if let Some(oldest) = self.messages.iter().map(|e| *e.key()).min() {
                self.messages.remove(&oldest);
            }
        }
    }

    pub fn snapshot(&self, message_id: u64) -> Option<MessageSnapshot> {
        self.messages.get(&message_id).map(|m| m.clone())
    }

    /// Record an edit. Returns the content from before the edit.
    pub fn update_content(&self, message_id: u64, content: &str) -> Option<String> {
        self.messages
            .get_mut(&message_id)
            .map(|mut m| std::mem::replace(&mut m.content, content.to_string()))
    }

    /// Remove and return a snapshot (used for deletes).
    pub fn take_snapshot(&self, message_id: u64) -> Option<MessageSnapshot> {
        self.messages.remove(&message_id).map(|(_, m)| m)
    }
}
