//! # Feature: Message Log
//!
//! Logs every admitted user message and keeps a running count.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

use anyhow::Result;
use async_trait::async_trait;
use log::info;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::notifications::{EventHandler, MessageReceivedEvent};

#[derive(Default)]
pub struct MessageLogHandler {
    received: AtomicU64,
}

impl MessageLogHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages handled so far
    pub fn received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl EventHandler<MessageReceivedEvent> for MessageLogHandler {
    fn name(&self) -> &'static str {
        "message_log"
    }

    async fn handle(&self, event: &MessageReceivedEvent) -> Result<()> {
        let count = self.received.fetch_add(1, Ordering::Relaxed) + 1;
        let msg = &event.message;
        info!(
            "📨 {} ({}) wrote in channel {} [{} chars, #{count}]",
            msg.author_name,
            msg.author_id,
            msg.channel_id,
            msg.content.chars().count()
        );
        Ok(())
    }
}
