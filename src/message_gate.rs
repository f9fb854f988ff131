//! # Message Gate
//!
//! Filters incoming chat messages before they reach the event bus. Only
//! messages written by people in the configured guild get through.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

use log::{debug, warn};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::core::spawn_supervised;
use crate::notifications::{EventBus, MessageReceivedEvent};

/// Platform-neutral snapshot of a received chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub id: u64,
    pub author_id: u64,
    pub author_name: String,
    pub author_is_bot: bool,
    /// Guild the message was posted in; `None` for direct messages
    pub guild_id: Option<u64>,
    pub channel_id: u64,
    pub content: String,
}

#[cfg(test)]
impl IncomingMessage {
    pub(crate) fn sample(author_id: u64, author_is_bot: bool, guild_id: Option<u64>) -> Self {
        Self {
            id: 1000 + author_id,
            author_id,
            author_name: format!("user{author_id}"),
            author_is_bot,
            guild_id,
            channel_id: 77,
            content: "hello there".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MessageGate {
    origin_id: u64,
}

impl MessageGate {
    pub fn new(origin_id: u64) -> Self {
        Self { origin_id }
    }

    pub fn origin_id(&self) -> u64 {
        self.origin_id
    }

    /// True iff a human wrote the message inside the configured guild
    pub fn admit(&self, message: &IncomingMessage) -> bool {
        !message.author_is_bot && message.guild_id == Some(self.origin_id)
    }
}

/// Gate plus bus: turns admitted messages into published events
#[derive(Clone)]
pub struct MessagePipeline {
    gate: MessageGate,
    bus: Arc<EventBus>,
}

impl MessagePipeline {
    pub fn new(gate: MessageGate, bus: Arc<EventBus>) -> Self {
        Self { gate, bus }
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Publish the message on a detached task if the gate admits it
    ///
    /// Returns immediately; the handle only matters to callers that want to
    /// wait for the handlers (tests, shutdown).
    pub fn ingest(&self, message: IncomingMessage) -> Option<JoinHandle<()>> {
        if !self.gate.admit(&message) {
            debug!(
                "Gate rejected message {} (bot: {}, guild: {:?})",
                message.id, message.author_is_bot, message.guild_id
            );
            return None;
        }

        let bus = self.bus.clone();
        let label = format!("message {}", message.id);
        Some(spawn_supervised(label, async move {
            let message_id = message.id;
            let report = bus.publish(MessageReceivedEvent { message }).await;
            if !report.is_clean() {
                warn!(
                    "{} of {} handler(s) failed for message {message_id}",
                    report.failed, report.invoked
                );
            }
            Ok(())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::message_log::MessageLogHandler;

    const GUILD: u64 = 4242;

    #[test]
    fn test_admits_human_in_origin() {
        let gate = MessageGate::new(GUILD);
        assert!(gate.admit(&IncomingMessage::sample(1, false, Some(GUILD))));
    }

    #[test]
    fn test_rejects_bot_regardless_of_origin() {
        let gate = MessageGate::new(GUILD);
        assert!(!gate.admit(&IncomingMessage::sample(1, true, Some(GUILD))));
        assert!(!gate.admit(&IncomingMessage::sample(1, true, Some(1))));
        assert!(!gate.admit(&IncomingMessage::sample(1, true, None)));
    }

    #[test]
    fn test_rejects_other_origin() {
        let gate = MessageGate::new(GUILD);
        assert!(!gate.admit(&IncomingMessage::sample(1, false, Some(GUILD + 1))));
    }

    #[test]
    fn test_rejects_direct_messages() {
        let gate = MessageGate::new(GUILD);
        assert!(!gate.admit(&IncomingMessage::sample(1, false, None)));
    }

    fn pipeline_with_log() -> (MessagePipeline, Arc<MessageLogHandler>) {
        let handler = Arc::new(MessageLogHandler::new());
        let mut bus = EventBus::new();
        bus.subscribe::<MessageReceivedEvent>(handler.clone());
        let pipeline = MessagePipeline::new(MessageGate::new(GUILD), Arc::new(bus));
        (pipeline, handler)
    }

    #[tokio::test]
    async fn test_human_message_published_once() {
        let (pipeline, handler) = pipeline_with_log();

        let task = pipeline
            .ingest(IncomingMessage::sample(5, false, Some(GUILD)))
            .expect("message should be admitted");
        task.await.unwrap();

        assert_eq!(pipeline.bus().events_published(), 1);
        assert_eq!(handler.received(), 1);
    }

    #[tokio::test]
    async fn test_bot_message_publishes_nothing() {
        let (pipeline, handler) = pipeline_with_log();

        assert!(pipeline
            .ingest(IncomingMessage::sample(5, true, Some(GUILD)))
            .is_none());

        assert_eq!(pipeline.bus().events_published(), 0);
        assert_eq!(handler.received(), 0);
    }

    #[tokio::test]
    async fn test_many_messages_each_delivered() {
        let (pipeline, handler) = pipeline_with_log();

        let tasks: Vec<_> = (0..20)
            .filter_map(|n| pipeline.ingest(IncomingMessage::sample(n, n % 2 == 0, Some(GUILD))))
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(handler.received(), 10);
        assert_eq!(pipeline.bus().events_published(), 10);
    }
}
