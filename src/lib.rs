// Core layer - settings, replies, supervised tasks
pub mod core;

// Notification layer - event bus and startup handler table
pub mod notifications;

// Features layer - event handlers
pub mod features;

// Ingestion and routing
pub mod message_components;
pub mod message_gate;

// Application layer
pub mod commands;

// Platform glue
pub mod bot;
pub mod discord;

pub use bot::{BotController, Lifecycle, LifecycleState};
pub use crate::core::{BotMode, BotSettings, ConfigError};
pub use message_components::{ButtonClick, ButtonHandler, ButtonOutcome, ButtonRouter};
pub use message_gate::{IncomingMessage, MessageGate, MessagePipeline};
pub use notifications::{Event, EventBus, EventHandler, MessageReceivedEvent};
