//! # Core Module
//!
//! Configuration, interaction replies and supervised task spawning shared by
//! every other layer of the bot.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Add supervised task spawning
//! - 1.1.0: Add response module with the responder seam
//! - 1.0.0: Initial creation with config module

pub mod config;
pub mod response;
pub mod tasks;

// Re-export commonly used items
pub use config::{BotMode, BotSettings, ConfigError};
pub use response::{truncate_for_message, InteractionResponder, Reply, ReplyButton, MESSAGE_LIMIT};
pub use tasks::spawn_supervised;
