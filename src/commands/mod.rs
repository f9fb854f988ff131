//! # Command System
//!
//! Slash command (/) handling for Discord interactions.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod handler;
pub mod handlers;
pub mod registry;
pub mod slash;

// Re-export handler infrastructure
pub use handler::{CommandInvocation, SlashCommandHandler};
pub use registry::{log_command_result, CommandFailure, CommandRegistry};

pub use slash::{create_slash_commands, register_global_commands, register_guild_commands};

/// Registry holding every built-in command handler
pub fn default_registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    for handler in handlers::create_all_handlers() {
        registry.register(handler);
    }
    registry
}
