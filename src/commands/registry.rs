//! Command handler registry
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Execute invocations and classify failures by reason code
//! - 1.0.0: Initial implementation for handler dispatch

use log::{error, info};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use super::handler::{CommandInvocation, SlashCommandHandler};

/// Why a command invocation did not succeed
///
/// Handlers may return one of the argument-level variants through
/// `anyhow::Error`; any other error becomes [`CommandFailure::Exception`].
#[derive(Debug, Error)]
pub enum CommandFailure {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("bad arguments: {0}")]
    BadArgs(String),

    #[error("argument conversion failed: {0}")]
    ConvertFailed(String),

    #[error("failed to parse command input: {0}")]
    ParseFailed(String),

    #[error("precondition not met: {0}")]
    UnmetPrecondition(String),

    #[error("command was unsuccessful: {0}")]
    Unsuccessful(String),

    #[error("command raised an error: {0:#}")]
    Exception(anyhow::Error),

    #[error("command timed out after {0:?}")]
    TimedOut(Duration),
}

impl CommandFailure {
    /// Stable identifier used in logs
    pub fn reason_code(&self) -> &'static str {
        match self {
            CommandFailure::UnknownCommand(_) => "unknown_command",
            CommandFailure::BadArgs(_) => "bad_args",
            CommandFailure::ConvertFailed(_) => "convert_failed",
            CommandFailure::ParseFailed(_) => "parse_failed",
            CommandFailure::UnmetPrecondition(_) => "unmet_precondition",
            CommandFailure::Unsuccessful(_) => "unsuccessful",
            CommandFailure::Exception(_) => "exception",
            CommandFailure::TimedOut(_) => "timed_out",
        }
    }

    /// Faults raised while running the command, as opposed to rejections
    pub fn is_execution_fault(&self) -> bool {
        matches!(
            self,
            CommandFailure::Exception(_) | CommandFailure::TimedOut(_)
        )
    }

    fn from_handler_error(err: anyhow::Error) -> Self {
        match err.downcast::<CommandFailure>() {
            Ok(failure) => failure,
            Err(other) => CommandFailure::Exception(other),
        }
    }
}

/// Log the outcome of an executed command
pub fn log_command_result(invocation: &CommandInvocation, result: &Result<(), CommandFailure>) {
    match result {
        Ok(()) => info!(
            "[{}] /{} completed for user {}",
            invocation.request_id, invocation.name, invocation.user_id
        ),
        Err(failure) => error!(
            "[{}] /{} failed ({}): {failure}",
            invocation.request_id,
            invocation.name,
            failure.reason_code()
        ),
    }
}

/// Registry mapping command names to handlers
///
/// The registry allows handlers to be registered and looked up by command name.
/// Multiple command names can map to the same handler if they share logic.
#[derive(Clone)]
pub struct CommandRegistry {
    handlers: HashMap<&'static str, Arc<dyn SlashCommandHandler>>,
}

impl CommandRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler for its declared command names
    pub fn register(&mut self, handler: Arc<dyn SlashCommandHandler>) {
        for name in handler.command_names() {
            self.handlers.insert(name, Arc::clone(&handler));
        }
    }

    /// Get handler for a command name
    pub fn get(&self, name: &str) -> Option<Arc<dyn SlashCommandHandler>> {
        self.handlers.get(name).cloned()
    }

    /// Check if a command is registered
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Number of registered command names
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run the handler registered for `invocation.name`
    pub async fn execute(&self, invocation: &CommandInvocation) -> Result<(), CommandFailure> {
        let handler = self
            .get(&invocation.name)
            .ok_or_else(|| CommandFailure::UnknownCommand(invocation.name.clone()))?;

        handler
            .handle(invocation)
            .await
            .map_err(CommandFailure::from_handler_error)
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
