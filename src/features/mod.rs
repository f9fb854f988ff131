//! # Features
//!
//! Reactions to bus events, one module per feature.

pub mod message_log;

pub use message_log::MessageLogHandler;
