//! # Notifications
//!
//! Decouples "a chat message arrived" from whatever reacts to it.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Static handler table replaces runtime discovery
//! - 1.0.0: Initial event bus

pub mod bus;
pub mod event;
pub mod registry;

pub use bus::{EventBus, EventHandler, HandlerId, PublishReport};
pub use event::{Event, EventTag, MessageReceivedEvent};
pub use registry::{build_event_bus, HandlerRegistration, HANDLER_TABLE};
