//! Startup handler table
//!
//! Every event handler the bot ships with is listed here once. The bus is
//! built from this table before the gateway connects and never changes
//! afterwards.

use log::info;
use std::sync::Arc;

use super::bus::{EventBus, HandlerId};
use super::event::MessageReceivedEvent;
use crate::features::message_log::MessageLogHandler;

/// A named installer that subscribes one handler to the bus
pub struct HandlerRegistration {
    pub name: &'static str,
    pub install: fn(&mut EventBus) -> HandlerId,
}

/// Handlers installed at startup, in invocation order per event type
pub static HANDLER_TABLE: &[HandlerRegistration] = &[HandlerRegistration {
    name: "message_log",
    install: install_message_log,
}];

fn install_message_log(bus: &mut EventBus) -> HandlerId {
    bus.subscribe::<MessageReceivedEvent>(Arc::new(MessageLogHandler::new()))
}

/// Build a bus with every handler from [`HANDLER_TABLE`]
pub fn build_event_bus() -> EventBus {
    install_handlers(HANDLER_TABLE)
}

/// Build a bus from an arbitrary table, installing each entry exactly once
pub fn install_handlers(table: &[HandlerRegistration]) -> EventBus {
    let mut bus = EventBus::new();
    for registration in table {
        let id = (registration.install)(&mut bus);
        info!("🔔 Registered event handler {} ({id})", registration.name);
    }
    bus
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::event::Event;

    struct Unused;
    impl Event for Unused {}

    #[test]
    fn test_default_table_installs_message_log() {
        let bus = build_event_bus();
        assert_eq!(bus.handler_count::<MessageReceivedEvent>(), 1);
        assert_eq!(
            bus.handler_names::<MessageReceivedEvent>(),
            vec!["message_log"]
        );
        assert_eq!(bus.handler_count::<Unused>(), 0);
    }

    #[test]
    fn test_table_entries_installed_once_in_order() {
        let table = [
            HandlerRegistration {
                name: "first",
                install: install_message_log,
            },
            HandlerRegistration {
                name: "second",
                install: install_message_log,
            },
        ];
        let bus = install_handlers(&table);
        assert_eq!(bus.handler_count::<MessageReceivedEvent>(), 2);
    }

    #[test]
    fn test_empty_table() {
        assert!(install_handlers(&[]).is_empty());
    }
}
