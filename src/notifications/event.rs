//! Event values and their canonical type tags

use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::message_gate::IncomingMessage;

/// Marker for values that can travel over the [`EventBus`](super::EventBus)
///
/// Events are immutable once published and shared by reference with every
/// handler, so they must be `Send + Sync + 'static`.
pub trait Event: Send + Sync + 'static {}

/// Canonical identity of an event type, used for both subscribe and publish
#[derive(Clone, Copy)]
pub struct EventTag {
    id: TypeId,
    name: &'static str,
}

impl EventTag {
    pub fn of<E: Event>() -> Self {
        Self {
            id: TypeId::of::<E>(),
            name: type_name::<E>(),
        }
    }

    /// Short type name without the module path
    pub fn name(&self) -> &'static str {
        self.name.rsplit("::").next().unwrap_or(self.name)
    }
}

impl PartialEq for EventTag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EventTag {}

impl Hash for EventTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for EventTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for EventTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A user message passed the gate for the configured guild
#[derive(Debug, Clone)]
pub struct MessageReceivedEvent {
    pub message: IncomingMessage,
}

impl Event for MessageReceivedEvent {}

#[cfg(test)]
mod tests {
    use super::*;

    struct Other;
    impl Event for Other {}

    #[test]
    fn test_tag_identity_by_type() {
        assert_eq!(
            EventTag::of::<MessageReceivedEvent>(),
            EventTag::of::<MessageReceivedEvent>()
        );
        assert_ne!(EventTag::of::<MessageReceivedEvent>(), EventTag::of::<Other>());
    }

    #[test]
    fn test_tag_short_name() {
        assert_eq!(EventTag::of::<MessageReceivedEvent>().name(), "MessageReceivedEvent");
        assert_eq!(EventTag::of::<Other>().to_string(), "Other");
    }
}
