//! # Event Bus
//!
//! In-process publish/subscribe keyed by [`EventTag`]. The subscription table is
//! filled at startup and then shared read-only behind an `Arc`, so publishing
//! needs no locking.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.2.0: Handler panics are contained like errors
//! - 1.1.0: Per-handler failure isolation, removal by handler id
//! - 1.0.0: Sequential publish in registration order

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::FutureExt;
use log::{debug, error, info};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::event::{Event, EventTag};
use crate::core::tasks::panic_message;

/// Asynchronously reacts to events of type `E`
#[async_trait]
pub trait EventHandler<E: Event>: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    async fn handle(&self, event: &E) -> Result<()>;
}

/// Identity of one subscription, returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handler#{}", self.0)
    }
}

/// Outcome of a single publish call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Handlers that were invoked
    pub invoked: usize,
    /// Handlers among them that returned an error
    pub failed: usize,
}

impl PublishReport {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

#[async_trait]
trait ErasedHandler: Send + Sync {
    async fn invoke(&self, event: &(dyn Any + Send + Sync)) -> Result<()>;
}

struct Typed<E: Event> {
    handler: Arc<dyn EventHandler<E>>,
}

#[async_trait]
impl<E: Event> ErasedHandler for Typed<E> {
    async fn invoke(&self, event: &(dyn Any + Send + Sync)) -> Result<()> {
        let event = event
            .downcast_ref::<E>()
            .ok_or_else(|| anyhow!("event delivered under the wrong tag"))?;
        self.handler.handle(event).await
    }
}

struct Subscriber {
    id: HandlerId,
    name: &'static str,
    handler: Arc<dyn ErasedHandler>,
}

#[derive(Default)]
pub struct EventBus {
    subscribers: HashMap<EventTag, Vec<Subscriber>>,
    next_id: u64,
    events_published: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for events of type `E`
    ///
    /// Handlers for the same type accumulate and run in registration order.
    pub fn subscribe<E: Event>(&mut self, handler: Arc<dyn EventHandler<E>>) -> HandlerId {
        let tag = EventTag::of::<E>();
        let id = HandlerId(self.next_id);
        self.next_id += 1;

        let name = handler.name();
        self.subscribers.entry(tag).or_default().push(Subscriber {
            id,
            name,
            handler: Arc::new(Typed { handler }),
        });

        debug!("Subscribed {name} ({id}) to {tag}");
        id
    }

    /// Remove exactly one subscription; false if the id is unknown
    pub fn unsubscribe(&mut self, id: HandlerId) -> bool {
        let mut removed = false;
        self.subscribers.retain(|tag, subs| {
            if let Some(pos) = subs.iter().position(|s| s.id == id) {
                let sub = subs.remove(pos);
                debug!("Unsubscribed {} ({id}) from {tag}", sub.name);
                removed = true;
            }
            !subs.is_empty()
        });
        removed
    }

    /// Remove every subscription for `E`, returning how many were dropped
    pub fn unsubscribe_all<E: Event>(&mut self) -> usize {
        let tag = EventTag::of::<E>();
        let count = self.subscribers.remove(&tag).map_or(0, |subs| subs.len());
        if count > 0 {
            info!("Removed all {count} handler(s) for {tag}");
        }
        count
    }

    pub fn handler_count<E: Event>(&self) -> usize {
        self.subscribers
            .get(&EventTag::of::<E>())
            .map_or(0, |subs| subs.len())
    }

    /// Handler names for `E` in invocation order
    pub fn handler_names<E: Event>(&self) -> Vec<&'static str> {
        self.subscribers
            .get(&EventTag::of::<E>())
            .map(|subs| subs.iter().map(|s| s.name).collect())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Total publish calls, including ones nobody was listening to
    pub fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }

    /// Deliver `event` to each handler for its type, one after another
    ///
    /// A handler error or panic is logged and does not stop later handlers. Publishing
    /// a type nobody subscribed to is a successful no-op.
    pub async fn publish<E: Event>(&self, event: E) -> PublishReport {
        let tag = EventTag::of::<E>();
        let mut report = PublishReport::default();
        self.events_published.fetch_add(1, Ordering::Relaxed);

        let Some(subs) = self.subscribers.get(&tag) else {
            debug!("No handlers for {tag}");
            return report;
        };

        for sub in subs {
            report.invoked += 1;
            match AssertUnwindSafe(sub.handler.invoke(&event))
                .catch_unwind()
                .await
            {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    report.failed += 1;
                    error!("Handler {} ({}) failed on {tag}: {e:#}", sub.name, sub.id);
                }
                Err(payload) => {
                    report.failed += 1;
                    error!(
                        "Handler {} ({}) panicked on {tag}: {}",
                        sub.name,
                        sub.id,
                        panic_message(payload.as_ref())
                    );
                }
            }
        }

        debug!(
            "Published {tag} to {} handler(s), {} failed",
            report.invoked, report.failed
        );
        report
    }
}
