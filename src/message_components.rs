//! # Button Routing
//!
//! Maps button custom ids to handlers and dispatches clicks off the gateway
//! task.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

use anyhow::{bail, Result};
use async_trait::async_trait;
use log::{info, warn};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::core::{spawn_supervised, InteractionResponder, Reply};

/// Shown to the user when a button has no registered handler
pub const PROCESSING_ERROR_REPLY: &str = "⚠️ Something went wrong while processing that button.";

/// A single button press
#[derive(Clone)]
pub struct ButtonClick {
    pub custom_id: String,
    pub user_id: u64,
    pub request_id: Uuid,
    pub responder: Arc<dyn InteractionResponder>,
}

#[async_trait]
pub trait ButtonHandler: Send + Sync {
    async fn handle(&self, click: &ButtonClick) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonOutcome {
    Handled,
    Unmapped,
}

/// Route table from button custom id to handler
///
/// Filled before the client starts, then shared read-only.
#[derive(Default)]
pub struct ButtonRouter {
    routes: HashMap<String, Arc<dyn ButtonHandler>>,
}

impl ButtonRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `route`
    ///
    /// The first registration for a route wins: a later one is ignored and
    /// `Ok(false)` is returned. Empty routes are rejected.
    pub fn map_button(
        &mut self,
        route: impl Into<String>,
        handler: Arc<dyn ButtonHandler>,
    ) -> Result<bool> {
        let route = route.into();
        if route.trim().is_empty() {
            bail!("button route cannot be empty");
        }
        if self.routes.contains_key(&route) {
            warn!("Button route '{route}' already mapped, keeping the first handler");
            return Ok(false);
        }
        self.routes.insert(route, handler);
        Ok(true)
    }

    pub fn contains(&self, route: &str) -> bool {
        self.routes.contains_key(route)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Run the handler for this click, or send the ephemeral error reply
    pub async fn route(&self, click: &ButtonClick) -> Result<ButtonOutcome> {
        match self.routes.get(&click.custom_id) {
            Some(handler) => {
                info!(
                    "[{}] Button {} pressed by user {}, invoking handler",
                    click.request_id, click.custom_id, click.user_id
                );
                handler.handle(click).await?;
                Ok(ButtonOutcome::Handled)
            }
            None => {
                warn!(
                    "[{}] No handler for button {} (user {})",
                    click.request_id, click.custom_id, click.user_id
                );
                click
                    .responder
                    .respond(Reply::ephemeral(PROCESSING_ERROR_REPLY))
                    .await?;
                Ok(ButtonOutcome::Unmapped)
            }
        }
    }

    /// Route the click on a supervised background task and return at once
    pub fn dispatch(self: &Arc<Self>, click: ButtonClick) -> JoinHandle<()> {
        let router = Arc::clone(self);
        let label = format!("button {} [{}]", click.custom_id, click.request_id);
        spawn_supervised(label, async move {
            router.route(&click).await?;
            Ok(())
        })
    }
}
