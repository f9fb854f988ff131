//! Per-command handler implementations
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

pub mod random;

use anyhow::Result;
use std::sync::Arc;

use super::handler::SlashCommandHandler;
use crate::message_components::ButtonRouter;

/// Create all registered command handlers
///
/// Returns a vector of handlers ready to be registered with CommandRegistry.
pub fn create_all_handlers() -> Vec<Arc<dyn SlashCommandHandler>> {
    vec![Arc::new(random::RandomHandler)]
}

/// Map every button the command replies can carry
pub fn map_all_buttons(router: &mut ButtonRouter) -> Result<()> {
    router.map_button(random::REROLL_BUTTON_ID, Arc::new(random::RerollButton))?;
    Ok(())
}
