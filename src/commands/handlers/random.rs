//! Random digit command handler
//!
//! Handles: random, plus the "Roll again" button attached to its reply
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Add reroll button
//! - 1.0.0: Initial /random command

use anyhow::Result;
use async_trait::async_trait;
use log::info;
use rand::Rng;

use crate::commands::handler::{CommandInvocation, SlashCommandHandler};
use crate::core::Reply;
use crate::message_components::{ButtonClick, ButtonHandler};

/// Custom id of the button under each roll
pub const REROLL_BUTTON_ID: &str = "random_reroll";

/// Uniform digit in `0..=9`
pub fn roll_digit<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    rng.random_range(0..=9)
}

/// Public reply announcing `digit`, with a button to roll again
pub fn roll_reply(digit: u8) -> Reply {
    Reply::text(format!("🎲 Rolled a {digit}")).with_button(REROLL_BUTTON_ID, "Roll again")
}

/// Handler for /random
pub struct RandomHandler;

#[async_trait]
impl SlashCommandHandler for RandomHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["random"]
    }

    async fn handle(&self, invocation: &CommandInvocation) -> Result<()> {
        let digit = roll_digit(&mut rand::rng());
        invocation.responder.respond(roll_reply(digit)).await?;

        info!(
            "[{}] Rolled {digit} for user {}",
            invocation.request_id, invocation.user_id
        );
        Ok(())
    }
}

/// Handler for the reroll button
pub struct RerollButton;

#[async_trait]
impl ButtonHandler for RerollButton {
    async fn handle(&self, click: &ButtonClick) -> Result<()> {
        let digit = roll_digit(&mut rand::rng());
        click.responder.respond(roll_reply(digit)).await?;

        info!(
            "[{}] Rerolled {digit} for user {}",
            click.request_id, click.user_id
        );
        Ok(())
    }
}
