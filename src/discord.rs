//! serenity adapters
//!
//! Converts gateway payloads into the platform-neutral types used by the
//! rest of the crate and implements [`InteractionResponder`] on top of the
//! Discord interaction endpoints.

use anyhow::Result;
use async_trait::async_trait;
use serenity::builder::CreateInteractionResponse;
use serenity::http::Http;
use serenity::model::application::component::ButtonStyle;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::model::channel::Message;
use serenity::prelude::Context;
use std::sync::Arc;
use uuid::Uuid;

use crate::commands::CommandInvocation;
use crate::core::{InteractionResponder, Reply};
use crate::message_components::ButtonClick;
use crate::message_gate::IncomingMessage;

impl From<&Message> for IncomingMessage {
    fn from(msg: &Message) -> Self {
        IncomingMessage {
            id: msg.id.0,
            author_id: msg.author.id.0,
            author_name: msg.author.name.clone(),
            author_is_bot: msg.author.bot,
            guild_id: msg.guild_id.map(|g| g.0),
            channel_id: msg.channel_id.0,
            content: msg.content.clone(),
        }
    }
}

/// Fill an interaction response from a [`Reply`]
fn apply_reply<'a, 'b>(
    response: &'a mut CreateInteractionResponse<'b>,
    reply: &Reply,
) -> &'a mut CreateInteractionResponse<'b> {
    response
        .kind(InteractionResponseType::ChannelMessageWithSource)
        .interaction_response_data(|data| {
            data.content(&reply.content).ephemeral(reply.ephemeral);
            if !reply.buttons.is_empty() {
                data.components(|components| {
                    components.create_action_row(|row| {
                        for button in &reply.buttons {
                            row.create_button(|btn| {
                                btn.custom_id(&button.custom_id)
                                    .label(&button.label)
                                    .style(ButtonStyle::Primary)
                            });
                        }
                        row
                    })
                });
            }
            data
        })
}

/// Responder for slash command interactions
pub struct CommandResponder {
    http: Arc<Http>,
    interaction: ApplicationCommandInteraction,
}

#[async_trait]
impl InteractionResponder for CommandResponder {
    async fn respond(&self, reply: Reply) -> Result<()> {
        self.interaction
            .create_interaction_response(&self.http, |response| apply_reply(response, &reply))
            .await?;
        Ok(())
    }

    async fn delete_original_response(&self) -> Result<()> {
        self.interaction
            .delete_original_interaction_response(&self.http)
            .await?;
        Ok(())
    }
}

/// Responder for button and other component interactions
pub struct ComponentResponder {
    http: Arc<Http>,
    interaction: MessageComponentInteraction,
}

#[async_trait]
impl InteractionResponder for ComponentResponder {
    async fn respond(&self, reply: Reply) -> Result<()> {
        self.interaction
            .create_interaction_response(&self.http, |response| apply_reply(response, &reply))
            .await?;
        Ok(())
    }

    async fn delete_original_response(&self) -> Result<()> {
        self.interaction
            .delete_original_interaction_response(&self.http)
            .await?;
        Ok(())
    }
}

pub fn command_invocation(
    ctx: &Context,
    command: ApplicationCommandInteraction,
    request_id: Uuid,
) -> CommandInvocation {
    CommandInvocation {
        name: command.data.name.clone(),
        user_id: command.user.id.0,
        request_id,
        responder: Arc::new(CommandResponder {
            http: ctx.http.clone(),
            interaction: command,
        }),
    }
}

pub fn button_click(
    ctx: &Context,
    component: MessageComponentInteraction,
    request_id: Uuid,
) -> ButtonClick {
    ButtonClick {
        custom_id: component.data.custom_id.clone(),
        user_id: component.user.id.0,
        request_id,
        responder: Arc::new(ComponentResponder {
            http: ctx.http.clone(),
            interaction: component,
        }),
    }
}
