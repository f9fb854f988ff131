//! Interaction replies and the responder seam
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Platform-neutral `Reply` and `InteractionResponder` trait
//! - 1.0.0: Message length limits

use anyhow::Result;
use async_trait::async_trait;

/// Discord message content limit
pub const MESSAGE_LIMIT: usize = 2000;
/// Discord allows at most five buttons in one action row
pub const MAX_BUTTONS_PER_ROW: usize = 5;

/// A clickable button attached to a reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyButton {
    pub custom_id: String,
    pub label: String,
}

/// Platform-neutral interaction response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub content: String,
    pub ephemeral: bool,
    pub buttons: Vec<ReplyButton>,
}

impl Reply {
    /// Public reply visible to the whole channel
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: truncate_for_message(&content.into()),
            ephemeral: false,
            buttons: Vec::new(),
        }
    }

    /// Reply only the invoking user can see
    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            ephemeral: true,
            ..Self::text(content)
        }
    }

    /// Attach a button; anything past the first row is dropped
    pub fn with_button(mut self, custom_id: impl Into<String>, label: impl Into<String>) -> Self {
        if self.buttons.len() < MAX_BUTTONS_PER_ROW {
            self.buttons.push(ReplyButton {
                custom_id: custom_id.into(),
                label: label.into(),
            });
        }
        self
    }
}

/// The platform's reply primitive for a single interaction
///
/// Implemented by the serenity adapters in [`crate::discord`] and by
/// recording fakes in tests.
#[async_trait]
pub trait InteractionResponder: Send + Sync {
    /// Send the initial response to the interaction
    async fn respond(&self, reply: Reply) -> Result<()>;

    /// Delete the original response, if one was sent
    async fn delete_original_response(&self) -> Result<()>;
}

/// Truncate text to fit message limit, adding ellipsis if needed
pub fn truncate_for_message(text: &str) -> String {
    if text.len() <= MESSAGE_LIMIT {
        text.to_string()
    } else {
        // Find a safe UTF-8 boundary
        let mut end = MESSAGE_LIMIT - 3;
        while !text.is_char_boundary(end) && end > 0 {
            end -= 1;
        }
        format!("{}...", &text[..end])
    }
}
