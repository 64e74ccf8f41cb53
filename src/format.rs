//! Formatting conversations into training records.
//!
//! Mirrors the shape expected by the downstream chat-template trainer:
//! an optional configured system turn is injected ahead of each
//! conversation's own messages, and per-conversation metadata is dropped
//! from the training record.

use anyhow::{bail, Result};

use crate::conversation::{Conversation, ConversationMessage, Role};

pub struct DatasetFormatter {
    system_message: Option<String>,
}

impl DatasetFormatter {
    pub fn new(system_message: Option<String>) -> Self {
        Self { system_message }
    }

    /// Produce training records from loaded conversations.
    ///
    /// Fails on a conversation with no non-system messages: there would be
    /// nothing to train on, and silently keeping it would poison the
    /// splits.
    pub fn format_for_training(&self, conversations: &[Conversation]) -> Result<Vec<Conversation>> {
        let mut formatted = Vec::with_capacity(conversations.len());
        for (i, conv) in conversations.iter().enumerate() {
            if !conv.has_non_system_message() {
                bail!(
                    "Conversation {} has no non-system messages and cannot be used for training",
                    i
                );
            }

            let mut messages = Vec::with_capacity(conv.messages.len() + 1);
            if let Some(system) = &self.system_message {
                messages.push(ConversationMessage::new(Role::System, system.clone()));
            }
            messages.extend(conv.messages.iter().cloned());

            formatted.push(Conversation {
                messages,
                metadata: None,
            });
        }
        Ok(formatted)
    }
}
