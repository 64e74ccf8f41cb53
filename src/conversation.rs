//! Curated conversation examples: types and loading.
//!
//! Examples arrive as JSON (one conversation object or a list) or
//! line-delimited JSON (one conversation per non-empty line). Loading is
//! fail-fast: a single malformed record fails the whole load, so bad data
//! never silently thins the training set.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use walkdir::WalkDir;

/// Message author. Any other role value is a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single role-tagged turn.
///
/// `tool_calls` is opaque: whatever structure the upstream producer wrote
/// is carried through unmodified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: Role,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<serde_json::Value>>,
}

impl ConversationMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: None,
        }
    }
}

/// One training or evaluation example.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub messages: Vec<ConversationMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Conversation {
    /// A conversation is trainable only if something beyond injected
    /// system turns is present.
    pub fn has_non_system_message(&self) -> bool {
        self.messages.iter().any(|m| m.role != Role::System)
    }

    /// The expected target for evaluation: the single terminal assistant
    /// turn. `None` when the conversation does not end with exactly one
    /// assistant message.
    pub fn eval_target(&self) -> Option<&ConversationMessage> {
        let last = self.messages.last()?;
        if last.role != Role::Assistant {
            return None;
        }
        let trailing_assistants = self
            .messages
            .iter()
            .rev()
            .take_while(|m| m.role == Role::Assistant)
            .count();
        if trailing_assistants == 1 {
            Some(last)
        } else {
            None
        }
    }
}

/// Load conversations from a file or, recursively, from a directory of
/// `.json`/`.jsonl` files. Order across files is unspecified.
pub fn load_conversations(path: &Path) -> Result<Vec<Conversation>> {
    if path.is_dir() {
        let mut conversations = Vec::new();
        for entry in WalkDir::new(path) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let ext = entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("");
            if matches!(ext, "json" | "jsonl") {
                conversations.extend(load_file(entry.path())?);
            }
        }
        Ok(conversations)
    } else {
        load_file(path)
    }
}

fn load_file(path: &Path) -> Result<Vec<Conversation>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read examples file: {}", path.display()))?;

    let is_jsonl = path.extension().and_then(|e| e.to_str()) == Some("jsonl");
    if is_jsonl {
        let mut conversations = Vec::new();
        for (lineno, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let conversation: Conversation = serde_json::from_str(line).with_context(|| {
                format!("Malformed conversation at {}:{}", path.display(), lineno + 1)
            })?;
            conversations.push(conversation);
        }
        Ok(conversations)
    } else {
        // Whole-document JSON: root is one conversation or a list of them.
        let value: serde_json::Value = serde_json::from_str(&content)
            .with_context(|| format!("Malformed JSON in {}", path.display()))?;
        let conversations = if value.is_array() {
            serde_json::from_value::<Vec<Conversation>>(value)
        } else {
            serde_json::from_value::<Conversation>(value).map(|c| vec![c])
        }
        .with_context(|| format!("Malformed conversation in {}", path.display()))?;
        Ok(conversations)
    }
}
