//! Message normalization
//!
//! DuckDuckGo accepts a single user turn, so the whole conversation is
//! flattened into one `"<role>: <text>"` line per turn.

use crate::types::{ChatMessage, ContentPart, MessageContent};

/// Roles that survive normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn parse(role: &str) -> Option<Self> {
        match role {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            "system" => Some(Role::System),
            _ => None,
        }
    }

    /// Label sent upstream. DuckDuckGo has no system role.
    pub fn upstream_label(self) -> &'static str {
        match self {
            Role::User | Role::System => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Resolve message content to plain text.
///
/// Part lists are concatenated from every part carrying a `text` field;
/// anything else (images, unknown shapes) is dropped.
pub fn resolve_text(content: &MessageContent) -> Option<String> {
    match content {
        MessageContent::Text(text) => Some(text.clone()),
        MessageContent::Parts(parts) => Some(parts.iter().filter_map(ContentPart::text).collect()),
        MessageContent::Other(_) => None,
    }
}

/// Flatten the conversation into the single prompt sent upstream.
///
/// Turns with an unknown role, no content, or blank text are skipped. The
/// result is empty when nothing survives.
pub fn normalize_messages(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .filter_map(|message| {
            let role = message.role.as_deref().and_then(Role::parse)?;
            let text = message.content.as_ref().and_then(resolve_text)?;
            let text = text.trim();
            if text.is_empty() {
                return None;
            }
            Some(format!("{}: {}", role.upstream_label(), text))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
