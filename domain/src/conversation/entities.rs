//! Conversation domain entities

use crate::core::string::{collapse_whitespace, truncate_chars};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Title used until a conversation has a user message to derive one from.
pub const DEFAULT_TITLE: &str = "New Chat";

/// Number of characters kept from the first user message for the title.
pub const TITLE_MAX_CHARS: usize = 30;

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A finalized message in a conversation (Entity)
///
/// Stored as `{"type": "user", "content": ..., "timestamp": ...}`, the
/// layout the history has always been persisted with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(rename = "type", alias = "role")]
    role: Role,
    content: String,
    timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content, Utc::now())
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content, Utc::now())
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

/// Derive a conversation title from its messages.
///
/// Takes the first user message, collapses whitespace and keeps the first
/// [`TITLE_MAX_CHARS`] characters (plus `...` when cut). Falls back to
/// [`DEFAULT_TITLE`].
pub fn derive_title(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .find(|m| m.is_user())
        .map(|m| collapse_whitespace(m.content()))
        .filter(|text| !text.is_empty())
        .map(|text| truncate_chars(&text, TITLE_MAX_CHARS))
        .unwrap_or_else(|| DEFAULT_TITLE.to_string())
}

/// A titled, ordered list of chat messages (Entity)
///
/// A new conversation is *temporary*: its title is provisional until the
/// first exchange completes, at which point the title is derived once and
/// never changes again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    id: String,
    title: String,
    messages: Vec<ChatMessage>,
    #[serde(rename = "date")]
    updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    temporary: bool,
}

impl Conversation {
    /// Start a new, temporary conversation with a random id.
    pub fn new() -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string())
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: DEFAULT_TITLE.to_string(),
            messages: Vec::new(),
            updated_at: Utc::now(),
            temporary: true,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_temporary(&self) -> bool {
        self.temporary
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Append a completed user/assistant exchange.
    ///
    /// The title is fixed on the first completed exchange.
    pub fn record_exchange(&mut self, user: ChatMessage, assistant: ChatMessage) {
        self.messages.push(user);
        self.messages.push(assistant);
        if self.temporary {
            self.title = derive_title(&self.messages);
            self.temporary = false;
        }
        self.updated_at = Utc::now();
    }

    /// The most recent user message, if the conversation ends with a
    /// complete exchange.
    pub fn last_exchange_prompt(&self) -> Option<&ChatMessage> {
        match self.messages.as_slice() {
            [.., user, assistant] if user.is_user() && !assistant.is_user() => Some(user),
            _ => None,
        }
    }

    /// Messages that precede the last exchange (the context a regenerated
    /// reply is produced from).
    pub fn history_before_last_exchange(&self) -> &[ChatMessage] {
        if self.last_exchange_prompt().is_some() {
            &self.messages[..self.messages.len() - 2]
        } else {
            &self.messages
        }
    }

    /// Swap the last exchange for a regenerated one.
    ///
    /// Returns `false` (and leaves the conversation untouched) when the
    /// conversation does not end with a complete exchange.
    pub fn replace_last_exchange(&mut self, user: ChatMessage, assistant: ChatMessage) -> bool {
        if self.last_exchange_prompt().is_none() {
            return false;
        }
        self.messages.truncate(self.messages.len() - 2);
        self.record_exchange(user, assistant);
        true
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}
