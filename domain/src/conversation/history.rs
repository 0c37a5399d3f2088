//! The persisted list of conversations.

use super::entities::Conversation;
use serde::{Deserialize, Serialize};

/// Ordered list of saved conversations, most recently updated first.
///
/// Serializes as a bare JSON array so the stored value stays a plain
/// list of conversations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationHistory {
    conversations: Vec<Conversation>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Conversation> {
        self.conversations.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id() == id)
    }

    /// Conversation at a display position (0 = most recent).
    pub fn nth(&self, index: usize) -> Option<&Conversation> {
        self.conversations.get(index)
    }

    /// Insert or replace a conversation and move it to the front.
    ///
    /// Empty conversations are never stored.
    pub fn upsert(&mut self, conversation: Conversation) {
        if conversation.is_empty() {
            return;
        }
        self.conversations.retain(|c| c.id() != conversation.id());
        self.conversations.insert(0, conversation);
    }

    pub fn remove(&mut self, id: &str) -> Option<Conversation> {
        let index = self.conversations.iter().position(|c| c.id() == id)?;
        Some(self.conversations.remove(index))
    }

    pub fn clear(&mut self) {
        self.conversations.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::entities::ChatMessage;

    fn conversation(id: &str, prompt: &str) -> Conversation {
        let mut conv = Conversation::with_id(id);
        conv.record_exchange(ChatMessage::user(prompt), ChatMessage::assistant("reply"));
        conv
    }

    #[test]
    fn upsert_puts_latest_first() {
        let mut history = ConversationHistory::new();
        history.upsert(conversation("a", "first"));
        history.upsert(conversation("b", "second"));

        let ids: Vec<_> = history.iter().map(|c| c.id().to_string()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn upsert_replaces_existing_and_moves_to_front() {
        let mut history = ConversationHistory::new();
        history.upsert(conversation("a", "first"));
        history.upsert(conversation("b", "second"));

        let mut updated = history.get("a").unwrap().clone();
        updated.record_exchange(ChatMessage::user("more"), ChatMessage::assistant("ok"));
        history.upsert(updated);

        assert_eq!(history.len(), 2);
        assert_eq!(history.nth(0).unwrap().id(), "a");
        assert_eq!(history.nth(0).unwrap().messages().len(), 4);
    }

    #[test]
    fn empty_conversations_are_not_stored() {
        let mut history = ConversationHistory::new();
        history.upsert(Conversation::with_id("empty"));
        assert!(history.is_empty());
    }

    #[test]
    fn remove_and_clear() {
        let mut history = ConversationHistory::new();
        history.upsert(conversation("a", "first"));
        history.upsert(conversation("b", "second"));

        assert_eq!(history.remove("a").unwrap().id(), "a");
        assert!(history.remove("a").is_none());
        assert_eq!(history.len(), 1);

        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn json_round_trip_preserves_order_and_messages() {
        let mut history = ConversationHistory::new();
        history.upsert(conversation("a", "first"));
        history.upsert(conversation("b", "second"));

        let json = history.to_json().unwrap();
        assert!(json.starts_with('['));

        let restored = ConversationHistory::from_json(&json).unwrap();
        assert_eq!(restored, history);
    }
}
