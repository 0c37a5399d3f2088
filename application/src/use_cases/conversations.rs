//! Conversation store.
//!
//! Owns the current conversation and the saved history, and keeps the
//! history persisted under a single storage key. Created once by the UI
//! layer at startup and passed to whatever needs it.

use crate::ports::storage::{KeyValueStore, StorageError};
use medbot_domain::{Conversation, ConversationHistory, DomainError};
use std::sync::Arc;
use tracing::{debug, warn};

/// Storage key the conversation list is saved under.
pub const HISTORY_KEY: &str = "chatHistory";

pub struct ConversationStore {
    storage: Arc<dyn KeyValueStore>,
    history: ConversationHistory,
    current: Conversation,
}

impl ConversationStore {
    /// Load saved history and start a fresh conversation.
    ///
    /// A stored value that no longer parses is discarded with a warning
    /// rather than failing startup.
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Result<Self, StorageError> {
        let history = match storage.get(HISTORY_KEY)? {
            Some(json) => ConversationHistory::from_json(&json).unwrap_or_else(|e| {
                warn!("Discarding unreadable chat history: {}", e);
                ConversationHistory::new()
            }),
            None => ConversationHistory::new(),
        };
        debug!("Loaded {} saved conversations", history.len());

        Ok(Self {
            storage,
            history,
            current: Conversation::new(),
        })
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn current(&self) -> &Conversation {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut Conversation {
        &mut self.current
    }

    /// Start a new, temporary conversation. Nothing is stored until its
    /// first exchange completes.
    pub fn new_chat(&mut self) -> &Conversation {
        self.current = Conversation::new();
        &self.current
    }

    /// Make a saved conversation current.
    pub fn open(&mut self, id: &str) -> Result<&Conversation, DomainError> {
        let conversation = self
            .history
            .get(id)
            .cloned()
            .ok_or_else(|| DomainError::ConversationNotFound(id.to_string()))?;
        self.current = conversation;
        Ok(&self.current)
    }

    /// Make the conversation at a list position (0 = most recent) current.
    pub fn open_nth(&mut self, index: usize) -> Result<&Conversation, DomainError> {
        let id = self
            .history
            .nth(index)
            .map(|c| c.id().to_string())
            .ok_or_else(|| DomainError::ConversationNotFound(format!("#{}", index + 1)))?;
        self.open(&id)
    }

    /// Store the current conversation (moving it to the front) and persist.
    ///
    /// An empty current conversation is not stored.
    pub fn save_current(&mut self) -> Result<(), StorageError> {
        if self.current.is_empty() {
            return Ok(());
        }
        self.history.upsert(self.current.clone());
        self.persist()
    }

    /// Delete a saved conversation. Deleting the current one starts a new
    /// chat. Returns whether anything was deleted.
    pub fn delete(&mut self, id: &str) -> Result<bool, StorageError> {
        let removed = self.history.remove(id).is_some();
        if self.current.id() == id {
            self.new_chat();
        }
        if removed {
            self.persist()?;
        }
        Ok(removed)
    }

    /// Forget every saved conversation and start a new chat.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.history.clear();
        self.new_chat();
        self.storage.remove(HISTORY_KEY)
    }

    fn persist(&self) -> Result<(), StorageError> {
        let json = self.history.to_json()?;
        self.storage.set(HISTORY_KEY, &json)?;
        debug!("Persisted {} conversations", self.history.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::storage::MemoryStore;
    use medbot_domain::ChatMessage;

    fn store() -> (Arc<MemoryStore>, ConversationStore) {
        let storage = Arc::new(MemoryStore::new());
        let store = ConversationStore::load(storage.clone()).unwrap();
        (storage, store)
    }

    fn chat(store: &mut ConversationStore, prompt: &str) {
        store
            .current_mut()
            .record_exchange(ChatMessage::user(prompt), ChatMessage::assistant("ok"));
        store.save_current().unwrap();
    }

    #[test]
    fn saved_history_survives_reload() {
        let (storage, mut store) = store();
        chat(&mut store, "What is preload?");
        chat(&mut store, "And afterload?");
        let saved = store.current().clone();

        let reloaded = ConversationStore::load(storage).unwrap();
        assert_eq!(reloaded.history().len(), 1);
        assert_eq!(reloaded.history().nth(0), Some(&saved));
        assert!(reloaded.current().is_empty());
    }

    #[test]
    fn empty_conversation_is_not_saved() {
        let (storage, mut store) = store();
        store.save_current().unwrap();
        assert!(storage.get(HISTORY_KEY).unwrap().is_none());
    }

    #[test]
    fn latest_conversation_moves_to_front() {
        let (_, mut store) = store();
        chat(&mut store, "first");
        let first_id = store.current().id().to_string();
        store.new_chat();
        chat(&mut store, "second");

        store.open(&first_id).unwrap();
        chat(&mut store, "follow-up");
        assert_eq!(store.history().nth(0).unwrap().id(), first_id);
        assert_eq!(store.history().nth(0).unwrap().messages().len(), 4);
    }

    #[test]
    fn deleting_current_starts_new_chat() {
        let (storage, mut store) = store();
        chat(&mut store, "to delete");
        let id = store.current().id().to_string();

        assert!(store.delete(&id).unwrap());
        assert!(store.history().is_empty());
        assert_ne!(store.current().id(), id);
        assert!(store.current().is_temporary());
        assert_eq!(storage.get(HISTORY_KEY).unwrap().as_deref(), Some("[]"));
        assert!(!store.delete(&id).unwrap());
    }

    #[test]
    fn open_unknown_conversation_fails() {
        let (_, mut store) = store();
        assert!(matches!(
            store.open("nope"),
            Err(DomainError::ConversationNotFound(_))
        ));
        assert!(store.open_nth(3).is_err());
    }

    #[test]
    fn clear_removes_everything() {
        let (storage, mut store) = store();
        chat(&mut store, "one");
        store.new_chat();
        chat(&mut store, "two");

        store.clear().unwrap();
        assert!(store.history().is_empty());
        assert!(storage.get(HISTORY_KEY).unwrap().is_none());
    }

    #[test]
    fn unreadable_history_is_discarded() {
        let storage = Arc::new(MemoryStore::new());
        storage.set(HISTORY_KEY, "{not json").unwrap();
        let store = ConversationStore::load(storage).unwrap();
        assert!(store.history().is_empty());
    }
}
