//! Conversation domain.
//!
//! - [`entities::Conversation`] — a titled, ordered list of chat messages
//! - [`entities::ChatMessage`] — one finalized message
//! - [`history::ConversationHistory`] — the saved list of conversations

pub mod entities;
pub mod history;
