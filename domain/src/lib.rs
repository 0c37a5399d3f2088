//! Domain layer for medbot
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Conversations
//!
//! A [`Conversation`] is an ordered list of finalized messages. It stays
//! *temporary* until its first exchange completes; only then is it titled
//! and stored in the [`ConversationHistory`].
//!
//! ## Streams
//!
//! Replies arrive as server-sent events. A [`StreamSession`] turns raw
//! byte chunks into content fragments, independent of how the bytes were
//! split on the wire.
//!
//! ## Study tools
//!
//! Flashcard decks, practice exams and study plan calendars are plain
//! state structs mutated by commands.

pub mod config;
pub mod conversation;
pub mod core;
pub mod stream;
pub mod study;
pub mod theme;
pub mod tools;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, Severity};
pub use conversation::{
    entities::{ChatMessage, Conversation, DEFAULT_TITLE, Role, TITLE_MAX_CHARS, derive_title},
    history::ConversationHistory,
};
pub use core::error::DomainError;
pub use stream::{
    InvalidTransition, LineFramer, SessionEvent, StreamRecord, StreamSession, StreamState,
    Utf8StreamDecoder,
};
pub use study::{
    AnswerValue, ExamAttempt, ExamPaper, ExamQuestion, ExamScore, Flashcard, FlashcardDeck,
    GradeReport, GradedAnswer, MonthGrid, ScoreBand, StudyCalendar, StudyMode, StudyTask,
};
pub use theme::Theme;
pub use tools::Tool;
