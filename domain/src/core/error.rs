//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("Message cannot be empty")]
    EmptyMessage,

    #[error("Please enter a topic")]
    EmptyTopic,

    #[error("Course is required")]
    EmptyCourse,

    #[error("Conversation not found: {0}")]
    ConversationNotFound(String),

    #[error("Nothing to regenerate")]
    NothingToRegenerate,

    #[error("Question index {index} out of range (exam has {total} questions)")]
    QuestionOutOfRange { index: usize, total: usize },

    #[error("Option {option} out of range for question {index}")]
    OptionOutOfRange { index: usize, option: usize },

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Start date {start} is after end date {end}")]
    InvalidDateRange { start: String, end: String },

    #[error("Invalid theme: {0}")]
    InvalidTheme(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl DomainError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::Cancelled)
    }
}
