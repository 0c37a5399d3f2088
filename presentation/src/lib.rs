//! Presentation layer for medbot
//!
//! This crate contains CLI definitions, output formatters, progress
//! reporters, the interactive chat interface and the study views.

pub mod chat;
pub mod cli;
pub mod config;
pub mod output;
pub mod progress;
pub mod study;

// Re-export commonly used types
pub use chat::{ChatRepl, RenderMode, TerminalRenderer, cancel_on_ctrl_c};
pub use cli::commands::{
    Cli, Command, ExamCommand, FlashcardsArgs, HistoryCommand, PlanCommand, Rating, ThemeAction,
};
pub use config::{OutputConfig, ReplConfig};
pub use output::{ConsoleFormatter, MarkdownRenderer, Palette};
pub use progress::{ProgressReporter, SimpleProgress};
pub use study::{ExamExit, ExamRunner, FlashcardViewer, ViewerAction};
