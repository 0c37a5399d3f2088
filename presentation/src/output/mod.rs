//! Output formatting

pub mod console;
pub mod markdown;
pub mod palette;

pub use console::{ConsoleFormatter, option_letter};
pub use markdown::MarkdownRenderer;
pub use palette::Palette;
