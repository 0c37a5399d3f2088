//! Interactive chat module
//!
//! Provides a readline-based interactive chat interface and the terminal
//! renderer replies stream into.

mod renderer;
mod repl;

pub use renderer::{RenderMode, TerminalRenderer, rows_for, visible_width};
pub use repl::{ChatRepl, ReplCommand, cancel_on_ctrl_c};
