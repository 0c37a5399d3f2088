//! Application use cases.

pub mod chat;
pub mod conversations;
pub mod preferences;
pub mod stream_assembler;
pub mod study;
