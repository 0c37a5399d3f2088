//! Server-sent event stream assembly
//!
//! Pure building blocks: nothing here does I/O. The application layer
//! pulls bytes from the network and pushes them through a
//! [`StreamSession`](session::StreamSession).

pub mod decoder;
pub mod framer;
pub mod record;
pub mod session;
pub mod state;

pub use decoder::Utf8StreamDecoder;
pub use framer::LineFramer;
pub use record::{DATA_PREFIX, DONE_SENTINEL, StreamRecord};
pub use session::{SessionEvent, StreamSession};
pub use state::{InvalidTransition, StreamState};
