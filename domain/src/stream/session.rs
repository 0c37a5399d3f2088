//! Assembly of a streamed response from raw byte chunks.

use super::decoder::Utf8StreamDecoder;
use super::framer::LineFramer;
use super::record::StreamRecord;
use super::state::{InvalidTransition, StreamState};
use std::ops::ControlFlow;

/// Something that happened while feeding bytes into a [`StreamSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent<'a> {
    /// A fragment was appended. `text` is everything received so far;
    /// `first` marks the fragment that should create the render target.
    Content {
        delta: &'a str,
        text: &'a str,
        first: bool,
    },
    /// The end-of-stream sentinel arrived.
    Completed { text: &'a str },
    /// The server sent an error payload; the stream has failed.
    ServerError { message: &'a str },
    /// A data line could not be parsed and was skipped.
    Malformed { payload: &'a str, reason: &'a str },
}

/// Incremental assembler for one streamed response.
///
/// Bytes go through a UTF-8 decoder, a line framer and the record parser,
/// in that order. The accumulated text only ever grows, by exactly the
/// content fragments in arrival order, regardless of how the bytes were
/// chunked on the wire.
#[derive(Debug, Default)]
pub struct StreamSession {
    state: StreamState,
    decoder: Utf8StreamDecoder,
    framer: LineFramer,
    text: String,
    fragments: usize,
    server_error: Option<String>,
}

impl StreamSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    /// Number of content fragments appended so far.
    pub fn fragments(&self) -> usize {
        self.fragments
    }

    pub fn server_error(&self) -> Option<&str> {
        self.server_error.as_deref()
    }

    /// Bytes that have been received but not yet formed a complete line.
    pub fn residual(&self) -> &str {
        self.framer.residual()
    }

    pub fn begin(&mut self) -> Result<(), InvalidTransition> {
        self.state = self.state.transition(StreamState::Streaming)?;
        Ok(())
    }

    pub fn fail(&mut self) -> Result<(), InvalidTransition> {
        self.state = self.state.transition(StreamState::Failed)?;
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), InvalidTransition> {
        self.state = self.state.transition(StreamState::Cancelled)?;
        Ok(())
    }

    /// Feed one chunk of bytes and report what it produced.
    ///
    /// Processing stops at the end-of-stream sentinel, at a server error,
    /// or as soon as `on_event` returns [`ControlFlow::Break`]. Lines after
    /// that point are discarded. Returning `Break` from the `Completed` or
    /// `ServerError` event leaves the session `Streaming`, so the caller
    /// can still cancel it. Feeding a session that is not streaming does
    /// nothing. Returns the state after the chunk.
    pub fn feed<F>(&mut self, chunk: &[u8], mut on_event: F) -> StreamState
    where
        F: FnMut(SessionEvent<'_>) -> ControlFlow<()>,
    {
        if self.state != StreamState::Streaming {
            return self.state;
        }

        let decoded = self.decoder.decode(chunk);
        for line in self.framer.push(&decoded) {
            let flow = match StreamRecord::parse(&line) {
                StreamRecord::Content(delta) => {
                    let first = self.fragments == 0;
                    self.fragments += 1;
                    self.text.push_str(&delta);
                    on_event(SessionEvent::Content {
                        delta: &delta,
                        text: &self.text,
                        first,
                    })
                }
                StreamRecord::Done => {
                    if on_event(SessionEvent::Completed { text: &self.text }).is_continue() {
                        self.state = StreamState::Completed;
                    }
                    break;
                }
                StreamRecord::ServerError(message) => {
                    if on_event(SessionEvent::ServerError { message: &message }).is_continue() {
                        self.state = StreamState::Failed;
                        self.server_error = Some(message);
                    }
                    break;
                }
                StreamRecord::Malformed { payload, reason } => on_event(SessionEvent::Malformed {
                    payload: &payload,
                    reason: &reason,
                }),
                StreamRecord::Ignored => ControlFlow::Continue(()),
            };
            if flow.is_break() {
                break;
            }
        }
        self.state
    }
}
