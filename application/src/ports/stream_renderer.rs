//! Stream rendering port
//!
//! Receives the lifecycle of one streamed response. Implementations live
//! in the presentation layer.

use crate::use_cases::stream_assembler::StreamError;

/// Callbacks for a single streamed response.
///
/// Each session owns its renderer, so callbacks take `&mut self`.
/// `on_render` is always given the complete text received so far and may
/// be called many times with growing prefixes of the same text.
pub trait StreamRenderer: Send {
    /// The first content fragment arrived: create the render target.
    fn on_stream_start(&mut self) {}

    /// Replace the render target's contents with `text`.
    fn on_render(&mut self, text: &str);

    /// The stream completed; `text` is the final response.
    fn on_finalize(&mut self, _text: &str) {}

    /// The stream failed. Partial output stays where it is.
    fn on_error(&mut self, _error: &StreamError) {}

    /// The stream was cancelled by the caller.
    fn on_cancel(&mut self) {}
}

/// Renderer that ignores everything
pub struct NoRenderer;

impl StreamRenderer for NoRenderer {
    fn on_render(&mut self, _text: &str) {}
}
