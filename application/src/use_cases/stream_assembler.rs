//! Stream Assembler use case.
//!
//! Drives one streamed response from request to completion: opens the
//! byte stream, pushes every chunk through a [`StreamSession`] and forwards
//! the resulting events to a [`StreamRenderer`].
//!
//! Cancellation is cooperative. The caller's [`CancellationToken`] is
//! checked before every chunk and before every callback; once it fires,
//! the byte stream is dropped and no further render or finalize callback
//! is made.

use crate::config::Endpoint;
use crate::ports::medbot_gateway::{GatewayError, MedbotGateway};
use crate::ports::stream_renderer::StreamRenderer;
use futures::{Stream, StreamExt};
use medbot_domain::core::string::truncate;
use medbot_domain::{InvalidTransition, SessionEvent, StreamSession, StreamState};
use serde_json::Value;
use std::ops::ControlFlow;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// Errors that end a stream without a complete response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Stream ended before completion")]
    UnexpectedEof,

    #[error("Stream cancelled")]
    Cancelled,

    #[error(transparent)]
    State(#[from] InvalidTransition),
}

impl StreamError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, StreamError::Cancelled)
    }
}

/// A completed response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamOutcome {
    pub text: String,
    /// Number of content fragments the text was assembled from.
    pub fragments: usize,
}

/// Use case for assembling a streamed response.
#[derive(Clone)]
pub struct StreamAssembler {
    gateway: Arc<dyn MedbotGateway>,
}

impl StreamAssembler {
    pub fn new(gateway: Arc<dyn MedbotGateway>) -> Self {
        Self { gateway }
    }

    /// Send `body` to a streaming endpoint and assemble the reply.
    pub async fn run(
        &self,
        endpoint: Endpoint,
        body: Value,
        renderer: &mut dyn StreamRenderer,
        cancel: &CancellationToken,
    ) -> Result<StreamOutcome, StreamError> {
        debug!("Opening stream to {}", endpoint);

        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = self.gateway.open_stream(endpoint, body) => Some(result),
        };

        let stream = match opened {
            None => {
                debug!("Stream to {} cancelled before it opened", endpoint);
                renderer.on_cancel();
                return Err(StreamError::Cancelled);
            }
            Some(Err(e)) => {
                warn!("Failed to open stream to {}: {}", endpoint, e);
                let error = StreamError::Gateway(e);
                renderer.on_error(&error);
                return Err(error);
            }
            Some(Ok(stream)) => stream,
        };

        assemble(stream, renderer, cancel).await
    }
}

/// Drive a session over an already opened byte stream.
pub async fn assemble<S>(
    mut stream: S,
    renderer: &mut dyn StreamRenderer,
    cancel: &CancellationToken,
) -> Result<StreamOutcome, StreamError>
where
    S: Stream<Item = Result<Vec<u8>, GatewayError>> + Unpin,
{
    let mut session = StreamSession::new();
    session.begin()?;
    debug!("Stream state: {}", session.state());

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            next = stream.next() => Some(next),
        };
        let Some(next) = next else {
            return cancelled(session, stream, renderer);
        };

        let bytes = match next {
            Some(Ok(bytes)) => bytes,
            Some(Err(e)) => {
                warn!("Stream transport error: {}", e);
                return failed(session, renderer, StreamError::Gateway(e));
            }
            None => {
                warn!(
                    "Stream ended without end marker ({} fragments received)",
                    session.fragments()
                );
                return failed(session, renderer, StreamError::UnexpectedEof);
            }
        };

        trace!("Received {} bytes", bytes.len());
        let state = session.feed(&bytes, |event| {
            if cancel.is_cancelled() {
                return ControlFlow::Break(());
            }
            match event {
                SessionEvent::Content { delta, text, first } => {
                    if first {
                        renderer.on_stream_start();
                    }
                    trace!("Content: {:?}", truncate(delta, 80));
                    renderer.on_render(text);
                }
                SessionEvent::Completed { text } => {
                    renderer.on_finalize(text);
                }
                SessionEvent::ServerError { message } => {
                    warn!("Server reported error mid-stream: {}", message);
                }
                SessionEvent::Malformed { payload, reason } => {
                    warn!(
                        "Skipping malformed stream payload {:?}: {}",
                        truncate(payload, 120),
                        reason
                    );
                }
            }
            ControlFlow::Continue(())
        });

        match state {
            StreamState::Completed => {
                debug!(
                    "Stream completed: {} fragments, {} bytes of text",
                    session.fragments(),
                    session.text().len()
                );
                let fragments = session.fragments();
                return Ok(StreamOutcome {
                    text: session.into_text(),
                    fragments,
                });
            }
            StreamState::Failed => {
                let message = session
                    .server_error()
                    .unwrap_or("unknown server error")
                    .to_string();
                let error = StreamError::Server(message);
                renderer.on_error(&error);
                return Err(error);
            }
            _ if cancel.is_cancelled() => {
                return cancelled(session, stream, renderer);
            }
            _ => {}
        }
    }
}

fn cancelled<S>(
    mut session: StreamSession,
    stream: S,
    renderer: &mut dyn StreamRenderer,
) -> Result<StreamOutcome, StreamError> {
    // Release the connection before anything else
    drop(stream);
    session.cancel()?;
    debug!(
        "Stream cancelled after {} fragments",
        session.fragments()
    );
    renderer.on_cancel();
    Err(StreamError::Cancelled)
}

fn failed(
    mut session: StreamSession,
    renderer: &mut dyn StreamRenderer,
    error: StreamError,
) -> Result<StreamOutcome, StreamError> {
    session.fail()?;
    debug!("Stream state: {}", session.state());
    renderer.on_error(&error);
    Err(error)
}
