//! Lifecycle of a single streamed response.

use std::fmt;
use thiserror::Error;

/// Where a stream is in its lifecycle.
///
/// `Idle -> Streaming -> {Completed | Failed | Cancelled}`. A request can
/// also fail or be cancelled before any byte arrives. Terminal states are
/// final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamState {
    #[default]
    Idle,
    Streaming,
    Completed,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid stream transition: {from} -> {to}")]
pub struct InvalidTransition {
    pub from: StreamState,
    pub to: StreamState,
}

impl StreamState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StreamState::Completed | StreamState::Failed | StreamState::Cancelled
        )
    }

    pub fn can_transition_to(&self, to: StreamState) -> bool {
        use StreamState::*;
        matches!(
            (self, to),
            (Idle, Streaming)
                | (Idle, Failed)
                | (Idle, Cancelled)
                | (Streaming, Completed)
                | (Streaming, Failed)
                | (Streaming, Cancelled)
        )
    }

    pub fn transition(self, to: StreamState) -> Result<StreamState, InvalidTransition> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(InvalidTransition { from: self, to })
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StreamState::Idle => "idle",
            StreamState::Streaming => "streaming",
            StreamState::Completed => "completed",
            StreamState::Failed => "failed",
            StreamState::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for StreamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path() {
        let state = StreamState::Idle
            .transition(StreamState::Streaming)
            .and_then(|s| s.transition(StreamState::Completed))
            .unwrap();
        assert!(state.is_terminal());
    }

    #[test]
    fn streaming_is_entered_once() {
        let err = StreamState::Streaming
            .transition(StreamState::Streaming)
            .unwrap_err();
        assert_eq!(err.from, StreamState::Streaming);
    }

    #[test]
    fn terminal_states_are_final() {
        for terminal in [
            StreamState::Completed,
            StreamState::Failed,
            StreamState::Cancelled,
        ] {
            assert!(terminal.is_terminal());
            for next in [
                StreamState::Idle,
                StreamState::Streaming,
                StreamState::Completed,
                StreamState::Failed,
                StreamState::Cancelled,
            ] {
                assert!(!terminal.can_transition_to(next), "{terminal} -> {next}");
            }
        }
    }

    #[test]
    fn idle_can_fail_or_cancel_before_streaming() {
        assert!(StreamState::Idle.can_transition_to(StreamState::Failed));
        assert!(StreamState::Idle.can_transition_to(StreamState::Cancelled));
        assert!(!StreamState::Idle.can_transition_to(StreamState::Completed));
    }
}
