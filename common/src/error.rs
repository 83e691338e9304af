use std::time::Duration;

use thiserror::Error;

use crate::network::session::{SessionEvent, SessionState};

/// Failures talking to the capture backend.
///
/// Any of these ends the stream it occurred on; the session layer never retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("backend not reachable: {0}")]
    Unreachable(String),

    #[error("backend answered {status}: {message}")]
    Api { status: u16, message: String },

    #[error("stream transport failed: {0}")]
    Transport(String),

    #[error("invalid response: {0}")]
    Decode(String),

    #[error("stream stalled for {0:?}")]
    Stalled(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("cannot {event:?} a session that is {state:?}")]
    InvalidTransition {
        state: SessionState,
        event: SessionEvent,
    },
}
