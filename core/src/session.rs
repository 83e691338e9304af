//! Lifecycle of push stream subscriptions.
//!
//! ```text
//! Idle ──start──▶ Active ──end of stream / stop──▶ Closed
//!                   │                               ▲
//!                   └──transport error──▶ Erroring ─┘ stop
//! ```
//!
//! A session never returns to `Active`. Restarting a stream builds a new
//! session under a fresh [`Generation`], so deliveries still in flight for the
//! old one are recognized by their tag and dropped.

use std::collections::HashMap;

use airmap_common::error::SessionError;
use airmap_common::network::session::{Generation, SessionEvent, SessionState, StreamKind};
use airmap_common::network::target::ScanTarget;
use tracing::debug;

/// What a caller asks the backend to stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanRequest {
    Networks,
    Devices(ScanTarget),
}

impl ScanRequest {
    pub fn kind(&self) -> StreamKind {
        match self {
            ScanRequest::Networks => StreamKind::NetworkScan,
            ScanRequest::Devices(_) => StreamKind::DeviceScan,
        }
    }

    pub fn target(&self) -> Option<&ScanTarget> {
        match self {
            ScanRequest::Networks => None,
            ScanRequest::Devices(target) => Some(target),
        }
    }
}

/// Identifies the session a delivery belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionTicket {
    pub kind: StreamKind,
    pub generation: Generation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSession {
    kind: StreamKind,
    generation: Generation,
    state: SessionState,
    target: Option<ScanTarget>,
    failure: Option<String>,
}

impl StreamSession {
    pub fn new(kind: StreamKind, generation: Generation, target: Option<ScanTarget>) -> Self {
        Self {
            kind,
            generation,
            state: SessionState::Idle,
            target,
            failure: None,
        }
    }

    /// A session that has already taken its `start` transition.
    pub fn active(kind: StreamKind, generation: Generation, target: Option<ScanTarget>) -> Self {
        Self {
            state: SessionState::Active,
            ..Self::new(kind, generation, target)
        }
    }

    pub fn kind(&self) -> StreamKind {
        self.kind
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn target(&self) -> Option<&ScanTarget> {
        self.target.as_ref()
    }

    /// Transport failure that ended this session, if any.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn start(&mut self) -> Result<(), SessionError> {
        self.transition(SessionEvent::Start, SessionState::Idle, SessionState::Active)
    }

    /// Whether a chunk tagged with `generation` may be applied.
    pub fn accepts(&self, generation: Generation) -> bool {
        self.state.is_active() && self.generation == generation
    }

    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), SessionError> {
        self.transition(
            SessionEvent::TransportError,
            SessionState::Active,
            SessionState::Erroring,
        )?;
        self.failure = Some(reason.into());
        Ok(())
    }

    pub fn end_of_stream(&mut self) -> Result<(), SessionError> {
        self.transition(SessionEvent::EndOfStream, SessionState::Active, SessionState::Closed)
    }

    /// Closes the session. Calling it again, or on a session that never
    /// started, is a no-op.
    pub fn stop(&mut self) {
        match self.state {
            SessionState::Active | SessionState::Erroring => {
                debug!(kind = %self.kind, generation = %self.generation, "session closed");
                self.state = SessionState::Closed;
            }
            SessionState::Idle => self.state = SessionState::Closed,
            SessionState::Closed => {}
        }
    }

    fn transition(
        &mut self,
        event: SessionEvent,
        from: SessionState,
        to: SessionState,
    ) -> Result<(), SessionError> {
        if self.state != from {
            return Err(SessionError::InvalidTransition {
                state: self.state,
                event,
            });
        }
        self.state = to;
        Ok(())
    }
}

/// The one current session per stream kind, and the generation counter
/// shared by all of them.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    last_generation: u64,
    sessions: HashMap<StreamKind, StreamSession>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Closes the current session of `kind` and starts its replacement.
    pub fn start(&mut self, request: &ScanRequest) -> SessionTicket {
        let kind = request.kind();
        if let Some(previous) = self.sessions.get_mut(&kind) {
            previous.stop();
        }

        self.last_generation += 1;
        let generation = Generation(self.last_generation);

        let session = StreamSession::active(kind, generation, request.target().cloned());
        self.sessions.insert(kind, session);

        SessionTicket { kind, generation }
    }

    pub fn get(&self, kind: StreamKind) -> Option<&StreamSession> {
        self.sessions.get(&kind)
    }

    /// The session `ticket` was issued for, if it is still the current one.
    pub fn current_mut(&mut self, ticket: SessionTicket) -> Option<&mut StreamSession> {
        self.sessions
            .get_mut(&ticket.kind)
            .filter(|session| session.generation == ticket.generation)
    }

    pub fn accepts(&self, ticket: SessionTicket) -> bool {
        self.get(ticket.kind)
            .is_some_and(|session| session.accepts(ticket.generation))
    }

    pub fn state(&self, kind: StreamKind) -> SessionState {
        self.get(kind).map(StreamSession::state).unwrap_or_default()
    }

    pub fn stop(&mut self, kind: StreamKind) {
        if let Some(session) = self.sessions.get_mut(&kind) {
            session.stop();
        }
    }
}
