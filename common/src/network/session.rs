use std::fmt;

use serde::Serialize;

/// Which push stream a session subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StreamKind {
    NetworkScan,
    DeviceScan,
}

impl StreamKind {
    pub const ALL: [StreamKind; 2] = [StreamKind::NetworkScan, StreamKind::DeviceScan];
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::NetworkScan => f.write_str("network scan"),
            StreamKind::DeviceScan => f.write_str("device scan"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum SessionState {
    #[default]
    Idle,
    Active,
    Erroring,
    Closed,
}

impl SessionState {
    pub fn is_active(self) -> bool {
        self == SessionState::Active
    }

    pub fn is_closed(self) -> bool {
        self == SessionState::Closed
    }
}

/// Inputs that drive a session between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionEvent {
    Start,
    TransportError,
    EndOfStream,
}

/// Monotonically increasing tag of one session.
///
/// Deliveries carry the generation they were subscribed under so that a
/// superseded stream can be recognized and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Generation(pub u64);

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
