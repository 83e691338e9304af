use std::time::Duration;

pub const DEFAULT_BACKEND: &str = "http://localhost:5000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the capture backend.
    pub backend: String,
    /// Output verbosity reduction, `0` prints everything.
    pub quiet: u8,
    /// Closes a stream that stays silent for this long.
    ///
    /// `None` keeps a silent stream open indefinitely.
    pub stall_timeout: Option<Duration>,
    /// Disables MAC vendor lookups for devices the backend did not label.
    pub no_vendor: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: DEFAULT_BACKEND.to_string(),
            quiet: 0,
            stall_timeout: None,
            no_vendor: false,
        }
    }
}
