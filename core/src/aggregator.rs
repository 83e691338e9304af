//! The discovery state a presentation layer renders.
//!
//! [`Aggregator`] owns the merged network collection, the device list of the
//! most recently probed network and the session registry. It is synchronous:
//! every method folds one delivery into state and returns immediately. The
//! async side lives in [`crate::discovery`].

use std::collections::HashMap;

use airmap_common::error::BackendError;
use airmap_common::network::device::DeviceRecord;
use airmap_common::network::mac;
use airmap_common::network::record::NetworkRecord;
use airmap_common::network::session::{Generation, SessionState, StreamKind};
use airmap_common::network::target::ScanTarget;
use airmap_common::vendors::VendorRepository;
use serde::Serialize;
use tracing::{debug, warn};

use crate::dispatcher::{DispatchResult, MessageDispatcher};
use crate::merger::{MergeStats, NetworkCollection};
use crate::parser::RecordParser;
use crate::session::{ScanRequest, SessionRegistry, SessionTicket};

/// What applying one chunk did to the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// The chunk belongs to a superseded or closed session and was dropped.
    Stale,
    Networks(MergeStats),
    Devices(usize),
    ServerError(String),
    UnknownKind(String),
    DecodeError(String),
}

impl ChunkOutcome {
    pub fn changed_state(&self) -> bool {
        match self {
            ChunkOutcome::Networks(stats) => stats.changed(),
            ChunkOutcome::Devices(_) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub kind: StreamKind,
    pub generation: Option<Generation>,
    pub state: SessionState,
    pub target: Option<ScanTarget>,
    /// Latest failure or non-fatal report of the session.
    pub last_report: Option<String>,
    /// Transport failure that ended the session. Non-fatal reports never
    /// land here.
    pub failure: Option<String>,
}

/// Point in time copy of everything a renderer needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoverySnapshot {
    pub networks: Vec<NetworkRecord>,
    pub devices: Vec<DeviceRecord>,
    pub device_target: Option<ScanTarget>,
    pub network_session: SessionView,
    pub device_session: SessionView,
}

impl DiscoverySnapshot {
    pub fn session(&self, kind: StreamKind) -> &SessionView {
        match kind {
            StreamKind::NetworkScan => &self.network_session,
            StreamKind::DeviceScan => &self.device_session,
        }
    }
}

#[derive(Default)]
pub struct Aggregator {
    parser: RecordParser,
    dispatcher: MessageDispatcher,
    networks: NetworkCollection,
    devices: Vec<DeviceRecord>,
    device_target: Option<ScanTarget>,
    sessions: SessionRegistry,
    reports: HashMap<StreamKind, String>,
    vendors: Option<Box<dyn VendorRepository>>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Labels devices the backend left as `unknown` through `vendors`.
    pub fn with_vendors(mut self, vendors: Box<dyn VendorRepository>) -> Self {
        self.vendors = Some(vendors);
        self
    }

    /// Supersedes the current session of the request's kind with a new one.
    ///
    /// A device scan starts from an empty device list.
    pub fn begin(&mut self, request: &ScanRequest) -> SessionTicket {
        let ticket = self.sessions.start(request);
        self.reports.remove(&ticket.kind);

        if let ScanRequest::Devices(target) = request {
            self.devices.clear();
            self.device_target = Some(target.clone());
        }

        debug!(kind = %ticket.kind, generation = %ticket.generation, "session started");
        ticket
    }

    pub fn apply_chunk(&mut self, ticket: SessionTicket, raw: &str) -> ChunkOutcome {
        if !self.sessions.accepts(ticket) {
            debug!(kind = %ticket.kind, generation = %ticket.generation, "dropped stale chunk");
            return ChunkOutcome::Stale;
        }

        match ticket.kind {
            StreamKind::NetworkScan => {
                let records = self.parser.parse_chunk(raw);
                ChunkOutcome::Networks(self.networks.merge(records))
            }
            StreamKind::DeviceScan => self.apply_device_message(raw),
        }
    }

    fn apply_device_message(&mut self, raw: &str) -> ChunkOutcome {
        let kind = StreamKind::DeviceScan;
        match self.dispatcher.dispatch(raw) {
            DispatchResult::Devices(devices) => {
                self.devices = self.enrich_vendors(devices);
                ChunkOutcome::Devices(self.devices.len())
            }
            DispatchResult::ServerError(message) => {
                warn!("Backend reported a device scan failure: {message}");
                self.reports.insert(kind, message.clone());
                ChunkOutcome::ServerError(message)
            }
            DispatchResult::UnknownKind(tag) => {
                warn!("Ignoring device scan message of unknown type '{tag}'");
                self.reports.insert(kind, format!("unknown message type '{tag}'"));
                ChunkOutcome::UnknownKind(tag)
            }
            DispatchResult::DecodeError(reason) => {
                warn!("Undecodable device scan message: {reason}");
                self.reports.insert(kind, format!("undecodable message: {reason}"));
                ChunkOutcome::DecodeError(reason)
            }
        }
    }

    fn enrich_vendors(&self, mut devices: Vec<DeviceRecord>) -> Vec<DeviceRecord> {
        let Some(vendors) = &self.vendors else {
            return devices;
        };

        for device in devices.iter_mut().filter(|d| !d.has_known_vendor()) {
            if let Some(vendor) = mac::parse_mac(&device.mac_address).and_then(|m| vendors.get_vendor(m)) {
                device.vendor = vendor;
            }
        }
        devices
    }

    /// Moves the ticket's session to `Erroring`. Returns `false` when the
    /// ticket is stale or the session was not active.
    pub fn transport_error(&mut self, ticket: SessionTicket, error: &BackendError) -> bool {
        let Some(session) = self.sessions.current_mut(ticket) else {
            return false;
        };
        if session.fail(error.to_string()).is_err() {
            return false;
        }

        warn!("{} stream failed: {error}", ticket.kind);
        self.reports.insert(ticket.kind, error.to_string());
        true
    }

    /// Closes the ticket's session after its stream ended or failed.
    pub fn finish(&mut self, ticket: SessionTicket) -> bool {
        let Some(session) = self.sessions.current_mut(ticket) else {
            return false;
        };
        match session.state() {
            SessionState::Active => session.end_of_stream().is_ok(),
            SessionState::Erroring => {
                session.stop();
                true
            }
            SessionState::Idle | SessionState::Closed => false,
        }
    }

    /// Closes the current session of `kind`, if any. Safe to repeat.
    pub fn stop(&mut self, kind: StreamKind) {
        self.sessions.stop(kind);
    }

    pub fn clear_networks(&mut self) {
        self.networks.clear();
    }

    pub fn networks(&self) -> &[NetworkRecord] {
        self.networks.records()
    }

    pub fn devices(&self) -> &[DeviceRecord] {
        &self.devices
    }

    pub fn session_state(&self, kind: StreamKind) -> SessionState {
        self.sessions.state(kind)
    }

    pub fn session_view(&self, kind: StreamKind) -> SessionView {
        let session = self.sessions.get(kind);
        SessionView {
            kind,
            generation: session.map(|s| s.generation()),
            state: self.sessions.state(kind),
            target: session.and_then(|s| s.target().cloned()),
            last_report: self.reports.get(&kind).cloned(),
            failure: session.and_then(|s| s.failure()).map(str::to_string),
        }
    }

    pub fn snapshot(&self) -> DiscoverySnapshot {
        DiscoverySnapshot {
            networks: self.networks.records().to_vec(),
            devices: self.devices.clone(),
            device_target: self.device_target.clone(),
            network_session: self.session_view(StreamKind::NetworkScan),
            device_session: self.session_view(StreamKind::DeviceScan),
        }
    }
}
