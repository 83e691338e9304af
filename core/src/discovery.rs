//! # Discovery Service
//!
//! Runs the live subscriptions and feeds their deliveries into the shared
//! [`Aggregator`].
//!
//! Each started stream gets its own tokio task, tagged with the
//! [`SessionTicket`] it was started under. Chunks are applied one at a time
//! under the aggregator lock, and every change is published as a fresh
//! [`DiscoverySnapshot`] on a `watch` channel for the presentation layer.
//!
//! Starting a stream of a kind that is already running closes the old session
//! *before* the new task is spawned; whatever the old task still delivers is
//! tagged with a superseded generation and dropped.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use airmap_common::config::Config;
use airmap_common::error::BackendError;
use airmap_common::network::session::StreamKind;
use futures_util::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::aggregator::{Aggregator, ChunkOutcome, DiscoverySnapshot};
use crate::backend::{BackendClient, PushSource};
use crate::session::{ScanRequest, SessionTicket};
use crate::vendors::MacOuiRepo;

struct Shared {
    aggregator: Mutex<Aggregator>,
    updates: watch::Sender<DiscoverySnapshot>,
}

impl Shared {
    fn locked(&self) -> MutexGuard<'_, Aggregator> {
        self.aggregator.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Must be called with the aggregator lock held so that snapshots go out
    /// in the order the changes were made.
    fn publish(&self, aggregator: &Aggregator) {
        self.updates.send_replace(aggregator.snapshot());
    }

    fn deliver(&self, ticket: SessionTicket, raw: &str) -> ChunkOutcome {
        let mut aggregator = self.locked();
        let outcome = aggregator.apply_chunk(ticket, raw);
        match &outcome {
            ChunkOutcome::Stale => {}
            ChunkOutcome::Networks(stats) if !stats.changed() => {}
            _ => self.publish(&aggregator),
        }
        outcome
    }

    fn fail(&self, ticket: SessionTicket, error: &BackendError) {
        let mut aggregator = self.locked();
        if aggregator.transport_error(ticket, error) {
            self.publish(&aggregator);
        }
    }

    fn finish(&self, ticket: SessionTicket) {
        let mut aggregator = self.locked();
        if aggregator.finish(ticket) {
            self.publish(&aggregator);
        }
    }
}

enum StreamEnd {
    Superseded,
    Failed(BackendError),
    Exhausted,
}

/// Owns the discovery state and the tasks streaming into it.
pub struct DiscoveryHub {
    shared: Arc<Shared>,
    source: Arc<dyn PushSource>,
    stall_timeout: Option<Duration>,
    tasks: Mutex<HashMap<StreamKind, JoinHandle<()>>>,
}

impl DiscoveryHub {
    pub fn new(source: Arc<dyn PushSource>, aggregator: Aggregator) -> Self {
        let (updates, _) = watch::channel(aggregator.snapshot());
        Self {
            shared: Arc::new(Shared {
                aggregator: Mutex::new(aggregator),
                updates,
            }),
            source,
            stall_timeout: None,
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// Hub streaming from the backend in `cfg`, plus the client for its
    /// control calls.
    pub fn connect(cfg: &Config) -> Result<(Self, Arc<BackendClient>), BackendError> {
        let client = Arc::new(BackendClient::new(&cfg.backend)?);

        let mut aggregator = Aggregator::new();
        if !cfg.no_vendor {
            aggregator = aggregator.with_vendors(Box::new(MacOuiRepo));
        }

        let hub = Self::new(client.clone(), aggregator).with_stall_timeout(cfg.stall_timeout);
        Ok((hub, client))
    }

    /// Fails a stream that delivers nothing for `timeout`.
    pub fn with_stall_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.stall_timeout = timeout;
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<DiscoverySnapshot> {
        self.shared.updates.subscribe()
    }

    pub fn snapshot(&self) -> DiscoverySnapshot {
        self.shared.locked().snapshot()
    }

    /// Opens a new subscription, superseding any running one of the same kind.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, request: ScanRequest) -> SessionTicket {
        let mut tasks = self.tasks();

        let ticket = {
            let mut aggregator = self.shared.locked();
            let ticket = aggregator.begin(&request);
            self.shared.publish(&aggregator);
            ticket
        };

        info!(kind = %ticket.kind, generation = %ticket.generation, "starting stream");
        let handle = tokio::spawn(drive(
            Arc::clone(&self.shared),
            Arc::clone(&self.source),
            request,
            ticket,
            self.stall_timeout,
        ));

        if let Some(previous) = tasks.insert(ticket.kind, handle) {
            previous.abort();
        }
        ticket
    }

    /// Closes the current session of `kind`. Safe to call repeatedly.
    pub fn stop(&self, kind: StreamKind) {
        let mut tasks = self.tasks();
        {
            let mut aggregator = self.shared.locked();
            aggregator.stop(kind);
            self.shared.publish(&aggregator);
        }
        if let Some(handle) = tasks.remove(&kind) {
            debug!(%kind, "aborting stream task");
            handle.abort();
        }
    }

    pub fn stop_all(&self) {
        for kind in StreamKind::ALL {
            self.stop(kind);
        }
    }

    /// Applies one delivery as if it came from the stream `ticket` refers to.
    pub fn deliver(&self, ticket: SessionTicket, raw: &str) -> ChunkOutcome {
        self.shared.deliver(ticket, raw)
    }

    pub fn clear_networks(&self) {
        let mut aggregator = self.shared.locked();
        aggregator.clear_networks();
        self.shared.publish(&aggregator);
    }

    fn tasks(&self) -> MutexGuard<'_, HashMap<StreamKind, JoinHandle<()>>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for DiscoveryHub {
    fn drop(&mut self) {
        for (_, handle) in self.tasks().drain() {
            handle.abort();
        }
    }
}

async fn drive(
    shared: Arc<Shared>,
    source: Arc<dyn PushSource>,
    request: ScanRequest,
    ticket: SessionTicket,
    stall_timeout: Option<Duration>,
) {
    let mut chunks = match source.subscribe(&request).await {
        Ok(chunks) => chunks,
        Err(e) => {
            shared.fail(ticket, &e);
            shared.finish(ticket);
            return;
        }
    };

    let end = loop {
        let next = match stall_timeout {
            Some(limit) => match tokio::time::timeout(limit, chunks.next()).await {
                Ok(next) => next,
                Err(_) => Some(Err(BackendError::Stalled(limit))),
            },
            None => chunks.next().await,
        };

        match next {
            Some(Ok(raw)) => {
                if shared.deliver(ticket, &raw) == ChunkOutcome::Stale {
                    break StreamEnd::Superseded;
                }
            }
            Some(Err(e)) => break StreamEnd::Failed(e),
            None => break StreamEnd::Exhausted,
        }
    };

    match end {
        StreamEnd::Superseded => {
            debug!(kind = %ticket.kind, generation = %ticket.generation, "stream superseded");
        }
        StreamEnd::Failed(e) => {
            shared.fail(ticket, &e);
            drop(chunks);
            shared.finish(ticket);
        }
        StreamEnd::Exhausted => {
            debug!(kind = %ticket.kind, generation = %ticket.generation, "stream ended");
            shared.finish(ticket);
        }
    }
}
