//! In-memory push source whose streams are fed by the test.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use airmap_common::error::BackendError;
use airmap_core::backend::{ChunkStream, PushSource};
use airmap_core::session::ScanRequest;
use async_trait::async_trait;
use futures_util::stream;
use tokio::sync::mpsc;

pub type Feed = mpsc::UnboundedSender<Result<String, BackendError>>;

/// One opened stream. Dropping `feed` ends it.
pub struct Subscription {
    pub request: ScanRequest,
    pub feed: Feed,
}

pub struct FakeSource {
    failures: Mutex<VecDeque<BackendError>>,
    opened: mpsc::UnboundedSender<Subscription>,
}

pub struct Subscriptions(mpsc::UnboundedReceiver<Subscription>);

impl FakeSource {
    pub fn new() -> (Arc<Self>, Subscriptions) {
        let (opened, rx) = mpsc::unbounded_channel();
        let source = Self {
            failures: Mutex::new(VecDeque::new()),
            opened,
        };
        (Arc::new(source), Subscriptions(rx))
    }

    /// Makes the next `subscribe` call fail with `error`.
    pub fn fail_next(&self, error: BackendError) {
        self.failures.lock().unwrap().push_back(error);
    }
}

impl Subscriptions {
    pub async fn next(&mut self) -> Subscription {
        tokio::time::timeout(Duration::from_secs(5), self.0.recv())
            .await
            .expect("no subscription was opened")
            .expect("source dropped")
    }
}

#[async_trait]
impl PushSource for FakeSource {
    async fn subscribe(&self, request: &ScanRequest) -> Result<ChunkStream, BackendError> {
        if let Some(error) = self.failures.lock().unwrap().pop_front() {
            return Err(error);
        }

        let (feed, rx) = mpsc::unbounded_channel();
        let _ = self.opened.send(Subscription {
            request: request.clone(),
            feed,
        });

        Ok(Box::pin(stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        })))
    }
}
