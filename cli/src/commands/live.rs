use airmap_common::network::session::StreamKind;
use airmap_core::aggregator::DiscoverySnapshot;
use airmap_core::discovery::DiscoveryHub;
use tokio::sync::watch;
use tracing::info;

/// How a followed stream came to an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ending {
    Interrupted,
    Closed,
}

/// Feeds every published snapshot to `on_update` until the session of
/// `kind` closes or the user presses Ctrl-C.
///
/// `updates` must be subscribed before the stream is started so that no
/// transition can be missed.
pub async fn follow<F>(
    hub: &DiscoveryHub,
    kind: StreamKind,
    mut updates: watch::Receiver<DiscoverySnapshot>,
    mut on_update: F,
) -> (DiscoverySnapshot, Ending)
where
    F: FnMut(&DiscoverySnapshot),
{
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let ending = loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("Interrupted, closing the {kind}");
                hub.stop(kind);
                break Ending::Interrupted;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break Ending::Closed;
                }
                let snapshot = updates.borrow_and_update().clone();
                on_update(&snapshot);
                if snapshot.session(kind).state.is_closed() {
                    break Ending::Closed;
                }
            }
        }
    };

    (hub.snapshot(), ending)
}
