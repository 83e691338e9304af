#![cfg(test)]

mod fake_source;

use std::time::Duration;

use airmap_common::error::BackendError;
use airmap_common::network::session::{SessionState, StreamKind};
use airmap_common::network::target::ScanTarget;
use airmap_core::aggregator::{Aggregator, ChunkOutcome, DiscoverySnapshot};
use airmap_core::discovery::DiscoveryHub;
use airmap_core::session::ScanRequest;
use fake_source::FakeSource;
use tokio::sync::watch;

const HEADER: &str = "Station MAC, First time seen, Last time seen, Power, # packets, BSSID, Probed ESSIDs";
const MY_WIFI: &str = "AA:BB:CC:DD:EE:FF, 2024-05-01 10:00:00, 2024-05-01 10:00:09, 6, 54, WPA2, CCMP, PSK, -40, 10, 0, 0.0.0.0, 6, MyWifi, ";
const CAFE: &str = "11:22:33:44:55:66, 2024-05-01 10:00:01, 2024-05-01 10:00:08, 11, 54, WPA2, CCMP, PSK, -71, 3, 0, 0.0.0.0, 4, Cafe, ";
const TWO_DEVICES: &str =
    r#"{"type":"devices","data":{"first_device":{"mac":"AA"},"last_device":{"mac":"BB"}}}"#;

async fn wait_for<F>(updates: &mut watch::Receiver<DiscoverySnapshot>, what: &str, mut f: F) -> DiscoverySnapshot
where
    F: FnMut(&DiscoverySnapshot) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), updates.wait_for(|s| f(s)))
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {what}"))
        .expect("hub dropped")
        .clone()
}

fn closed(kind: StreamKind) -> impl FnMut(&DiscoverySnapshot) -> bool {
    move |s| s.session(kind).state == SessionState::Closed
}

fn target() -> ScanTarget {
    ScanTarget::new("AA:BB:CC:DD:EE:FF", 6)
}

/// A header row followed by the same network twice ends up as one entry.
#[tokio::test]
async fn header_and_duplicate_rows_merge_into_one_network() {
    let (source, mut subscriptions) = FakeSource::new();
    let hub = DiscoveryHub::new(source, Aggregator::new());
    let mut updates = hub.subscribe();

    hub.start(ScanRequest::Networks);
    let sub = subscriptions.next().await;
    assert_eq!(sub.request, ScanRequest::Networks);

    for chunk in [HEADER, MY_WIFI, MY_WIFI] {
        sub.feed.send(Ok(chunk.to_string())).unwrap();
    }
    drop(sub);

    let snapshot = wait_for(&mut updates, "end of stream", closed(StreamKind::NetworkScan)).await;
    assert_eq!(snapshot.networks.len(), 1);
    assert_eq!(snapshot.networks[0].identity, "AA:BB:CC:DD:EE:FF");
    assert_eq!(snapshot.networks[0].channel, Some(6));
    assert_eq!(snapshot.networks[0].display_name, "MyWifi");
    assert_eq!(snapshot.network_session.last_report, None);
}

#[tokio::test]
async fn restart_discards_deliveries_of_the_old_session() {
    let (source, mut subscriptions) = FakeSource::new();
    let hub = DiscoveryHub::new(source, Aggregator::new());
    let mut updates = hub.subscribe();

    let old = hub.start(ScanRequest::Networks);
    let old_sub = subscriptions.next().await;

    let new = hub.start(ScanRequest::Networks);
    let new_sub = subscriptions.next().await;
    assert!(new.generation > old.generation);

    // A chunk that was in flight when the restart happened.
    assert_eq!(hub.deliver(old, MY_WIFI), ChunkOutcome::Stale);
    let _ = old_sub.feed.send(Ok(MY_WIFI.to_string()));

    new_sub.feed.send(Ok(CAFE.to_string())).unwrap();
    let snapshot = wait_for(&mut updates, "new session data", |s| !s.networks.is_empty()).await;

    let names: Vec<&str> = snapshot.networks.iter().map(|n| n.display_name.as_str()).collect();
    assert_eq!(names, ["Cafe"]);
    assert_eq!(snapshot.network_session.generation, Some(new.generation));
    assert_eq!(snapshot.network_session.state, SessionState::Active);
}

#[tokio::test]
async fn network_and_device_streams_run_side_by_side() {
    let (source, mut subscriptions) = FakeSource::new();
    let hub = DiscoveryHub::new(source, Aggregator::new());
    let mut updates = hub.subscribe();

    hub.start(ScanRequest::Networks);
    let networks = subscriptions.next().await;
    hub.start(ScanRequest::Devices(target()));
    let devices = subscriptions.next().await;
    assert_eq!(devices.request, ScanRequest::Devices(target()));

    networks.feed.send(Ok(MY_WIFI.to_string())).unwrap();
    devices.feed.send(Ok(TWO_DEVICES.to_string())).unwrap();
    let snapshot = wait_for(&mut updates, "both streams", |s| {
        !s.networks.is_empty() && s.devices.len() == 2
    })
    .await;
    assert_eq!(snapshot.device_target, Some(target()));

    hub.stop(StreamKind::DeviceScan);
    let snapshot = hub.snapshot();
    assert_eq!(snapshot.device_session.state, SessionState::Closed);
    assert_eq!(snapshot.network_session.state, SessionState::Active);

    networks.feed.send(Ok(CAFE.to_string())).unwrap();
    let snapshot = wait_for(&mut updates, "second network", |s| s.networks.len() == 2).await;
    assert_eq!(snapshot.devices.len(), 2);
}

#[tokio::test]
async fn new_device_scan_replaces_device_list() {
    let (source, mut subscriptions) = FakeSource::new();
    let hub = DiscoveryHub::new(source, Aggregator::new());
    let mut updates = hub.subscribe();

    hub.start(ScanRequest::Devices(target()));
    let first = subscriptions.next().await;
    first.feed.send(Ok(TWO_DEVICES.to_string())).unwrap();
    wait_for(&mut updates, "devices", |s| s.devices.len() == 2).await;

    let other = ScanTarget::new("11:22:33:44:55:66", 11);
    hub.start(ScanRequest::Devices(other.clone()));
    let snapshot = hub.snapshot();
    assert!(snapshot.devices.is_empty());
    assert_eq!(snapshot.device_target, Some(other));

    let _ = first.feed.send(Ok(TWO_DEVICES.to_string()));
    let second = subscriptions.next().await;
    second
        .feed
        .send(Ok(r#"{"type":"devices","data":{"devices":[{"mac":"CC"}]}}"#.to_string()))
        .unwrap();
    let snapshot = wait_for(&mut updates, "replacement", |s| !s.devices.is_empty()).await;
    assert_eq!(snapshot.devices.len(), 1);
    assert_eq!(snapshot.devices[0].mac_address, "CC");
}

#[tokio::test]
async fn server_errors_keep_the_device_session_open() {
    let (source, mut subscriptions) = FakeSource::new();
    let hub = DiscoveryHub::new(source, Aggregator::new());
    let mut updates = hub.subscribe();

    hub.start(ScanRequest::Devices(target()));
    let sub = subscriptions.next().await;
    sub.feed.send(Ok(TWO_DEVICES.to_string())).unwrap();
    sub.feed
        .send(Ok(r#"{"type":"error","message":"interface went away"}"#.to_string()))
        .unwrap();

    let snapshot = wait_for(&mut updates, "report", |s| s.device_session.last_report.is_some()).await;
    assert_eq!(snapshot.device_session.state, SessionState::Active);
    assert_eq!(snapshot.device_session.last_report.as_deref(), Some("interface went away"));
    assert_eq!(snapshot.devices.len(), 2);
}

#[tokio::test]
async fn transport_error_closes_session_with_report() {
    let (source, mut subscriptions) = FakeSource::new();
    let hub = DiscoveryHub::new(source, Aggregator::new());
    let mut updates = hub.subscribe();

    hub.start(ScanRequest::Networks);
    let sub = subscriptions.next().await;
    sub.feed.send(Ok(MY_WIFI.to_string())).unwrap();
    sub.feed
        .send(Err(BackendError::Transport("connection reset".to_string())))
        .unwrap();

    let snapshot = wait_for(&mut updates, "failure", closed(StreamKind::NetworkScan)).await;
    assert_eq!(snapshot.networks.len(), 1);
    assert_eq!(
        snapshot.network_session.last_report.as_deref(),
        Some("stream transport failed: connection reset")
    );
    assert_eq!(
        snapshot.network_session.failure.as_deref(),
        Some("stream transport failed: connection reset")
    );
}

#[tokio::test]
async fn benign_reports_before_end_of_stream_are_not_failures() {
    let (source, mut subscriptions) = FakeSource::new();
    let hub = DiscoveryHub::new(source, Aggregator::new());
    let mut updates = hub.subscribe();

    hub.start(ScanRequest::Devices(target()));
    let sub = subscriptions.next().await;
    sub.feed.send(Ok(TWO_DEVICES.to_string())).unwrap();
    sub.feed.send(Ok(r#"{"type":"bogus"}"#.to_string())).unwrap();
    drop(sub);

    let snapshot = wait_for(&mut updates, "end of stream", closed(StreamKind::DeviceScan)).await;
    assert_eq!(
        snapshot.device_session.last_report.as_deref(),
        Some("unknown message type 'bogus'")
    );
    assert_eq!(snapshot.device_session.failure, None);
    assert_eq!(snapshot.devices.len(), 2);
}

#[tokio::test]
async fn failed_subscription_is_reported() {
    let (source, _subscriptions) = FakeSource::new();
    source.fail_next(BackendError::Unreachable("connection refused".to_string()));
    let hub = DiscoveryHub::new(source, Aggregator::new());
    let mut updates = hub.subscribe();

    hub.start(ScanRequest::Networks);

    let snapshot = wait_for(&mut updates, "failure", closed(StreamKind::NetworkScan)).await;
    assert_eq!(
        snapshot.network_session.last_report.as_deref(),
        Some("backend not reachable: connection refused")
    );
}

#[tokio::test]
async fn silent_stream_stalls() {
    let (source, mut subscriptions) = FakeSource::new();
    let hub = DiscoveryHub::new(source, Aggregator::new())
        .with_stall_timeout(Some(Duration::from_millis(50)));
    let mut updates = hub.subscribe();

    hub.start(ScanRequest::Networks);
    // Held open but never written to.
    let _sub = subscriptions.next().await;

    let snapshot = wait_for(&mut updates, "stall", closed(StreamKind::NetworkScan)).await;
    let report = snapshot.network_session.last_report.unwrap();
    assert!(report.starts_with("stream stalled"), "{report}");
}

#[tokio::test]
async fn stop_is_idempotent() {
    let (source, mut subscriptions) = FakeSource::new();
    let hub = DiscoveryHub::new(source, Aggregator::new());

    let ticket = hub.start(ScanRequest::Networks);
    let sub = subscriptions.next().await;

    hub.stop(StreamKind::NetworkScan);
    hub.stop(StreamKind::NetworkScan);
    hub.stop_all();

    assert_eq!(hub.deliver(ticket, MY_WIFI), ChunkOutcome::Stale);
    let _ = sub.feed.send(Ok(MY_WIFI.to_string()));

    let snapshot = hub.snapshot();
    assert!(snapshot.networks.is_empty());
    assert_eq!(snapshot.network_session.state, SessionState::Closed);
    assert_eq!(snapshot.device_session.state, SessionState::Idle);
}

#[tokio::test]
async fn networks_survive_a_scan_restart() {
    let (source, mut subscriptions) = FakeSource::new();
    let hub = DiscoveryHub::new(source, Aggregator::new());
    let mut updates = hub.subscribe();

    hub.start(ScanRequest::Networks);
    let first = subscriptions.next().await;
    first.feed.send(Ok(MY_WIFI.to_string())).unwrap();
    wait_for(&mut updates, "first network", |s| s.networks.len() == 1).await;

    hub.start(ScanRequest::Networks);
    let second = subscriptions.next().await;
    second.feed.send(Ok(CAFE.to_string())).unwrap();
    let snapshot = wait_for(&mut updates, "second network", |s| s.networks.len() == 2).await;

    let names: Vec<&str> = snapshot.networks.iter().map(|n| n.display_name.as_str()).collect();
    assert_eq!(names, ["MyWifi", "Cafe"]);

    hub.clear_networks();
    assert!(hub.snapshot().networks.is_empty());
}
