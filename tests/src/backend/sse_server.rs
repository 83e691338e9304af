#![cfg(test)]
//! Exercises the HTTP client against a loopback server that speaks just
//! enough HTTP/1.1 to answer one request per connection.

use std::sync::Arc;
use std::time::Duration;

use airmap_common::error::BackendError;
use airmap_common::network::session::{SessionState, StreamKind};
use airmap_common::network::target::ScanTarget;
use airmap_core::aggregator::Aggregator;
use airmap_core::backend::{BackendClient, PushSource};
use airmap_core::discovery::DiscoveryHub;
use airmap_core::session::ScanRequest;
use futures_util::StreamExt;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

const MY_WIFI: &str = "AA:BB:CC:DD:EE:FF, 2024-05-01 10:00:00, 2024-05-01 10:00:09, 6, 54, WPA2, CCMP, PSK, -40, 10, 0, 0.0.0.0, 6, MyWifi, ";
const CAFE: &str = "11:22:33:44:55:66, 2024-05-01 10:00:01, 2024-05-01 10:00:08, 11, 54, WPA2, CCMP, PSK, -71, 3, 0, 0.0.0.0, 4, Cafe, ";

fn event_stream(events: &[&str]) -> String {
    let mut body = String::new();
    for event in events {
        body.push_str(&format!("data: {event}\n\n"));
        body.push_str(": keep-alive\n\n");
    }
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nCache-Control: no-cache\r\nConnection: close\r\n\r\n{body}"
    )
}

fn json_response(status: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

/// Answers one connection per response, in order, and hands back the
/// request heads it saw.
async fn serve(responses: Vec<String>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let mut heads = Vec::new();
        for response in responses {
            let (mut socket, _) = listener.accept().await.unwrap();
            heads.push(read_request(&mut socket).await);
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        }
        heads
    });

    (format!("http://{addr}"), handle)
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let head_end = loop {
        let n = socket.read(&mut chunk).await.unwrap();
        assert!(n > 0, "client closed before sending a request");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let body_len = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);

    while buf.len() < head_end + body_len {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    head
}

#[tokio::test]
async fn network_stream_feeds_the_hub() {
    let (url, server) = serve(vec![event_stream(&[
        "Station MAC, First time seen, Last time seen, Power, # packets, BSSID, Probed ESSIDs",
        MY_WIFI,
        MY_WIFI,
        CAFE,
    ])])
    .await;

    let client = BackendClient::new(&url).unwrap();
    let hub = DiscoveryHub::new(Arc::new(client), Aggregator::new());
    let mut updates = hub.subscribe();
    hub.start(ScanRequest::Networks);

    let snapshot = tokio::time::timeout(
        Duration::from_secs(5),
        updates.wait_for(|s| s.session(StreamKind::NetworkScan).state == SessionState::Closed),
    )
    .await
    .expect("stream never closed")
    .unwrap()
    .clone();

    let names: Vec<&str> = snapshot.networks.iter().map(|n| n.display_name.as_str()).collect();
    assert_eq!(names, ["MyWifi", "Cafe"]);
    assert_eq!(snapshot.network_session.last_report, None);

    let heads = server.await.unwrap();
    assert!(heads[0].starts_with("GET /get-networks "), "{}", heads[0]);
    assert!(
        heads[0].to_ascii_lowercase().contains("accept: text/event-stream"),
        "{}",
        heads[0]
    );
}

#[tokio::test]
async fn device_subscription_sends_target() {
    let message = r#"{"type":"devices","data":{"first_device":{"mac":"AA"},"last_device":{"mac":"BB"}}}"#;
    let (url, server) = serve(vec![event_stream(&[message])]).await;

    let client = BackendClient::new(&url).unwrap();
    let target = ScanTarget::new("AA:BB:CC:DD:EE:FF", 6);
    let chunks: Vec<Result<String, BackendError>> = client
        .subscribe(&ScanRequest::Devices(target))
        .await
        .unwrap()
        .collect()
        .await;

    assert_eq!(chunks, vec![Ok(message.to_string())]);

    let heads = server.await.unwrap();
    assert!(
        heads[0].starts_with(
            "GET /get-devices-in-network?bssid=AA%3ABB%3ACC%3ADD%3AEE%3AFF&channel=6 "
        ),
        "{}",
        heads[0]
    );
}

#[tokio::test]
async fn rejected_subscription_is_an_api_error() {
    let (url, _server) = serve(vec![json_response(
        "400 Bad Request",
        r#"{"error":"No monitor interface running"}"#,
    )])
    .await;

    let client = BackendClient::new(&url).unwrap();
    let err = match client.subscribe(&ScanRequest::Networks).await {
        Ok(_) => panic!("subscription should be rejected"),
        Err(e) => e,
    };

    assert_eq!(
        err,
        BackendError::Api {
            status: 400,
            message: "No monitor interface running".to_string(),
        }
    );
}

#[tokio::test]
async fn control_calls_decode_replies() {
    let (url, server) = serve(vec![
        json_response("200 OK", r#"{"devices":["wlan0","wlan1"]}"#),
        json_response(
            "200 OK",
            r#"{"monitor_interface":"wlan0mon","output":"monitor mode enabled"}"#,
        ),
        json_response("500 Internal Server Error", r#"{"error":"airmon-ng failed"}"#),
        json_response("200 OK", r#"{"message":"Scan stopped"}"#),
    ])
    .await;

    let client = BackendClient::new(&url).unwrap();

    assert_eq!(client.list_devices().await.unwrap(), ["wlan0", "wlan1"]);

    let status = client.start_monitor("wlan0").await.unwrap();
    assert_eq!(status.monitor_interface.as_deref(), Some("wlan0mon"));

    let err = client.stop_monitor("wlan0mon").await.unwrap_err();
    assert_eq!(
        err,
        BackendError::Api {
            status: 500,
            message: "airmon-ng failed".to_string(),
        }
    );

    assert_eq!(client.stop_scan().await.unwrap(), "Scan stopped");

    let heads = server.await.unwrap();
    assert!(heads[0].starts_with("GET /list-devices "));
    assert!(heads[1].starts_with("POST /start-monitor "));
    assert!(heads[2].starts_with("POST /stop-monitor "));
    assert!(heads[3].starts_with("POST /stop-scan "));
}
