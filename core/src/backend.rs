//! HTTP client for the capture backend.
//!
//! Control calls (`/list-devices`, `/start-monitor`, ...) are plain JSON
//! requests with timeouts. The two discovery endpoints are Server-Sent Event
//! streams and are opened through [`PushSource`] without a read timeout.

use std::pin::Pin;
use std::time::Duration;

use airmap_common::error::BackendError;
use async_trait::async_trait;
use futures_util::Stream;
use reqwest::header::ACCEPT;
use reqwest::{Client, Response, Url};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::session::ScanRequest;

pub mod sse;

/// TCP connection timeout for every request.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Whole-request timeout for control calls. Switching an interface to
/// monitor mode can take several seconds.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const NETWORKS_PATH: &str = "/get-networks";
const DEVICES_PATH: &str = "/get-devices-in-network";

/// Raw event payloads of one subscription, in arrival order.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<String, BackendError>> + Send>>;

/// Anything that can open a discovery push stream.
#[async_trait]
pub trait PushSource: Send + Sync {
    async fn subscribe(&self, request: &ScanRequest) -> Result<ChunkStream, BackendError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MonitorStatus {
    #[serde(default)]
    pub monitor_interface: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeviceList {
    devices: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    message: Option<String>,
}

pub struct BackendClient {
    endpoint: String,
    client: Client,
    stream_client: Client,
}

impl BackendClient {
    pub fn new(endpoint: &str) -> Result<Self, BackendError> {
        let clean = endpoint.trim_end_matches('/');
        Url::parse(clean)
            .map_err(|e| BackendError::Unreachable(format!("invalid backend url '{endpoint}': {e}")))?;

        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(map_error)?;
        let stream_client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(map_error)?;

        Ok(Self {
            endpoint: clean.to_string(),
            client,
            stream_client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Network interfaces the backend can put into monitor mode.
    pub async fn list_devices(&self) -> Result<Vec<String>, BackendError> {
        let url = format!("{}/list-devices", self.endpoint);
        let resp = self.client.get(&url).send().await.map_err(map_error)?;
        let list: DeviceList = check_status(resp).await?.json().await.map_err(map_error)?;
        Ok(list.devices)
    }

    pub async fn start_monitor(&self, interface: &str) -> Result<MonitorStatus, BackendError> {
        self.post_json("/start-monitor", &json!({ "interface": interface }))
            .await
    }

    pub async fn stop_monitor(&self, interface: &str) -> Result<MonitorStatus, BackendError> {
        self.post_json("/stop-monitor", &json!({ "interface": interface }))
            .await
    }

    /// Asks the backend to kill its capture process.
    pub async fn stop_scan(&self) -> Result<String, BackendError> {
        let reply: Message = self.post_json("/stop-scan", &json!({})).await?;
        Ok(reply.message.unwrap_or_default())
    }

    async fn post_json<T>(&self, path: &str, body: &Value) -> Result<T, BackendError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let url = format!("{}{path}", self.endpoint);
        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(map_error)?;
        check_status(resp).await?.json().await.map_err(map_error)
    }
}

#[async_trait]
impl PushSource for BackendClient {
    async fn subscribe(&self, request: &ScanRequest) -> Result<ChunkStream, BackendError> {
        let builder = match request {
            ScanRequest::Networks => self
                .stream_client
                .get(format!("{}{NETWORKS_PATH}", self.endpoint)),
            ScanRequest::Devices(target) => {
                let channel = target.channel.to_string();
                self.stream_client
                    .get(format!("{}{DEVICES_PATH}", self.endpoint))
                    .query(&[("bssid", target.bssid.as_str()), ("channel", channel.as_str())])
            }
        };

        let resp = builder
            .header(ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(map_error)?;
        let resp = check_status(resp).await?;
        debug!(kind = %request.kind(), "subscribed to {}", resp.url());

        Ok(Box::pin(sse::events(resp.bytes_stream())))
    }
}

/// Turns non-2xx answers into [`BackendError::Api`], preferring the
/// backend's `{"error": ...}` body over the raw text.
async fn check_status(resp: Response) -> Result<Response, BackendError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|json| {
            json.get("error")
                .or_else(|| json.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string());

    Err(BackendError::Api {
        status: status.as_u16(),
        message,
    })
}

fn map_error(e: reqwest::Error) -> BackendError {
    if e.is_connect() {
        BackendError::Unreachable(e.to_string())
    } else if e.is_decode() {
        BackendError::Decode(e.to_string())
    } else {
        BackendError::Transport(e.to_string())
    }
}
