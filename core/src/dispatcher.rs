//! Decoding of device scan messages.
//!
//! The device stream pushes JSON objects tagged by a `type` field:
//!
//! ```json
//! {"type": "devices", "data": {"first_device": {...}, "last_device": {...}}}
//! {"type": "devices", "data": {"devices": [{...}, {...}]}}
//! {"type": "error", "message": "..."}
//! ```
//!
//! Decoding never fails the session: every payload maps to a [`DispatchResult`].

use std::collections::HashSet;

use airmap_common::network::device::{DeviceRecord, UNKNOWN};
use serde::Deserialize;
use serde_json::Value;

const DEVICES: &str = "devices";
const ERROR: &str = "error";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchResult {
    /// Replacement device list for the probed network.
    Devices(Vec<DeviceRecord>),
    /// The backend reported a failure; device state stays as it is.
    ServerError(String),
    /// Well formed message with a tag this client does not handle.
    UnknownKind(String),
    /// Payload could not be decoded at all.
    DecodeError(String),
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DevicesPayload {
    #[serde(default)]
    devices: Option<Vec<WireDevice>>,
    #[serde(default)]
    first_device: Option<WireDevice>,
    #[serde(default)]
    last_device: Option<WireDevice>,
}

#[derive(Debug, Deserialize)]
struct WireDevice {
    #[serde(alias = "mac_address")]
    mac: String,
    #[serde(default, alias = "ip_address")]
    ip: Option<String>,
    #[serde(default)]
    hostname: Option<String>,
    #[serde(default)]
    vendor: Option<String>,
    #[serde(default)]
    power: Option<Value>,
    #[serde(default)]
    probed_essids: Option<Value>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MessageDispatcher;

impl MessageDispatcher {
    pub fn dispatch(&self, payload: &str) -> DispatchResult {
        let envelope: Envelope = match serde_json::from_str(payload.trim()) {
            Ok(envelope) => envelope,
            Err(e) => return DispatchResult::DecodeError(e.to_string()),
        };

        match envelope.kind.as_str() {
            DEVICES => decode_devices(envelope.data),
            ERROR => DispatchResult::ServerError(
                envelope
                    .message
                    .unwrap_or_else(|| "unspecified backend error".to_string()),
            ),
            other => DispatchResult::UnknownKind(other.to_string()),
        }
    }
}

fn decode_devices(data: Option<Value>) -> DispatchResult {
    let Some(data) = data else {
        return DispatchResult::DecodeError("devices message without data".to_string());
    };

    let payload: DevicesPayload = match serde_json::from_value(data) {
        Ok(payload) => payload,
        Err(e) => return DispatchResult::DecodeError(e.to_string()),
    };

    let wire: Vec<WireDevice> = match payload.devices {
        Some(devices) => devices,
        None => payload
            .first_device
            .into_iter()
            .chain(payload.last_device)
            .collect(),
    };

    let mut seen = HashSet::new();
    let devices = wire
        .into_iter()
        .filter_map(to_record)
        .filter(|device| seen.insert(device.mac_address.clone()))
        .collect();

    DispatchResult::Devices(devices)
}

fn to_record(wire: WireDevice) -> Option<DeviceRecord> {
    let mac_address = wire.mac.trim();
    if mac_address.is_empty() {
        return None;
    }

    Some(DeviceRecord {
        mac_address: mac_address.to_string(),
        ip_address: or_unknown(wire.ip),
        hostname: or_unknown(wire.hostname),
        vendor: or_unknown(wire.vendor),
        signal_level: wire.power.and_then(value_to_string),
        probed_networks: wire.probed_essids.map(essid_list).unwrap_or_default(),
    })
}

fn or_unknown(field: Option<String>) -> String {
    field
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn essid_list(value: Value) -> Vec<String> {
    let names: Vec<String> = match value {
        Value::String(s) => s.split(',').map(str::to_string).collect(),
        Value::Array(items) => items.into_iter().filter_map(value_to_string).collect(),
        _ => Vec::new(),
    };
    names
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}
