use serde::Serialize;

pub const UNKNOWN: &str = "unknown";

/// A station seen inside one network during a device scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceRecord {
    pub mac_address: String,
    pub ip_address: String,
    pub hostname: String,
    pub vendor: String,
    pub signal_level: Option<String>,
    pub probed_networks: Vec<String>,
}

impl DeviceRecord {
    pub fn new(mac_address: impl Into<String>) -> Self {
        Self {
            mac_address: mac_address.into(),
            ip_address: UNKNOWN.to_string(),
            hostname: UNKNOWN.to_string(),
            vendor: UNKNOWN.to_string(),
            signal_level: None,
            probed_networks: Vec::new(),
        }
    }

    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = vendor.into();
        self
    }

    pub fn has_known_vendor(&self) -> bool {
        self.vendor != UNKNOWN
    }
}
