//! # Device Scan Target
//!
//! A device scan probes one network, identified by its hardware address and
//! the channel it was last seen on.
//!
//! Accepted textual forms:
//! * `AA:BB:CC:DD:EE:FF@6`
//! * `AA:BB:CC:DD:EE:FF,6`

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::network::mac;
use crate::network::record::NetworkRecord;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ScanTarget {
    pub bssid: String,
    pub channel: u16,
}

impl ScanTarget {
    pub fn new(bssid: impl Into<String>, channel: u16) -> Self {
        Self {
            bssid: bssid.into(),
            channel,
        }
    }
}

impl TryFrom<&NetworkRecord> for ScanTarget {
    type Error = String;

    fn try_from(record: &NetworkRecord) -> Result<Self, Self::Error> {
        match record.channel {
            Some(channel) if channel > 0 && !record.identity.is_empty() => {
                Ok(ScanTarget::new(record.identity.clone(), channel))
            }
            _ => Err(format!("network {} has no usable channel", record.identity)),
        }
    }
}

impl FromStr for ScanTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((bssid, channel)) = s.rsplit_once(['@', ',']) else {
            return Err(format!("invalid target: {s} (expected BSSID@CHANNEL)"));
        };

        let bssid = parse_bssid(bssid)?;
        let channel = parse_channel(channel)?;

        Ok(ScanTarget { bssid, channel })
    }
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.bssid, self.channel)
    }
}

fn parse_bssid(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    if !mac::is_mac(trimmed) {
        return Err(format!("Invalid BSSID '{trimmed}'"));
    }
    Ok(trimmed.to_ascii_uppercase())
}

fn parse_channel(s: &str) -> Result<u16, String> {
    let trimmed = s.trim();
    let channel = trimmed
        .parse::<u16>()
        .map_err(|e| format!("Invalid channel '{trimmed}': {e}"))?;
    if channel == 0 {
        return Err("Channel must be positive".to_string());
    }
    Ok(channel)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
