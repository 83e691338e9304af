use airmap_common::network::device::DeviceRecord;
use airmap_common::network::record::NetworkRecord;
use colored::*;

use crate::terminal::colors;

pub type Detail = (String, ColoredString);

pub fn network_to_details(network: &NetworkRecord) -> Vec<Detail> {
    let mut details: Vec<Detail> = vec![(
        "BSSID".to_string(),
        network.identity.color(colors::MAC_ADDR),
    )];

    if let Some(channel) = network.channel {
        details.push(("Channel".to_string(), channel.to_string().color(colors::CHANNEL)));
    }
    if let Some(signal) = &network.signal_level {
        details.push(("Signal".to_string(), format!("{signal} dBm").color(colors::SIGNAL)));
    }
    if let Some(encryption) = &network.encryption {
        details.push(("Encryption".to_string(), encryption.color(colors::ENCRYPTION)));
    }
    details
}

pub fn device_to_details(device: &DeviceRecord) -> Vec<Detail> {
    let mut details: Vec<Detail> = vec![
        ("MAC".to_string(), device.mac_address.color(colors::MAC_ADDR)),
        ("IPv4".to_string(), or_dimmed(&device.ip_address, colors::TEXT_DEFAULT)),
        ("Vendor".to_string(), or_dimmed(&device.vendor, colors::TEXT_DEFAULT)),
    ];

    if let Some(signal) = &device.signal_level {
        details.push(("Signal".to_string(), format!("{signal} dBm").color(colors::SIGNAL)));
    }
    if !device.probed_networks.is_empty() {
        details.push(("Probes".to_string(), device.probed_networks.join(", ").normal()));
    }
    details
}

/// One line summary used while a scan is still running.
pub fn network_line(network: &NetworkRecord) -> String {
    let channel = network
        .channel
        .map(|c| format!("ch {c}"))
        .unwrap_or_default();
    format!(
        "{} {} {}",
        network.display_name.color(colors::PRIMARY).bold(),
        network.identity.color(colors::MAC_ADDR),
        channel.color(colors::CHANNEL)
    )
}

fn or_dimmed(value: &str, color: Color) -> ColoredString {
    if value == airmap_common::network::device::UNKNOWN {
        value.color(colors::UNKNOWN).italic()
    } else {
        value.color(color)
    }
}
