use std::time::{Duration, Instant};

use anyhow::Context;
use colored::*;
use tracing::{debug, info_span, warn};

use crate::commands::live::{self, Ending};
use crate::mprint;
use crate::terminal::{colors, format, print, spinner};
use airmap_common::network::device::{DeviceRecord, UNKNOWN};
use airmap_common::network::session::StreamKind;
use airmap_common::network::target::ScanTarget;
use airmap_common::{config::Config, success};
use airmap_core::discovery::DiscoveryHub;
use airmap_core::session::ScanRequest;

pub async fn probe(target: ScanTarget, json: bool, cfg: &Config) -> anyhow::Result<()> {
    let (hub, client) = DiscoveryHub::connect(cfg)?;

    let span = info_span!("probe", indicatif.pb_show = true);
    let guard = span.enter();
    spinner::waiting(&span, &format!("devices on {target}"));

    let updates = hub.subscribe();
    let start_time: Instant = Instant::now();
    hub.start(ScanRequest::Devices(target.clone()));

    let mut last_report: Option<String> = None;
    let (snapshot, ending) = live::follow(&hub, StreamKind::DeviceScan, updates, |snapshot| {
        spinner::report_devices(&span, snapshot.devices.len());

        let view = snapshot.session(StreamKind::DeviceScan);
        // A failure becomes the command error instead.
        if view.failure.is_none() && view.last_report != last_report {
            if let Some(report) = &view.last_report {
                warn!("{report}");
            }
            last_report = view.last_report.clone();
        }
    })
    .await;

    drop(guard);

    match client.stop_scan().await {
        Ok(message) => debug!("Backend capture stopped: {message}"),
        Err(e) => warn!("Could not stop the backend capture: {e}"),
    }

    if json {
        let out = serde_json::to_string_pretty(&snapshot.devices).context("encoding devices")?;
        println!("{out}");
    } else {
        probe_ends(&target, &snapshot.devices, start_time.elapsed(), cfg);
    }

    let view = snapshot.session(StreamKind::DeviceScan);
    match (&view.failure, ending) {
        (Some(reason), Ending::Closed) => {
            anyhow::bail!("device scan of {target} ended early: {reason}")
        }
        _ => Ok(()),
    }
}

fn probe_ends(target: &ScanTarget, devices: &[DeviceRecord], total_time: Duration, cfg: &Config) {
    if devices.is_empty() {
        print::header("ZERO DEVICES DETECTED", cfg.quiet);
        print::no_results();
        return;
    }

    if cfg.quiet > 0 {
        mprint!();
    }

    print::header(&format!("Devices on {}", target.bssid), cfg.quiet);
    print::aligned_line("Channel", target.channel.to_string().color(colors::CHANNEL));
    mprint!();
    print_devices(devices, cfg);
    print_summary(devices.len(), total_time, cfg);
}

fn print_devices(devices: &[DeviceRecord], cfg: &Config) {
    if cfg.quiet >= 2 {
        return;
    }
    for (idx, device) in devices.iter().enumerate() {
        print::tree_head(idx, device_label(device));
        print::as_tree_one_level(format::device_to_details(device));
        if idx + 1 != devices.len() {
            mprint!();
        }
    }
}

/// Stations rarely report a hostname, so fall back to their address.
fn device_label(device: &DeviceRecord) -> &str {
    if device.hostname == UNKNOWN {
        &device.mac_address
    } else {
        &device.hostname
    }
}

fn print_summary(count: usize, total_time: Duration, cfg: &Config) {
    let found: ColoredString = format!("{count} devices").bold().green();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output: &ColoredString = &format!("Probe Complete: {found} identified in {total_time}")
        .color(colors::TEXT_DEFAULT);

    match cfg.quiet {
        0 => {
            print::fat_separator();
            print::centerln(output);
        }
        _ => {
            mprint!();
            success!("{}", output)
        }
    }
}
