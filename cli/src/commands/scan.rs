use std::time::{Duration, Instant};

use anyhow::Context;
use colored::*;
use tracing::{debug, info_span, warn};

use crate::commands::live::{self, Ending};
use crate::mprint;
use crate::terminal::{colors, format, print, spinner};
use airmap_common::network::record::NetworkRecord;
use airmap_common::network::session::StreamKind;
use airmap_common::{config::Config, success};
use airmap_core::discovery::DiscoveryHub;
use airmap_core::session::ScanRequest;

pub async fn scan(json: bool, cfg: &Config) -> anyhow::Result<()> {
    let (hub, client) = DiscoveryHub::connect(cfg)?;

    let span = info_span!("scan", indicatif.pb_show = true);
    let guard = span.enter();
    spinner::waiting(&span, "networks");

    let updates = hub.subscribe();
    let start_time: Instant = Instant::now();
    hub.start(ScanRequest::Networks);

    let mut shown: usize = 0;
    let (snapshot, ending) = live::follow(&hub, StreamKind::NetworkScan, updates, |snapshot| {
        for network in snapshot.networks.iter().skip(shown) {
            if cfg.quiet < 2 {
                print::print_status(format::network_line(network));
            }
        }
        shown = snapshot.networks.len();
        spinner::report_networks(&span, shown);
    })
    .await;

    drop(guard);

    match client.stop_scan().await {
        Ok(message) => debug!("Backend capture stopped: {message}"),
        Err(e) => warn!("Could not stop the backend capture: {e}"),
    }

    let view = snapshot.session(StreamKind::NetworkScan);
    if json {
        let out = serde_json::to_string_pretty(&snapshot.networks).context("encoding networks")?;
        println!("{out}");
    } else {
        scan_ends(&snapshot.networks, start_time.elapsed(), cfg);
    }

    match (&view.failure, ending) {
        (Some(reason), Ending::Closed) => anyhow::bail!("network scan ended early: {reason}"),
        _ => Ok(()),
    }
}

fn scan_ends(networks: &[NetworkRecord], total_time: Duration, cfg: &Config) {
    if networks.is_empty() {
        print::header("ZERO NETWORKS DETECTED", cfg.quiet);
        print::no_results();
        return;
    }

    if cfg.quiet > 0 {
        mprint!();
    }

    print::header("Network Discovery", cfg.quiet);
    print_networks(networks, cfg);
    print_summary(networks.len(), total_time, cfg);
}

fn print_networks(networks: &[NetworkRecord], cfg: &Config) {
    if cfg.quiet >= 2 {
        return;
    }
    for (idx, network) in networks.iter().enumerate() {
        print::tree_head(idx, &network.display_name);
        print::as_tree_one_level(format::network_to_details(network));
        if idx + 1 != networks.len() {
            mprint!();
        }
    }
}

fn print_summary(count: usize, total_time: Duration, cfg: &Config) {
    let found: ColoredString = format!("{count} networks").bold().green();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output: &ColoredString = &format!("Scan Complete: {found} identified in {total_time}")
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
