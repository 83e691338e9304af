use airmap_common::{config::Config, success};
use airmap_core::backend::{BackendClient, MonitorStatus};
use colored::*;

use crate::commands::MonitorAction;
use crate::terminal::{colors, print};

pub async fn monitor(action: MonitorAction, cfg: &Config) -> anyhow::Result<()> {
    let client = BackendClient::new(&cfg.backend)?;

    match action {
        MonitorAction::Start { interface } => {
            print::header("enabling monitor mode", cfg.quiet);
            let status: MonitorStatus = client.start_monitor(&interface).await?;
            print_output(&status, cfg);
            match &status.monitor_interface {
                Some(monitor) => success!("{interface} is capturing as {}", monitor.bold()),
                None => success!("Monitor mode requested on {}", interface.bold()),
            }
        }
        MonitorAction::Stop { interface } => {
            print::header("disabling monitor mode", cfg.quiet);
            let status: MonitorStatus = client.stop_monitor(&interface).await?;
            print_output(&status, cfg);
            success!("{} is back in managed mode", interface.bold());
        }
    }
    Ok(())
}

/// Echoes what the backend's capture tooling printed.
fn print_output(status: &MonitorStatus, cfg: &Config) {
    if cfg.quiet > 0 {
        return;
    }
    let Some(output) = &status.output else {
        return;
    };
    for line in output.lines().map(str::trim_end).filter(|l| !l.is_empty()) {
        print::print_status(line.color(colors::SEPARATOR).to_string());
    }
}
