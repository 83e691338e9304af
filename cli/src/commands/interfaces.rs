use airmap_common::config::Config;
use airmap_core::backend::BackendClient;
use colored::*;

use crate::mprint;
use crate::terminal::{colors, print};

pub async fn interfaces(cfg: &Config) -> anyhow::Result<()> {
    let client = BackendClient::new(&cfg.backend)?;
    let devices: Vec<String> = client.list_devices().await?;

    if devices.is_empty() {
        print::header("ZERO INTERFACES DETECTED", cfg.quiet);
        print::no_results();
        return Ok(());
    }

    for (idx, name) in devices.iter().enumerate() {
        print::tree_head(idx, name);
        // The backend names monitor interfaces after their parent.
        let monitor: ColoredString = format!("{name}mon").color(colors::ACCENT);
        print::as_tree_one_level(vec![("Monitor".to_string(), monitor)]);
        if idx + 1 != devices.len() {
            mprint!();
        }
    }
    Ok(())
}
