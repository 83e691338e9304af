pub mod interfaces;
pub mod live;
pub mod monitor;
pub mod probe;
pub mod scan;

use std::time::Duration;

use airmap_common::config::{Config, DEFAULT_BACKEND};
use airmap_common::network::target::ScanTarget;
use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "airmap")]
#[command(about = "A live wireless network mapper.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Base URL of the capture backend
    #[arg(long, global = true, default_value = DEFAULT_BACKEND)]
    pub backend: String,

    /// Print less, repeat for even less
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub quiet: u8,

    /// Give up on a stream that stays silent for this many seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub stall_timeout: Option<u64>,

    /// Do not look up device vendors from their MAC address
    #[arg(long, global = true)]
    pub no_vendor: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List interfaces the backend can capture on
    #[command(alias = "i")]
    Interfaces,
    /// Switch an interface in or out of monitor mode
    #[command(alias = "m")]
    Monitor {
        #[command(subcommand)]
        action: MonitorAction,
    },
    /// Discover nearby wireless networks until Ctrl-C
    #[command(alias = "s")]
    Scan {
        /// Print the final network list as JSON on stdout
        #[arg(long)]
        json: bool,
    },
    /// Discover devices of one network, given as BSSID@CHANNEL
    #[command(alias = "p")]
    Probe {
        target: ScanTarget,
        /// Print the final device list as JSON on stdout
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum MonitorAction {
    /// Put an interface into monitor mode
    Start { interface: String },
    /// Return an interface to managed mode
    Stop { interface: String },
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn config(&self) -> Config {
        Config {
            backend: self.backend.clone(),
            quiet: self.quiet,
            stall_timeout: self
                .stall_timeout
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            no_vendor: self.no_vendor,
        }
    }
}
