mod commands;
mod terminal;

use commands::{CommandLine, Commands, interfaces, monitor, probe, scan};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging();

    let cfg = commands.config();
    print::banner(cfg.quiet);

    match commands.command {
        Commands::Interfaces => {
            print::header("capture interfaces", cfg.quiet);
            interfaces::interfaces(&cfg).await
        }
        Commands::Monitor { action } => monitor::monitor(action, &cfg).await,
        Commands::Scan { json } => {
            print::header("starting network scan", cfg.quiet);
            scan::scan(json, &cfg).await
        }
        Commands::Probe { target, json } => {
            print::header("starting device probe", cfg.quiet);
            probe::probe(target, json, &cfg).await
        }
    }
}
