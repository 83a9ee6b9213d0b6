use anyhow::Result;
use clap::Parser;

mod cli;

use cli::commands::{config::ConfigCommand, parse::ParseCommand, policy::PolicyCommand, simulate::SimulateCommand};
use cli::{Cli, Commands};
use dramaflow::{config, init_telemetry, shutdown_telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config()?;
    init_telemetry(&config.observability)?;

    let result = match cli.command {
        Some(Commands::Simulate {
            episodes,
            languages,
            tick_ms,
            seed,
        }) => {
            SimulateCommand::new(episodes, languages)
                .with_tick_ms(tick_ms)
                .with_seed(seed)
                .execute(config)
                .await
        }
        Some(Commands::Policy { stage, role, source }) => PolicyCommand::new(stage, role, source).execute(),
        Some(Commands::Parse { filename, existing }) => ParseCommand::new(filename, existing).execute(),
        Some(Commands::Config { write }) => ConfigCommand::new(write).execute(config),
        None => {
            SimulateCommand::new(5, vec!["en".to_string()])
                .execute(config)
                .await
        }
    };

    shutdown_telemetry();
    result
}
