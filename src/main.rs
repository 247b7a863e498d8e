// Zone 3 forecaster - main.rs
// Loads configuration, installs logging and dispatches the CLI.

use clap::Parser;
use zone3_forecaster::cli::{run, Cli};
use zone3_forecaster::config::ForecasterConfig;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = ForecasterConfig::load(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_max_level(config.tracing_level()?)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    run(cli, config)
}
