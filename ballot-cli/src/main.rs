use ballot_cli::cli::Cli;
use ballot_cli::commands;
use ballot_cli::logging::init_tracing;
use ballot_cli::BallotConfig;
use clap::Parser;
use tracing::{debug, error};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = BallotConfig::load_or_default(&cli.config)?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }

    let log_dir = cli.command.writes_audit_log().then(|| config.log_dir());
    let _guard = init_tracing(log_dir.as_deref())?;
    debug!("Effective config: {:?}", config);

    if let Err(e) = commands::run(cli, config) {
        error!("{}", e);
        return Err(e);
    }
    Ok(())
}
