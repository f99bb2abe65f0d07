use std::process::ExitCode;

use anyhow::Context;
use betline::cli::{self, output, Cli, Commands};
use clap::Parser;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    output::set_json(cli.json);

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Command failed");
            output::error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Networks(args) => cli::networks::execute(&args).context("listing networks")?,
        Commands::Connect(args) => cli::connect::execute(&args)
            .await
            .context("connecting wallet")?,
        Commands::Balance(args) => cli::balance::execute(&args)
            .await
            .context("reading balance")?,
        Commands::Approve(args) => cli::approve::execute(&args)
            .await
            .context("approving escrow")?,
        Commands::Wager(args) => cli::wager::execute(&args)
            .await
            .context("placing wager")?,
        Commands::Market(args) => cli::market::execute(&args)
            .await
            .context("reading market")?,
        Commands::Stats(args) => cli::stats::execute(&args)
            .await
            .context("reading escrow statistics")?,
    }
    info!("Command finished");
    Ok(())
}
