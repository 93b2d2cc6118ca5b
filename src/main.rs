mod api;
mod app;
mod cli;
mod config;
mod error;
mod export;
mod lifecycle;
mod poller;
mod shell;
mod ui;
mod views;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use config::TrackerConfig;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default = if verbose { "jobtrail=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = TrackerConfig::load(cli.config.as_deref(), cli.api_url.clone())
        .context("failed to load configuration")?;

    match app::run(cli, config).await {
        Ok(code) => Ok(code),
        Err(err) if err.is_user_facing() => {
            ui::print_notice(&views::Notice::error(err.to_string()));
            Ok(ExitCode::FAILURE)
        }
        Err(err) => Err(err.into()),
    }
}
