mod backend;
mod cli;
mod config;
mod engine;
mod markdown;
mod pairing;
mod records;
mod terms;

pub const USER_AGENT: &str = concat!("termscope/", env!("CARGO_PKG_VERSION"));

use std::process::ExitCode;

use clap::Parser;
use tracing::info;

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("termscope=info".parse()?),
        )
        .init();

    let cli = cli::Cli::parse();
    info!("starting termscope");

    cli::run(cli)
        .await
        .inspect_err(|e| tracing::error!("run failed: {e}"))
}
