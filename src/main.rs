mod cli;
mod config;
mod error;
mod github;
mod output;
mod pipeline;
mod reference;
mod report;
mod server;
mod snapshot;
mod survey;
mod synthesis;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    output::print_banner();

    let cli = Cli::parse();
    info!("Starting RepoLens - GitHub Repository Analyzer");
    cli.execute().await?;

    Ok(())
}
