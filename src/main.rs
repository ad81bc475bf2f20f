mod aggregate;
mod cli;
mod collector;
mod config;
mod error;
mod jenkins;
mod model;
mod reconcile;
mod record;
mod store;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    info!("Starting qualipoll - CI code quality collector");
    cli.execute().await?;

    Ok(())
}
