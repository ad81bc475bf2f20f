use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;

use crate::collector::{CollectionCycle, Scheduler};
use crate::config::Config;
use crate::jenkins::{JenkinsClient, JunitConverter};
use crate::store::FileStore;

#[derive(Parser)]
#[command(name = "qualipoll")]
#[command(author, version, about = "CI code quality collector", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the configured build servers and collect quality records
    Run {
        #[arg(short, long, env = "QUALIPOLL_CONFIG", default_value = "qualipoll.toml")]
        config: PathBuf,

        /// Run a single collection cycle and exit
        #[arg(long, default_value_t = false)]
        once: bool,
    },
}

impl Cli {
    async fn execute_run(&self, config_path: &PathBuf, once: bool) -> Result<()> {
        let config = Config::load(config_path)?;
        info!(
            "Collector '{}' polling {} server(s)",
            config.collector.name,
            config.collector.servers.len()
        );

        let patterns = config.compiled_patterns()?;
        let store = FileStore::new(config.storage.data_dir.clone())?;

        let cycle = CollectionCycle::new(
            config.collector.name.clone(),
            patterns,
            JenkinsClient::new()?,
            JunitConverter::new(),
            store.clone(),
            store,
        );

        if once {
            let summary = cycle.run(&config.collector.servers).await?;
            info!(
                "Single cycle finished: {} record(s) collected",
                summary.collected
            );
            return Ok(());
        }

        let scheduler = Scheduler::new(Duration::from_secs(config.collector.poll_interval_secs));
        scheduler
            .run(Arc::new(cycle), config.collector.servers.clone())
            .await;

        Ok(())
    }

    pub async fn execute(&self) -> Result<()> {
        match &self.command {
            Commands::Run { config, once } => self.execute_run(config, *once).await,
        }
    }
}
