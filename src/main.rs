//! Tally main entry point

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tally_api::{start_server, AppState};
use tally_config::Config;
use tally_core::Tally;
use tally_store::{JsonFileStore, StoreRef};
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "tally")]
#[command(version = "0.1.0")]
#[command(about = "A lightweight debt tracker for friends", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print the default configuration and exit
    #[arg(long)]
    init: bool,
}

fn load_config(path: &Path) -> anyhow::Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    Config::load(path).map_err(|e| {
        eprintln!("{}", e.to_details());
        anyhow::anyhow!("Failed to load {}", path.display())
    })
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if args.init {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let config = load_config(&args.config)?;
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    if !args.config.exists() {
        log::warn!(
            "Config file {} not found, using defaults",
            args.config.display()
        );
    }
    log::info!("Data file: {}", config.data.file.display());

    let rt = Runtime::new()?;
    rt.block_on(async {
        let store = JsonFileStore::new(&config.data.file);
        if store.ensure_exists(&config.site.admin).await? {
            log::info!("Created data file for {}", config.site.admin);
        }

        let store: StoreRef = Arc::new(store);
        let tally = Tally::open(config.clone(), store)
            .await
            .context("Failed to load data file")?;

        start_server(AppState::new(config, tally)).await
    })
}
