//! Motorpool CLI
//!
//! Command-line access to the car and owner API through the same entity
//! stores and form pipeline the views use. Output is JSON on stdout; logs
//! go to stderr.
//!
//! ```text
//! motorpool list cars --sort price,desc
//! motorpool create cars --set name=Zoe --set model=R --set price=12.5 --set owner=2
//! motorpool --demo patch cars 4 --set model=LX-2
//! ```

mod commands;

use anyhow::Context;
use clap::Parser;
use motorpool_core::{logging, Config, LogFormat};
use motorpool_store::EntityStores;
use std::path::PathBuf;
use std::process;
use tracing::{debug, error};

use commands::{demo_backend, Command};

#[derive(Debug, Parser)]
#[command(name = "motorpool", version, about = "Manage cars and owners through the Motorpool API")]
struct Cli {
    /// TOML configuration file; MOTORPOOL_* variables override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Serve requests from a seeded in-memory backend instead of the API
    #[arg(long, global = true)]
    demo: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    /// Single-line JSON output
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::default_config(),
    };
    Ok(config.with_env_overrides()?)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = load_config(cli.config.as_ref())?;
    if cli.json_logs {
        config.logging.format = LogFormat::Json;
    }
    logging::init_from_config(&config.logging);

    let stores = if cli.demo {
        debug!("Using in-memory demo backend");
        EntityStores::in_memory(demo_backend(), &config)
    } else {
        EntityStores::from_config(&config)?
    };

    let output = commands::run(&stores, cli.command).await?;
    let rendered = if cli.compact {
        serde_json::to_string(&output)?
    } else {
        serde_json::to_string_pretty(&output)?
    };
    println!("{rendered}");
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        error!(error = %err, "Command failed");
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}
