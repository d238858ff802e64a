//! Command-line entry point for local database seeding.
//!
//! Wraps the three seeding flows: full rebuild, data reload, and the
//! shop-scoped refresh of sampled tables.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use pgseed_core::command::ShellRunner;
use pgseed_core::config::SeedConfig;
use pgseed_core::pipeline::{self, Pipeline};

/// Command-line arguments for the seeding tool.
#[derive(Parser, Debug)]
#[command(name = "pgseed", author, version, about, long_about = None)]
struct Args {
    /// Path to the seeding configuration file
    #[arg(short, long, default_value = "pgseed.json")]
    config: PathBuf,

    /// Directory holding the raw/ and processed/ handoff files
    #[arg(long)]
    work_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Flow,
}

/// Seeding flows.
#[derive(Subcommand, Debug)]
enum Flow {
    /// Drop and recreate the local database, then reload everything
    Full,
    /// Refresh schema and data in the existing local database
    Reload,
    /// Re-download the large tables for the configured shop ids only
    ReloadShops,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let mut config = SeedConfig::load(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;
    if let Some(work_dir) = args.work_dir {
        config.work_dir = work_dir;
    }

    let steps = match args.command {
        Flow::Full => {
            info!("recreating database {}", config.target_db);
            pipeline::full_flow()
        }
        Flow::Reload => pipeline::reload_flow(),
        Flow::ReloadShops => pipeline::reload_shops_flow(),
    };

    let runner = ShellRunner;
    Pipeline::new(&config, &runner).run(&steps);

    Ok(())
}
