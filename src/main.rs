//! Materio command-line entry point

use anyhow::Context;
use clap::Parser;
use materio::config::load_config_with_hash;
use materio::product::Category;
use materio::scrape::{CancelFlag, Coordinator};
use materio::store::{compute_stats, export_csv, load_snapshot, print_stats, write_snapshot};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "materio")]
#[command(about = "Scrapes supplier category listings into pricing snapshots")]
#[command(version)]
struct Cli {
    /// Path to the TOML configuration file
    config: PathBuf,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Print the planned walks and exit without fetching anything
    #[arg(long)]
    dry_run: bool,

    /// Only scrape these supplier ids (comma-separated)
    #[arg(long, value_delimiter = ',')]
    suppliers: Vec<String>,

    /// Only scrape these categories (comma-separated)
    #[arg(long, value_delimiter = ',')]
    categories: Vec<Category>,

    /// Write the snapshot to this path instead of the configured one
    #[arg(long)]
    output: Option<PathBuf>,

    /// Export the existing snapshot as CSV to this path and exit
    #[arg(long, value_name = "PATH")]
    export_csv: Option<PathBuf>,
}

fn setup_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        "materio=warn"
    } else {
        match verbose {
            0 => "materio=info",
            1 => "materio=debug",
            _ => "materio=trace",
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    if let Err(e) = run(cli).await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    tracing::info!(
        "Loaded config {} (hash {})",
        cli.config.display(),
        &config_hash[..12]
    );

    let snapshot_path = cli
        .output
        .unwrap_or_else(|| PathBuf::from(&config.output.snapshot_path));

    if let Some(csv_path) = cli.export_csv {
        let snapshot = load_snapshot(&snapshot_path)?;
        export_csv(&snapshot, &csv_path)?;
        return Ok(());
    }

    let cancel = CancelFlag::new();
    let coordinator = Coordinator::new(config, &cli.suppliers, &cli.categories, cancel.clone())?;

    if coordinator.planned_walks() == 0 {
        tracing::warn!("Nothing to scrape after filtering");
        return Ok(());
    }

    if cli.dry_run {
        println!("Planned walks:");
        for line in coordinator.describe_plan() {
            println!("  {}", line);
        }
        return Ok(());
    }

    // First Ctrl-C cancels gracefully and still writes the partial snapshot
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, finishing in-flight pages");
                cancel.cancel();
            }
        });
    }

    let snapshot = coordinator.run().await?;
    write_snapshot(&snapshot, &snapshot_path)?;

    let stats = compute_stats(&snapshot);
    print_stats(&stats);

    Ok(())
}
