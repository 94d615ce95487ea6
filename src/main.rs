use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nexprune::batch::{self, BatchReport, BatchSpec};
use nexprune::config::Config;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Reconcile phylogenetic trees and an alignment to their common taxa
#[derive(Parser, Debug)]
#[command(name = "nexprune")]
#[command(version)]
struct Cli {
    /// Log more (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the batches listed in a configuration file
    Run {
        /// TOML configuration with [[batch]] entries
        #[arg(short, long, env = "NEXPRUNE_CONFIG")]
        config: PathBuf,
    },
    /// Reconcile the tree and alignment files found in a directory
    Discover {
        /// Directory to scan (not recursive)
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// Name of the batch, prefix of the tree list and manifest
        #[arg(short, long, default_value = "batch")]
        name: String,

        /// Suffix of tree files, overrides the configuration
        #[arg(long)]
        tree_suffix: Option<String>,

        /// Optional TOML configuration for naming and policies
        #[arg(short, long, env = "NEXPRUNE_CONFIG")]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let reports = match cli.command {
        Command::Run { config } => {
            let config = load_config(&config)?;
            batch::run_all(&config)?
        }
        Command::Discover { dir, name, tree_suffix, config } => {
            let mut config = match config {
                Some(path) => load_config(&path)?,
                None => Config::default(),
            };
            if let Some(tree_suffix) = tree_suffix {
                config.inputs.tree_suffix = tree_suffix;
            }
            let spec = BatchSpec::discover(name, &dir, &config)
                .with_context(|| format!("Failed to collect inputs from {}", dir.display()))?;
            vec![batch::run_batch(&spec, &config)?]
        }
    };

    for report in &reports {
        print_report(report);
    }
    info!(batches = reports.len(), "done");
    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_directive = match verbose {
        0 => "nexprune=info",
        1 => "nexprune=debug",
        _ => "nexprune=trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directive.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: &Path) -> Result<Config> {
    Config::from_file(path).with_context(|| format!("Failed to load configuration {}", path.display()))
}

fn print_report(report: &BatchReport) {
    println!(
        "{}: {} common taxa, {} of {} alignment records kept",
        report.name,
        report.common_taxa.len(),
        report.alignment.records_kept,
        report.alignment.records_seen
    );
    for path in &report.written {
        println!("  wrote {}", path.display());
    }
    for warning in &report.warnings {
        println!("  warning: {warning}");
    }
}
