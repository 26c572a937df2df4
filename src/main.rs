//! Climbwatch main entry point
//!
//! This is the command-line interface for the daily ranked-listing snapshotter.

use anyhow::Context;
use clap::Parser;
use climbwatch::config::{load_config_with_hash, Config, SourceMode};
use climbwatch::output::{load_statistics, print_statistics};
use climbwatch::pipeline;
use climbwatch::storage::JsonSnapshotStore;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Climbwatch: a daily ranked-listing snapshotter
///
/// Climbwatch walks a paginated restaurant listing, records every entry in
/// rank order, and archives one JSON snapshot per day. Under CI it can
/// generate mock data instead of touching the network.
#[derive(Parser, Debug)]
#[command(name = "climbwatch")]
#[command(version = "1.0.0")]
#[command(about = "A daily ranked-listing snapshotter", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Generate mock data regardless of the environment
    #[arg(long, conflicts_with = "live")]
    mock: bool,

    /// Crawl the live listing regardless of the environment
    #[arg(long, conflicts_with = "mock")]
    live: bool,

    /// Validate config and show what would run without running it
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the snapshot archive and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

impl Cli {
    /// Resolves the source mode; flags win over config and environment
    fn source_mode(&self, config: &Config, ci: bool) -> SourceMode {
        if self.mock {
            SourceMode::Mock
        } else if self.live {
            SourceMode::Live
        } else {
            config.source.mode.resolve(ci)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let ci = ci_from_env();
    let mode = cli.source_mode(&config, ci);

    if cli.dry_run {
        handle_dry_run(&config, mode, ci);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_run(&config, mode).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("climbwatch=info,warn"),
            1 => EnvFilter::new("climbwatch=debug,info"),
            2 => EnvFilter::new("climbwatch=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Reads the CI signal once; `1`, `true` and `yes` count as set
fn ci_from_env() -> bool {
    std::env::var("CI")
        .map(|value| {
            matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes"
            )
        })
        .unwrap_or(false)
}

/// Handles the --dry-run mode: shows the resolved settings
fn handle_dry_run(config: &Config, mode: SourceMode, ci: bool) {
    println!("=== Climbwatch Dry Run ===\n");

    println!("Source:");
    println!("  Configured mode: {:?}", config.source.mode);
    println!("  CI detected: {}", ci);
    println!("  Resolved mode: {:?}", mode);

    println!("\nCrawler:");
    println!("  Listing: {}", config.crawler.listing_url);
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Card selector: {}", config.crawler.card_selector);
    println!("  Name selector: {}", config.crawler.name_selector);
    println!(
        "  Next selector: {} ({:?} check)",
        config.crawler.next_selector, config.crawler.next_check
    );
    println!(
        "  Timeouts: navigation {}ms, cards {}ms, idle {}ms",
        config.crawler.navigation_timeout, config.crawler.card_timeout, config.crawler.idle_timeout
    );
    println!(
        "  Pacing: {}-{}ms, advance retries: {}",
        config.pacing.min_delay, config.pacing.max_delay, config.crawler.advance_retries
    );

    println!("\nOutput:");
    println!("  Data directory: {}", config.output.data_dir);

    if mode == SourceMode::Mock {
        println!("\nMock:");
        println!("  Restaurants: {}", config.mock.count);
        println!("  History days: {}", config.mock.history_days);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: summarizes the archive
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Data directory: {}\n", config.output.data_dir);

    let store = JsonSnapshotStore::new(&config.output.data_dir);
    let stats = load_statistics(&store).context("Failed to read snapshot archive")?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main run: produce, persist, backfill
async fn handle_run(config: &Config, mode: SourceMode) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();

    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received; stopping after the current step");
            on_signal.cancel();
        }
    });

    let report = match pipeline::run(config, mode, &cancel).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Run failed: {}", e);
            return Err(e.into());
        }
    };

    match &report.stop_reason {
        Some(reason) if reason.is_failure() => tracing::warn!(
            "Crawl stopped early ({}); saved {} restaurants from {} pages",
            reason,
            report.total_restaurants,
            report.pages_visited
        ),
        Some(reason) => tracing::info!(
            "Crawl finished ({}); saved {} restaurants from {} pages",
            reason,
            report.total_restaurants,
            report.pages_visited
        ),
        None => tracing::info!("Saved {} restaurants", report.total_restaurants),
    }

    if report.backfilled > 0 {
        tracing::info!("Backfilled {} days of history", report.backfilled);
    }

    tracing::info!("Snapshot for {} complete", report.date);
    Ok(())
}
