//! trackwatch CLI
//!
//! Polls the spark tracks catalog and posts new or updated tracks to a webhook.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use trackwatch::{
    config,
    error::Result,
    models::Config,
    pipeline::{CycleRunner, run_watch},
    storage::LocalStorage,
    utils::log as console,
};

/// trackwatch - Spark Tracks Watcher
#[derive(Parser, Debug)]
#[command(name = "trackwatch", version, about = "Spark tracks change notifier")]
struct Cli {
    /// Path to storage directory containing config and snapshot
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll the catalog forever
    Watch,

    /// Run a single cycle
    Check {
        /// Print payloads instead of posting; leave the snapshot untouched
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate configuration file
    Validate,

    /// Show current snapshot info
    Info,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing config.toml
        #[arg(long)]
        force: bool,
    },
}

/// Initialize logging from the configured level, or debug when verbose.
fn init_logging(level: &str, verbose: bool) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // The logger may not be installed yet when loading fails.
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<()> {
    match cli.command {
        Command::Watch => {
            let config = load(cli)?;
            let runner = CycleRunner::from_config(&config, &cli.storage_dir)?;

            console::header("trackwatch");
            console::sub_item(&format!("Catalog: {}", config.catalog.url));
            console::sub_item(&format!("Interval: {}s", config.polling.interval_secs));
            console::sub_item(&format!(
                "Snapshot: {}",
                config.snapshot_path(&cli.storage_dir).display()
            ));

            run_watch(&runner, config.polling.interval(), None).await;
        }

        Command::Check { dry_run } => {
            let config = load(cli)?;
            let runner = CycleRunner::from_config(&config, &cli.storage_dir)?;

            let report = if dry_run {
                runner.preview_cycle().await?
            } else {
                runner.run_cycle().await?
            };

            for payload in &report.previews {
                println!("{}", serde_json::to_string_pretty(payload)?);
            }
            console::summary(
                if dry_run { "Dry run" } else { "Cycle complete" },
                &report.summary_items(),
            );
        }

        Command::Validate => {
            let config = load(cli)?;
            log::info!(
                "✓ Config OK ({} channels, {} calibrated tracks)",
                config.display.enabled_channels.len(),
                config.display.offsets.len()
            );
        }

        Command::Info => {
            // Validation is skipped: a missing webhook URL should not hide the snapshot.
            let mut config = config::load_config(&config::config_path(&cli.storage_dir))?;
            config.apply_env_overrides();
            init_logging(&config.logging.level, cli.verbose);

            let storage =
                LocalStorage::with_snapshot_file(&cli.storage_dir, &config.storage.snapshot_file);

            log::info!("Storage directory: {}", cli.storage_dir.display());
            log::info!("Snapshot: {}", storage.snapshot_path().display());

            match storage.load_data().await {
                Ok(Some(data)) => {
                    log::info!("Tracks: {}", data.count);
                    log::info!("Last updated: {}", data.updated_at.to_rfc3339());
                }
                Ok(None) => log::info!("No snapshot found yet."),
                Err(e) => log::warn!("Snapshot unreadable: {}", e),
            }
        }

        // Works before a valid config exists.
        Command::Init { force } => {
            init_logging("info", cli.verbose);
            let path = config::write_default(&cli.storage_dir, force)?;
            log::info!("Default configuration written to {}", path.display());
            log::info!("Set webhook.url (or TRACKWATCH_WEBHOOK_URL) before running 'watch'.");
        }
    }

    Ok(())
}

/// Load, override and validate the configuration, then install the logger.
fn load(cli: &Cli) -> Result<Config> {
    let config = config::load_all(&cli.storage_dir)?;
    init_logging(&config.logging.level, cli.verbose);
    log::info!("Loaded configuration from {}", cli.storage_dir.display());
    Ok(config)
}
