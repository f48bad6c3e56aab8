//! Sanctions tracker CLI
//!
//! Local execution entry point.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use sanctions_tracker::{
    error::Result,
    models::Config,
    pipeline::{self, RunRequest},
    services::{EntityResolver, SanctionsSearchClient, TreasurySite},
    storage::{LocalStorage, RecordStorage, RunCursor},
    utils::{dates::parse_iso, http::Fetcher},
};

/// Sanctions list change tracker
#[derive(Parser, Debug)]
#[command(
    name = "sanctions-tracker",
    version,
    about = "Track digital currency addresses added to and removed from the sanctions list"
)]
struct Cli {
    /// Directory holding config.toml, the record table and the cursor
    #[arg(short, long, default_value = ".")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process bulletins and reconcile the record table
    Run {
        /// First bulletin date (YYYY-MM-DD); defaults to the saved cursor
        #[arg(value_parser = parse_date)]
        start: Option<NaiveDate>,

        /// Last bulletin date (YYYY-MM-DD); defaults to today
        #[arg(value_parser = parse_date, requires = "start")]
        end: Option<NaiveDate>,

        /// Check the resolver against a known entity instead
        #[arg(long, conflicts_with_all = ["start", "end"])]
        self_test: bool,
    },

    /// Validate the configuration file
    Validate,

    /// Show record table and cursor info
    Info,
}

fn parse_date(value: &str) -> std::result::Result<NaiveDate, String> {
    parse_iso(value).map_err(|_| format!("invalid date '{value}', expected YYYY-MM-DD"))
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version go to stdout and succeed; usage errors exit 1
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };
    init_logging(cli.verbose);

    let config_path = cli.storage_dir.join("config.toml");
    let config = Config::load_or_default(&config_path);
    let storage = LocalStorage::new(&cli.storage_dir, &config.paths);

    match cli.command {
        Command::Run {
            start,
            end,
            self_test,
        } => {
            config.validate()?;

            let fetcher = Fetcher::from_config(&config.crawler)?;
            let search =
                SanctionsSearchClient::new(fetcher.clone(), &config.sources, config.resolver.similarity)?;
            let resolver = EntityResolver::new(search, config.resolver.address_type.clone());

            if self_test {
                pipeline::run_self_test(&resolver, &config.self_test).await?;
                return Ok(());
            }

            let source = TreasurySite::new(fetcher, &config.sources)?;
            let request = RunRequest {
                start,
                end,
                today: chrono::Local::now().date_naive(),
            };
            let report = pipeline::run_tracker(&storage, &source, &resolver, &request).await?;

            log::info!(
                "Processed {} bulletin(s) from {} to {}: {} change(s)",
                report.bulletin_count,
                report.window.start,
                report.window.end,
                report.changes.len()
            );
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");
        }

        Command::Info => {
            log::info!("Storage directory: {}", storage.root_dir().display());

            let table = storage.load_table().await?;
            log::info!(
                "Record table: {} ({} row(s), {} name(s))",
                storage.store_path().display(),
                table.len(),
                table.existing_names().len()
            );

            match RunCursor::new(&storage).load(&table).await? {
                Some(date) => log::info!("Resume date: {}", date),
                None => log::info!("No resume date yet. The next run needs a start date."),
            }
        }
    }

    Ok(())
}
