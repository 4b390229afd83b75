//! unemployment_viz service binary.
//!
//! `serve` runs the HTTP endpoint; `verify` checks every FRED series the
//! service depends on and exits non-zero if any of them fail.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use unemployment_viz::config::ServiceConfig;
use unemployment_viz::ingest::fred::{FredClient, SeriesSource};
use unemployment_viz::logging::init_logging;
use unemployment_viz::{server, verify};

#[derive(Parser, Debug)]
#[command(name = "unemployment_viz")]
#[command(about = "State unemployment comparison charts from FRED")]
struct Args {
    /// Path to the TOML configuration file (defaults to VIZ_CONFIG, then ./viz.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve GET /viz/{statecode} (default)
    Serve,
    /// Fetch every state and the national series once and report
    Verify,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = ServiceConfig::load(args.config.as_deref()).context("failed to load configuration")?;
    let _guard = init_logging(&config.log_level, config.log_file.as_deref())?;

    let client = FredClient::new(&config.fred_base_url, &config.national_series_id, config.fetch_timeout())
        .context("failed to build FRED client")?;
    let source: Arc<dyn SeriesSource> = Arc::new(client);

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => server::run_server(&config, source).await,
        Command::Verify => {
            let report = verify::run_full_verification(source.as_ref()).await;
            verify::print_summary(&report);
            if report.summary.failed > 0 {
                anyhow::bail!("{} of {} series failed verification", report.summary.failed, report.summary.total);
            }
            Ok(())
        }
    }
}
