//  ██████╗██╗  ██╗ █████╗ ███╗   ███╗███████╗██╗     ███████╗ ██████╗ ███╗   ██╗
// ██╔════╝██║  ██║██╔══██╗████╗ ████║██╔════╝██║     ██╔════╝██╔═══██╗████╗  ██║
// ██║     ███████║███████║██╔████╔██║█████╗  ██║     █████╗  ██║   ██║██╔██╗ ██║
// ██║     ██╔══██║██╔══██║██║╚██╔╝██║██╔══╝  ██║     ██╔══╝  ██║   ██║██║╚██╗██║
// ╚██████╗██║  ██║██║  ██║██║ ╚═╝ ██║███████╗███████╗███████╗╚██████╔╝██║ ╚████║
//  ╚═════╝╚═╝  ╚═╝╚═╝  ╚═╝╚═╝     ╚═╝╚══════╝╚══════╝╚══════╝ ╚═════╝ ╚═╝  ╚═══╝
//
// E N G I N E
//
// The most overkill chameleon-carrier detection engine ever conceived.
// Rust + Tokio + Postgres + Bloom Filters + Union-Find + Circuit Breakers
// All to catch a trucking company pretending to be a different trucking company.

mod circuit_breaker;
mod config;
mod dedup;
mod detect;
mod error;
mod ingest;
mod metrics;
mod models;
mod soda;
mod store;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;
use crate::detect::DEFAULT_CLUSTER_THRESHOLD;
use crate::error::EngineError;
use crate::ingest::IngestOptions;
use crate::store::Store;

fn print_banner() {
    let banner = r#"
    ╔══════════════════════════════════════════════════════════════════╗
    ║                                                                  ║
    ║              🦎  CHAMELEON CARRIER DETECTION ENGINE  🦎          ║
    ║                                                                  ║
    ║   Data:      FMCSA Census | Crashes | Roadside Inspections       ║
    ║   Linking:   Inverted Indices + Rarity-Weighted Scoring          ║
    ║   Networks:  Union-Find Clustering over the Score Graph          ║
    ║   Dedup:     Bloom Filter + LRU Cache Hybrid                     ║
    ║   Resilience: Circuit Breakers on the Open-Data Firehose         ║
    ║                                                                  ║
    ║   "New DOT number. Same parking lot. We noticed."                ║
    ║                                                                  ║
    ╚══════════════════════════════════════════════════════════════════╝
    "#;
    println!("{banner}");
}

/// Chameleon carrier detection: ingest open FMCSA data, link carriers by
/// shared identifiers, cluster the networks, score the risk.
#[derive(Parser)]
#[command(name = "chameleon_engine", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch census seeds, expand one hop, and pull crash/inspection
    /// records into the store.
    Ingest {
        /// Cap on seed carriers (0 = fetch every flagged carrier).
        #[arg(long, default_value_t = 0)]
        max_seeds: usize,

        /// Expansion hops over shared identifiers: 0 or 1.
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=1))]
        expand_hops: u8,

        /// Skip the crash-record stage.
        #[arg(long)]
        skip_crashes: bool,

        /// Skip the inspection-record stage.
        #[arg(long)]
        skip_inspections: bool,
    },

    /// Run the detection pipeline over the stored carrier universe and
    /// write links, clusters, and risk scores back.
    Detect {
        /// Minimum link score for two carriers to cluster together.
        #[arg(long, default_value_t = DEFAULT_CLUSTER_THRESHOLD)]
        threshold: f64,

        /// Run identifier (defaults to a UTC timestamp).
        #[arg(long)]
        run_id: Option<String>,
    },
}

fn default_run_id() -> String {
    Utc::now().format("%Y%m%dT%H%M%SZ").to_string()
}

#[tokio::main]
async fn main() {
    // UTC HH:MM:SS on every line, env-filterable, info by default.
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_timer(ChronoUtc::new("%H:%M:%S".to_owned()))
        .with_target(false)
        .init();

    print_banner();

    let cli = Cli::parse();
    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("fatal: {e:#}");
            1
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    let config = Config::from_env()?;
    let store = Store::connect(&config.database_url).await?;
    store.ensure_schema().await?;

    match cli.command {
        Command::Ingest {
            max_seeds,
            expand_hops,
            skip_crashes,
            skip_inspections,
        } => {
            let run_id = default_run_id();
            let opts = IngestOptions {
                max_seeds,
                expand_hops,
                skip_crashes,
                skip_inspections,
            };
            let failed_stages = ingest::run_ingestion(&store, &config, &run_id, &opts).await?;
            if failed_stages > 0 {
                warn!(failed_stages, "ingestion finished with failed stages");
                Ok(1)
            } else {
                info!("ingestion complete");
                Ok(0)
            }
        }

        Command::Detect { threshold, run_id } => {
            let run_id = run_id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(default_run_id);
            match detect::run_detection(&store, threshold, &run_id).await {
                Ok(()) => Ok(0),
                Err(EngineError::InputMissing) => {
                    error!("no carriers in store — run `ingest` first");
                    Ok(1)
                }
                Err(e) => Err(e.into()),
            }
        }
    }
}
