// =============================================================================
// config.rs — THE GRAND CONFIGURATION CATHEDRAL
// =============================================================================
//
// Every system needs configuration, but notice what is NOT here: feature
// weights, the rarity function, the clustering threshold default, batch
// ceilings. Those are compile-time constants of the detection and
// ingestion modules, because a scoring model you can quietly reconfigure
// in production is a scoring model nobody can audit.
//
// What IS here: where the database lives, where the government keeps its
// data, and how politely we fetch it. All overridable via environment
// variables, because hardcoding connection strings is how you end up on
// the front page of Hacker News for the wrong reasons.
//
// Default values have been carefully chosen through a rigorous process of
// "that's what the API documentation says" and "Socrata will rate-limit
// us if we go faster than this."
// =============================================================================

use std::env;
use std::time::Duration;

use anyhow::{bail, Context, Result};

/// The Grand Configuration Struct. If you need to change how the engine
/// talks to the outside world, this is where you come. If you need to
/// change how it SCORES, go read the detection module and bring a code
/// reviewer.
#[derive(Debug, Clone)]
pub struct Config {
    // =========================================================================
    // STORE CONFIGURATION
    // =========================================================================

    /// Postgres connection URL. Required — there is no sensible default
    /// for "where do we keep the evidence." Read from DATABASE_URL.
    pub database_url: String,

    // =========================================================================
    // SOCRATA (SODA API) CONFIGURATION
    // The federal government publishes the entire motor carrier census
    // as open data. We are going to read all of it. Politely.
    // =========================================================================

    /// Base URL for the SODA resource endpoints.
    /// Default: https://data.transportation.gov/resource
    pub soda_base_url: String,

    /// Rows per page. Socrata caps uncredentialed requests at 50,000,
    /// so we ask for exactly that and not one row more.
    pub soda_page_size: usize,

    /// Delay between successive page fetches within a single query.
    /// 500 ms. We're obsessive, not rude.
    pub soda_page_delay: Duration,

    /// Per-request timeout. Two minutes, because a 50,000-row page of
    /// inspection records is a lot of JSON even for the government.
    pub soda_timeout: Duration,

    // =========================================================================
    // CIRCUIT BREAKER PARAMETERS
    // Because government APIs go down more often than you'd think.
    // =========================================================================

    /// Consecutive failures before the breaker trips.
    pub circuit_breaker_failure_threshold: u32,

    /// How long the breaker stays open before allowing a test request.
    pub circuit_breaker_reset_timeout: Duration,

    /// Successes required in half-open state before closing again.
    pub circuit_breaker_success_threshold: u32,

    // =========================================================================
    // INGESTION DEDUP PARAMETERS
    // =========================================================================

    /// Expected distinct DOT numbers per ingestion run, for sizing the
    /// bloom filter. Generously padded; the census has ~3.8M carriers
    /// and a seeded run touches a small fraction of them.
    pub dedup_expected_items: u64,

    /// Target bloom false-positive rate. A false positive here means one
    /// redundant upsert gets skipped by the LRU instead — harmless.
    pub dedup_false_positive_rate: f64,

    /// LRU backstop capacity behind the bloom filter.
    pub dedup_lru_size: usize,
}

impl Config {
    /// Load configuration from the environment with sensible defaults for
    /// everything except DATABASE_URL, which has no sensible default and
    /// is therefore a hard error when missing.
    ///
    /// Overrides are prefixed CHAMELEON_. Because namespacing your env
    /// vars is what separates the professionals from the amateurs.
    pub fn from_env() -> Result<Self> {
        // Try to load .env if it exists. Fail silently if it doesn't,
        // because not everyone has their life together enough to create
        // a .env file.
        let _ = dotenvy::dotenv();

        let database_url = env::var("DATABASE_URL")
            .context("DATABASE_URL environment variable is required")?;
        if database_url.trim().is_empty() {
            bail!("DATABASE_URL environment variable is required");
        }

        Ok(Config {
            database_url: database_url.trim().to_string(),

            soda_base_url: env_or_default(
                "CHAMELEON_SODA_BASE_URL",
                "https://data.transportation.gov/resource",
            ),
            soda_page_size: env_or_default("CHAMELEON_SODA_PAGE_SIZE", "50000")
                .parse()
                .unwrap_or(50_000),
            soda_page_delay: Duration::from_millis(
                env_or_default("CHAMELEON_SODA_PAGE_DELAY_MS", "500")
                    .parse()
                    .unwrap_or(500),
            ),
            soda_timeout: Duration::from_secs(
                env_or_default("CHAMELEON_SODA_TIMEOUT_SECS", "120")
                    .parse()
                    .unwrap_or(120),
            ),

            circuit_breaker_failure_threshold: env_or_default("CHAMELEON_CB_FAILURE_THRESHOLD", "5")
                .parse()
                .unwrap_or(5),
            circuit_breaker_reset_timeout: Duration::from_secs(
                env_or_default("CHAMELEON_CB_RESET_TIMEOUT_SECS", "60")
                    .parse()
                    .unwrap_or(60),
            ),
            circuit_breaker_success_threshold: env_or_default("CHAMELEON_CB_SUCCESS_THRESHOLD", "2")
                .parse()
                .unwrap_or(2),

            dedup_expected_items: env_or_default("CHAMELEON_DEDUP_ITEMS", "500000")
                .parse()
                .unwrap_or(500_000),
            dedup_false_positive_rate: env_or_default("CHAMELEON_DEDUP_FP_RATE", "0.01")
                .parse()
                .unwrap_or(0.01),
            dedup_lru_size: env_or_default("CHAMELEON_DEDUP_LRU_SIZE", "50000")
                .parse()
                .unwrap_or(50_000),
        })
    }
}

/// Helper to read an environment variable with a default fallback.
/// Because unwrap_or on env::var is ugly and we have standards.
fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
