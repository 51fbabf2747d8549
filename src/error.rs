// =============================================================================
// error.rs — THE TAXONOMY OF THINGS THAT GO WRONG
// =============================================================================
//
// Five ways this engine can fail, and exactly five. Anything else is a bug
// masquerading as an error, and we don't negotiate with those.
//
// The policy, in one breath: a single malformed row is dropped on the floor
// (dataset hygiene is the upstream provider's problem), a flaky HTTP fetch is
// retried, an exhausted fetch fails its stage and gets written into the
// SyncRun ledger, and anything the database refuses rolls back the whole
// transaction. The detection engine itself never retries anything — if the
// math fails, the run fails, and you should be worried about the math.
// =============================================================================

use thiserror::Error;

/// Every failure mode the engine admits to having.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The store has no carriers in it. Detection over an empty universe
    /// produces an empty universe, so we save everyone the electricity.
    #[error("no carriers in store — run `ingest` first")]
    InputMissing,

    /// A transient HTTP/network hiccup. The fetcher retries these; by the
    /// time one escapes the retry loop it has been promoted to FetchFatal.
    #[error("transient fetch failure: {0}")]
    FetchTransient(String),

    /// Retries exhausted (or the circuit breaker slammed shut). The stage
    /// that hit this is marked failed; later stages may still run on
    /// whatever data made it into the store.
    #[error("fetch failed after retries: {0}")]
    FetchFatal(String),

    /// A row that didn't deserve to be a row. Callers skip these silently.
    #[error("unparseable row: {0}")]
    Parse(String),

    /// The database said no. Fatal to whatever was in flight; the
    /// surrounding transaction rolls back.
    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),
}
