// ═══════════════════════════════════════════════════════════════
// METRICS COLLECTOR - Because if you can't measure it, it didn't happen
// ═══════════════════════════════════════════════════════════════
//
// Atomic counters for every interesting thing the ingestion pipeline
// does. Lock-free because we're THAT paranoid about contention, even in
// a pipeline that is, frankly, mostly sequential.
//
// No HTTP server here — the engine is a finite batch run, not a daemon,
// so the counters get one job: a structured summary line at the end of
// the run that tells you exactly how much government JSON you just
// ingested and how much of it you politely declined to write twice.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::Serialize;
use tracing::info;

/// Point-in-time snapshot, serializable for the summary log line.
#[derive(Debug, Clone, Serialize)]
pub struct IngestSnapshot {
    pub pages_fetched: u64,
    pub rows_fetched: u64,
    pub carriers_upserted: u64,
    pub crashes_upserted: u64,
    pub inspections_upserted: u64,
    pub duplicate_rows_skipped: u64,
    pub http_retries: u64,
    pub stage_failures: u64,
    pub elapsed_seconds: u64,
}

/// Thread-safe atomic metrics collector. Every counter is atomic because
/// mutexes are for the weak.
pub struct IngestMetrics {
    pages_fetched: AtomicU64,
    rows_fetched: AtomicU64,
    carriers_upserted: AtomicU64,
    crashes_upserted: AtomicU64,
    inspections_upserted: AtomicU64,
    duplicate_rows_skipped: AtomicU64,
    http_retries: AtomicU64,
    stage_failures: AtomicU64,
    started: Instant,
}

impl IngestMetrics {
    pub fn new() -> Self {
        Self {
            pages_fetched: AtomicU64::new(0),
            rows_fetched: AtomicU64::new(0),
            carriers_upserted: AtomicU64::new(0),
            crashes_upserted: AtomicU64::new(0),
            inspections_upserted: AtomicU64::new(0),
            duplicate_rows_skipped: AtomicU64::new(0),
            http_retries: AtomicU64::new(0),
            stage_failures: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    pub fn record_page(&self, rows: u64) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
        self.rows_fetched.fetch_add(rows, Ordering::Relaxed);
    }

    pub fn record_carriers_upserted(&self, n: u64) {
        self.carriers_upserted.fetch_add(n, Ordering::Relaxed);
    }

    pub fn record_crashes_upserted(&self, n: u64) {
        self.crashes_upserted.fetch_add(n, Ordering::Relaxed);
    }

    pub fn record_inspections_upserted(&self, n: u64) {
        self.inspections_upserted.fetch_add(n, Ordering::Relaxed);
    }

    pub fn record_duplicates_skipped(&self, n: u64) {
        self.duplicate_rows_skipped.fetch_add(n, Ordering::Relaxed);
    }

    pub fn record_http_retry(&self) {
        self.http_retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stage_failure(&self) {
        self.stage_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stage_failures(&self) -> u64 {
        self.stage_failures.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> IngestSnapshot {
        IngestSnapshot {
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            rows_fetched: self.rows_fetched.load(Ordering::Relaxed),
            carriers_upserted: self.carriers_upserted.load(Ordering::Relaxed),
            crashes_upserted: self.crashes_upserted.load(Ordering::Relaxed),
            inspections_upserted: self.inspections_upserted.load(Ordering::Relaxed),
            duplicate_rows_skipped: self.duplicate_rows_skipped.load(Ordering::Relaxed),
            http_retries: self.http_retries.load(Ordering::Relaxed),
            stage_failures: self.stage_failures.load(Ordering::Relaxed),
            elapsed_seconds: self.started.elapsed().as_secs(),
        }
    }

    /// The final word on the run. One line, every number that matters.
    pub fn log_summary(&self) {
        let s = self.snapshot();
        info!(
            pages = s.pages_fetched,
            rows = s.rows_fetched,
            carriers = s.carriers_upserted,
            crashes = s.crashes_upserted,
            inspections = s.inspections_upserted,
            dupes_skipped = s.duplicate_rows_skipped,
            retries = s.http_retries,
            stage_failures = s.stage_failures,
            elapsed_secs = s.elapsed_seconds,
            "ingestion summary"
        );
    }
}

impl Default for IngestMetrics {
    fn default() -> Self {
        Self::new()
    }
}
