// =============================================================================
// detect/mod.rs — THE DETECTION ENGINE, ASSEMBLED
// =============================================================================
//
// The full pipeline, in the only order it runs:
//
//   carriers -> features -> inverted index -> pairwise scores
//            -> temporal bonuses -> clusters -> risk scores -> store
//
// `analyze` is the pure heart: carriers in, verdicts out, no I/O, no
// clock, no randomness. Everything it touches is a BTree-something, so
// the same census produces byte-identical output every single time. The
// store-facing wrapper below it does the loading and the transactional
// write-back and nothing else.
//
// Single-threaded within a run, on purpose. The joy of a deterministic
// batch pipeline is that nobody ever has to ask "but what if two runs
// interleave" — they don't, and running two detections concurrently is
// forbidden because they would fight over the risk-score table.
// =============================================================================

pub mod cluster;
pub mod features;
pub mod index;
pub mod normalize;
pub mod risk;
pub mod scoring;

use std::collections::{BTreeMap, BTreeSet};

use tracing::info;

use crate::error::EngineError;
use crate::models::{CarrierCluster, CarrierLink, CarrierRecord, CarrierRiskScore};
use crate::store::Store;

pub use cluster::DEFAULT_CLUSTER_THRESHOLD;

/// Links below this score are computational lint: they flow through
/// clustering (which applies its own, higher threshold) but are not worth
/// a database row. Applied at persistence only.
pub const MEANINGFUL_LINK_CUTOFF: f64 = 5.0;

/// A composite score at or above this makes the end-of-run highlight reel.
const HIGH_RISK_CUTOFF: f64 = 70.0;

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

/// Everything a detection run derives, in final output order.
#[derive(Debug, Clone)]
pub struct DetectionOutput {
    /// All scored pairs (including sub-threshold ones), ordered by
    /// (-score, dot_a, dot_b), reasons ordered within each link.
    pub links: Vec<CarrierLink>,
    /// All clusters including singletons, ordered and id-stamped.
    pub clusters: Vec<CarrierCluster>,
    /// One verdict per carrier, ascending DOT.
    pub risk_scores: Vec<CarrierRiskScore>,
}

impl DetectionOutput {
    /// The links that earn a database row.
    pub fn meaningful_links(&self) -> impl Iterator<Item = &CarrierLink> {
        self.links
            .iter()
            .filter(|l| l.score >= MEANINGFUL_LINK_CUTOFF)
    }

    /// The clusters that earn a database row.
    pub fn multi_member_clusters(&self) -> impl Iterator<Item = &CarrierCluster> {
        self.clusters.iter().filter(|c| c.size > 1)
    }
}

/// Run the pure detection pipeline over an in-memory carrier universe.
pub fn analyze(carriers: &BTreeMap<i64, CarrierRecord>, threshold: f64) -> DetectionOutput {
    let index = index::build_inverted_index(carriers);
    for (feature, values) in &index {
        info!(feature = %feature, unique_values = values.len(), "index built");
    }

    let (mut pair_scores, mut pair_reasons) = scoring::score_pairwise_links(&index);
    info!(raw_pairs = pair_scores.len(), "pairwise scoring done");

    scoring::augment_temporal_signals(carriers, &mut pair_scores, &mut pair_reasons);

    let all_dots: BTreeSet<i64> = carriers.keys().copied().collect();
    let clusters = cluster::compute_clusters(&pair_scores, &all_dots, threshold);

    let risk = risk::compute_risk_scores(carriers, &clusters, &pair_scores, &pair_reasons);

    let mut links: Vec<CarrierLink> = pair_scores
        .iter()
        .map(|(&(dot_a, dot_b), &score)| {
            let mut reasons = pair_reasons.get(&(dot_a, dot_b)).cloned().unwrap_or_default();
            scoring::sort_reasons(&mut reasons);
            CarrierLink {
                dot_a,
                dot_b,
                score: round4(score),
                reasons,
            }
        })
        .collect();
    links.sort_by(|x, y| {
        y.score
            .total_cmp(&x.score)
            .then_with(|| x.dot_a.cmp(&y.dot_a))
            .then_with(|| x.dot_b.cmp(&y.dot_b))
    });

    DetectionOutput {
        links,
        clusters,
        risk_scores: risk.into_values().collect(),
    }
}

/// Load the universe, analyze it, and write the verdicts back — the
/// `detect` subcommand in one function.
pub async fn run_detection(
    store: &Store,
    threshold: f64,
    run_id: &str,
) -> Result<(), EngineError> {
    info!(run_id, threshold, "starting detection run");

    let carriers = store.load_carriers().await?;
    if carriers.is_empty() {
        return Err(EngineError::InputMissing);
    }
    info!(carriers = carriers.len(), "carrier universe loaded");

    let output = analyze(&carriers, threshold);

    let meaningful = output.meaningful_links().count();
    let multi = output.multi_member_clusters().count();
    let high_risk = output
        .risk_scores
        .iter()
        .filter(|rs| rs.composite_score >= HIGH_RISK_CUTOFF)
        .count();
    info!(
        raw_pairs = output.links.len(),
        meaningful_links = meaningful,
        multi_member_clusters = multi,
        high_risk_carriers = high_risk,
        "analysis complete"
    );

    let (links_written, clusters_written, risks_written) =
        store.persist_detection(run_id, &output).await?;
    info!(
        links_written,
        clusters_written, risks_written, "results persisted"
    );

    // The highlight reel: ten worst composites, ascending DOT on ties so
    // reruns print the same reel.
    let mut top: Vec<&CarrierRiskScore> = output.risk_scores.iter().collect();
    top.sort_by(|a, b| {
        b.composite_score
            .total_cmp(&a.composite_score)
            .then_with(|| a.dot.cmp(&b.dot))
    });
    for rs in top.iter().take(10) {
        info!(
            dot = rs.dot,
            composite = rs.composite_score,
            chameleon = rs.chameleon_score,
            safety = rs.safety_score,
            cluster_size = rs.cluster_size,
            "top risk"
        );
    }

    info!(run_id, "detection complete");
    Ok(())
}
