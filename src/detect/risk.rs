// =============================================================================
// risk.rs — THE VERDICT CALCULATOR
// =============================================================================
//
// Everything upstream was evidence collection. This is sentencing — except
// we don't sentence anyone, we produce a 0-100 number and a list of
// signal tokens so the human reading the report can see exactly which
// facts moved the needle. Every point awarded comes with a receipt.
//
// Two sub-scores, one blend:
//   chameleon — does this carrier look like a reincarnation?
//   safety    — does this carrier hurt people?
//   composite — 0.7 x chameleon + 0.3 x safety, because a dangerous
//               chameleon is the thing this whole engine exists to find.
// =============================================================================

use std::collections::BTreeMap;

use crate::detect::scoring::{PairReasons, PairScores};
use crate::models::{CarrierCluster, CarrierRecord, CarrierRiskScore, Feature, PriorRevokeFlag};

/// Link scores above this mark a carrier as having at least one
/// high-confidence affiliation.
const STRONG_LINK_CUTOFF: f64 = 50.0;

/// A cluster must be at least this big before membership alone is
/// suspicious. Two carriers sharing an address is a landlord; three or
/// more start to look like a shell game.
const SUSPICIOUS_CLUSTER_SIZE: usize = 3;

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Combine per-carrier signals into chameleon, safety, and composite
/// scores. Consumes the full (unfiltered) pair maps: a link too weak to
/// persist can still carry the VIN reason that bumps a carrier's score.
pub fn compute_risk_scores(
    carriers: &BTreeMap<i64, CarrierRecord>,
    clusters: &[CarrierCluster],
    pair_scores: &PairScores,
    pair_reasons: &PairReasons,
) -> BTreeMap<i64, CarrierRiskScore> {
    // Cluster membership lookup. Singletons are in here too, size 1.
    let mut dot_to_cluster: BTreeMap<i64, &CarrierCluster> = BTreeMap::new();
    for cluster in clusters {
        for dot in &cluster.members {
            dot_to_cluster.insert(*dot, cluster);
        }
    }

    // Per-carrier link aggregates: the hottest incident link, and how
    // many shared-VIN reasons touch this carrier across all its links.
    let mut dot_max_link: BTreeMap<i64, f64> = BTreeMap::new();
    let mut dot_shared_vins: BTreeMap<i64, usize> = BTreeMap::new();
    for ((a, b), reasons) in pair_reasons {
        for reason in reasons {
            if reason.feature == Feature::Vin {
                *dot_shared_vins.entry(*a).or_insert(0) += 1;
                *dot_shared_vins.entry(*b).or_insert(0) += 1;
            }
        }
        let score = pair_scores.get(&(*a, *b)).copied().unwrap_or(0.0);
        for dot in [a, b] {
            let entry = dot_max_link.entry(*dot).or_insert(0.0);
            if score > *entry {
                *entry = score;
            }
        }
    }

    let mut risk_scores = BTreeMap::new();

    for (dot, carrier) in carriers {
        let mut signals: Vec<String> = Vec::new();
        let mut chameleon = 0.0f64;
        let mut safety = 0.0f64;

        // ── Chameleon components ────────────────────────────────────
        if carrier.prior_revoke_flag == PriorRevokeFlag::Yes {
            chameleon += 40.0;
            signals.push("prior_revoke_flag".to_string());
        }

        let cluster_size = dot_to_cluster.get(dot).map_or(1, |c| c.size);
        if cluster_size >= SUSPICIOUS_CLUSTER_SIZE {
            chameleon += 20.0;
            signals.push(format!("cluster_size_{cluster_size}"));
        }

        let max_link = dot_max_link.get(dot).copied().unwrap_or(0.0);
        if max_link > STRONG_LINK_CUTOFF {
            chameleon += 10.0;
            signals.push(format!("max_link_{}", max_link.floor() as i64));
        }

        let shared_vins = dot_shared_vins.get(dot).copied().unwrap_or(0);
        let vin_bonus = (shared_vins as f64 * 10.0).min(30.0);
        if vin_bonus > 0.0 {
            chameleon += vin_bonus;
            signals.push(format!("shared_vins_{shared_vins}"));
        }

        chameleon = chameleon.min(100.0);

        // ── Safety components ───────────────────────────────────────
        let crash_count = carrier.crash_count;
        if crash_count > 0 {
            safety += (20.0 + 5.0 * crash_count as f64).min(50.0);
            signals.push(format!("crashes_{crash_count}"));
        }

        if carrier.fatalities > 0 {
            safety += 30.0;
            signals.push(format!("fatalities_{}", carrier.fatalities));
        }

        let power_units = carrier.power_units.unwrap_or(0);
        if power_units > 0 && crash_count > 0 {
            let ratio = crash_count as f64 / power_units as f64;
            if ratio > 0.5 {
                safety += 20.0;
                signals.push("high_crash_ratio".to_string());
            }
        }

        safety = safety.min(100.0);

        let composite = round2(0.7 * chameleon + 0.3 * safety);

        risk_scores.insert(
            *dot,
            CarrierRiskScore {
                dot: *dot,
                chameleon_score: round2(chameleon),
                safety_score: round2(safety),
                composite_score: composite,
                signals,
                cluster_size,
            },
        );
    }

    risk_scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Reason;

    fn carrier(dot: i64) -> CarrierRecord {
        CarrierRecord {
            dot,
            legal_name: format!("CARRIER {dot}"),
            ..CarrierRecord::default()
        }
    }

    fn universe(carriers: Vec<CarrierRecord>) -> BTreeMap<i64, CarrierRecord> {
        carriers.into_iter().map(|c| (c.dot, c)).collect()
    }

    fn cluster(id: &str, members: &[i64], max: f64) -> CarrierCluster {
        CarrierCluster {
            cluster_id: id.to_string(),
            size: members.len(),
            edge_count: if members.len() > 1 { members.len() - 1 } else { 0 },
            avg_link_score: max,
            max_link_score: max,
            members: members.to_vec(),
        }
    }

    #[test]
    fn prior_revoke_flag_is_forty_points() {
        let mut c = carrier(1);
        c.prior_revoke_flag = PriorRevokeFlag::Yes;
        let scores = compute_risk_scores(
            &universe(vec![c]),
            &[],
            &PairScores::new(),
            &PairReasons::new(),
        );
        let rs = &scores[&1];
        assert_eq!(rs.chameleon_score, 40.0);
        assert_eq!(rs.signals, vec!["prior_revoke_flag"]);
        // Composite floor for a flagged carrier: 0.7 * 40 = 28.
        assert_eq!(rs.composite_score, 28.0);
        assert_eq!(rs.cluster_size, 1);
    }

    #[test]
    fn pair_cluster_earns_nothing_trio_earns_twenty() {
        let carriers = universe(vec![carrier(1), carrier(2), carrier(3)]);
        let pair = cluster("C0001", &[1, 2], 60.0);
        let scores = compute_risk_scores(
            &carriers,
            std::slice::from_ref(&pair),
            &PairScores::new(),
            &PairReasons::new(),
        );
        assert!(!scores[&1].signals.iter().any(|s| s.starts_with("cluster_size")));
        assert_eq!(scores[&1].cluster_size, 2);

        let trio = cluster("C0001", &[1, 2, 3], 60.0);
        let scores = compute_risk_scores(
            &carriers,
            std::slice::from_ref(&trio),
            &PairScores::new(),
            &PairReasons::new(),
        );
        assert_eq!(scores[&1].chameleon_score, 20.0);
        assert_eq!(scores[&1].signals, vec!["cluster_size_3"]);
        assert_eq!(scores[&1].cluster_size, 3);
    }

    #[test]
    fn strong_link_earns_ten_with_floored_signal() {
        let mut pair_scores = PairScores::new();
        pair_scores.insert((1, 2), 160.7);
        let mut pair_reasons = PairReasons::new();
        pair_reasons.insert(
            (1, 2),
            vec![Reason {
                feature: Feature::Phone,
                value: "5551000001".to_string(),
                frequency: 2,
                contribution: 40.0,
            }],
        );
        let scores = compute_risk_scores(
            &universe(vec![carrier(1), carrier(2)]),
            &[],
            &pair_scores,
            &pair_reasons,
        );
        assert_eq!(scores[&1].chameleon_score, 10.0);
        assert_eq!(scores[&1].signals, vec!["max_link_160"]);
    }

    #[test]
    fn shared_vins_cap_at_thirty() {
        let mut pair_scores = PairScores::new();
        pair_scores.insert((1, 2), 240.0);
        let vin_reason = |v: &str| Reason {
            feature: Feature::Vin,
            value: v.to_string(),
            frequency: 2,
            contribution: 60.0,
        };
        let mut pair_reasons = PairReasons::new();
        pair_reasons.insert(
            (1, 2),
            vec![
                vin_reason("VIN00001"),
                vin_reason("VIN00002"),
                vin_reason("VIN00003"),
                vin_reason("VIN00004"),
            ],
        );
        let scores = compute_risk_scores(
            &universe(vec![carrier(1), carrier(2)]),
            &[],
            &pair_scores,
            &pair_reasons,
        );
        // 10 for the strong link + min(4 * 10, 30) for the VINs.
        assert_eq!(scores[&1].chameleon_score, 40.0);
        assert!(scores[&1].signals.contains(&"shared_vins_4".to_string()));
    }

    #[test]
    fn single_shared_vin_is_ten_points() {
        let mut pair_scores = PairScores::new();
        pair_scores.insert((1, 2), 60.0);
        let mut pair_reasons = PairReasons::new();
        pair_reasons.insert(
            (1, 2),
            vec![Reason {
                feature: Feature::Vin,
                value: "1HGBH41JXMN109186".to_string(),
                frequency: 2,
                contribution: 60.0,
            }],
        );
        let scores = compute_risk_scores(
            &universe(vec![carrier(1), carrier(2)]),
            &[],
            &pair_scores,
            &pair_reasons,
        );
        // Link score 60 > 50 (+10), one VIN reason (+10).
        assert_eq!(scores[&1].chameleon_score, 20.0);
        assert!(scores[&1].signals.contains(&"shared_vins_1".to_string()));
        assert_eq!(scores[&2].chameleon_score, 20.0);
    }

    #[test]
    fn safety_components_stack_and_clamp() {
        let mut c = carrier(1);
        c.power_units = Some(10);
        c.crash_count = 6;
        c.fatalities = 1;
        let scores = compute_risk_scores(
            &universe(vec![c]),
            &[],
            &PairScores::new(),
            &PairReasons::new(),
        );
        let rs = &scores[&1];
        // min(20 + 5*6, 50) + 30 + 20 = 100, clamped at 100.
        assert_eq!(rs.safety_score, 100.0);
        assert_eq!(rs.composite_score, 30.0);
        assert_eq!(
            rs.signals,
            vec!["crashes_6", "fatalities_1", "high_crash_ratio"]
        );
    }

    #[test]
    fn crash_ratio_requires_power_units() {
        let mut c = carrier(1);
        c.crash_count = 3;
        c.power_units = None;
        let scores = compute_risk_scores(
            &universe(vec![c]),
            &[],
            &PairScores::new(),
            &PairReasons::new(),
        );
        assert!(!scores[&1].signals.contains(&"high_crash_ratio".to_string()));
        assert_eq!(scores[&1].safety_score, 35.0); // 20 + 5*3
    }

    #[test]
    fn composite_is_the_seventy_thirty_blend() {
        let mut c = carrier(1);
        c.prior_revoke_flag = PriorRevokeFlag::Yes;
        c.crash_count = 1;
        let scores = compute_risk_scores(
            &universe(vec![c]),
            &[],
            &PairScores::new(),
            &PairReasons::new(),
        );
        let rs = &scores[&1];
        assert_eq!(rs.chameleon_score, 40.0);
        assert_eq!(rs.safety_score, 25.0);
        assert_eq!(rs.composite_score, 35.5); // 0.7*40 + 0.3*25
    }
}
