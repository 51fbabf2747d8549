// =============================================================================
// scoring.rs — THE AFFILIATION ARITHMETIC
// =============================================================================
//
// Two jobs live here:
//
// 1. The pairwise scorer walks every index bucket with at least two
//    tenants, enumerates the unordered pairs inside, and pays each pair
//    weight x rarity(bucket size). Rarity is the referee: a phone number
//    shared by exactly two carriers is damning (full weight), one shared
//    by forty carriers is a freight brokerage's front desk (1/20th
//    weight), and one carrier alone proves nothing (zero).
//
// 2. The temporal augmenter looks for the chameleon's signature move:
//    a fresh DOT appearing at an address within 180 days of another DOT
//    at that address going dark. No identifier is shared beyond the
//    address, but the timing is the tell, so it earns its own +40 on
//    top of whatever the address bucket already contributed.
//
// Every map in and out of this module is a BTreeMap. Same input, same
// output, byte for byte, forever. This is the hill we die on.
// =============================================================================

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::detect::normalize::normalize_address;
use crate::models::{CarrierRecord, Feature, Reason};

/// Unordered carrier pair, spelled the only legal way: (smaller, larger).
pub type PairKey = (i64, i64);

/// pair -> accumulated affiliation score (unrounded).
pub type PairScores = BTreeMap<PairKey, f64>;

/// pair -> the itemized receipts behind that score.
pub type PairReasons = BTreeMap<PairKey, Vec<Reason>>;

/// Reasons store at most this many characters of the shared value.
pub const REASON_VALUE_CAP: usize = 100;

/// Carriers whose status is one of these are "inactive" for the purposes
/// of the temporal signal. Matched case-insensitively.
const INACTIVE_STATUSES: [&str; 3] = ["NOT AUTHORIZED", "OUT OF SERVICE", "REVOKED"];

/// How close together two registrations at the same address must be, in
/// days (inclusive), for the timing to look like a hand-off.
pub const NEW_DOT_WINDOW_DAYS: i64 = 180;

/// Down-weight for common identifier values. A value shared by `freq`
/// carriers contributes `2/freq` of the feature weight to each pair:
/// freq 2 pays full price, freq 4 pays half, a lone carrier pays nothing
/// because there is no pair to pay.
pub fn rarity_weight(freq: usize) -> f64 {
    if freq <= 1 {
        0.0
    } else {
        2.0 / freq as f64
    }
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

fn truncate_value(value: &str) -> String {
    value.chars().take(REASON_VALUE_CAP).collect()
}

fn sorted_pair(a: i64, b: i64) -> PairKey {
    (a.min(b), a.max(b))
}

/// Walk the inverted index and accumulate weighted contributions into the
/// pair-score and pair-reason maps.
///
/// The temporal and reserved features are skipped here: address_new_dot
/// is computed by the augmenter below, and fleet_anomaly has a weight but
/// no extractor — a reserved slot, deliberately inert.
pub fn score_pairwise_links(
    index: &crate::detect::index::InvertedIndex,
) -> (PairScores, PairReasons) {
    let mut pair_scores: PairScores = BTreeMap::new();
    let mut pair_reasons: PairReasons = BTreeMap::new();

    for feature in Feature::ALL {
        if matches!(feature, Feature::AddressNewDot | Feature::FleetAnomaly) {
            continue;
        }
        let Some(buckets) = index.get(&feature) else {
            continue;
        };

        for (value, members) in buckets {
            let freq = members.len();
            if freq < 2 {
                continue;
            }
            let contribution = feature.weight() * rarity_weight(freq);
            if contribution <= 0.0 {
                continue;
            }

            // BTreeSet iteration is ascending, so a < b for free.
            let member_list: Vec<i64> = members.iter().copied().collect();
            for (i, &a) in member_list.iter().enumerate() {
                for &b in &member_list[i + 1..] {
                    *pair_scores.entry((a, b)).or_insert(0.0) += contribution;
                    pair_reasons.entry((a, b)).or_default().push(Reason {
                        feature,
                        value: truncate_value(value),
                        frequency: freq,
                        contribution: round4(contribution),
                    });
                }
            }
        }
    }

    debug!(pairs = pair_scores.len(), "pairwise scoring complete");
    (pair_scores, pair_reasons)
}

fn is_inactive(status: &str) -> bool {
    let upper = status.trim().to_uppercase();
    INACTIVE_STATUSES.contains(&upper.as_str())
}

/// Scan same-address groups for the new-DOT-replaces-dead-DOT pattern and
/// append bonus contributions to the maps built by the pairwise scorer.
///
/// Qualifying pair: same normalized address, at least one side inactive,
/// both registration dates known, registrations at most 180 days apart
/// (inclusive). Each qualifying address group contributes once per pair;
/// there is no deduplication against the plain address feature — timing
/// is new information, so it stacks.
pub fn augment_temporal_signals(
    carriers: &BTreeMap<i64, CarrierRecord>,
    pair_scores: &mut PairScores,
    pair_reasons: &mut PairReasons,
) {
    type Tenant = (i64, Option<NaiveDate>, String);
    let mut addr_groups: BTreeMap<String, Vec<Tenant>> = BTreeMap::new();

    for (dot, carrier) in carriers {
        let addr = normalize_address(
            carrier.phy_street.as_deref().unwrap_or(""),
            carrier.phy_city.as_deref().unwrap_or(""),
            carrier.phy_state.as_deref().unwrap_or(""),
        );
        if !addr.is_empty() {
            addr_groups.entry(addr).or_default().push((
                *dot,
                carrier.add_date,
                carrier.status_code.clone().unwrap_or_default(),
            ));
        }
    }

    let mut bonuses = 0usize;
    for tenants in addr_groups.values() {
        if tenants.len() < 2 {
            continue;
        }
        for (i, (dot_a, date_a, status_a)) in tenants.iter().enumerate() {
            for (dot_b, date_b, status_b) in &tenants[i + 1..] {
                if !(is_inactive(status_a) || is_inactive(status_b)) {
                    continue;
                }
                let (Some(da), Some(db)) = (date_a, date_b) else {
                    continue;
                };
                let diff_days = (*da - *db).num_days().abs();
                if diff_days > NEW_DOT_WINDOW_DAYS {
                    continue;
                }

                let pair = sorted_pair(*dot_a, *dot_b);
                let contribution = Feature::AddressNewDot.weight();
                *pair_scores.entry(pair).or_insert(0.0) += contribution;
                pair_reasons.entry(pair).or_default().push(Reason {
                    feature: Feature::AddressNewDot,
                    value: format!("Same address, {diff_days}d apart, one inactive"),
                    frequency: 2,
                    contribution: round4(contribution),
                });
                bonuses += 1;
            }
        }
    }

    debug!(bonuses, "temporal augmentation complete");
}

/// Order a link's reasons the canonical way: biggest contribution first,
/// then the fixed feature order, then the value itself.
pub fn sort_reasons(reasons: &mut [Reason]) {
    reasons.sort_by(|a, b| {
        b.contribution
            .total_cmp(&a.contribution)
            .then_with(|| a.feature.index().cmp(&b.feature.index()))
            .then_with(|| a.value.cmp(&b.value))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::index::build_inverted_index;

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

    #[test]
    fn rarity_boundaries() {
        assert_eq!(rarity_weight(0), 0.0);
        assert_eq!(rarity_weight(1), 0.0);
        assert_eq!(rarity_weight(2), 1.0);
        assert_eq!(rarity_weight(4), 0.5);
    }

    #[test]
    fn two_sharers_pay_full_weight() {
        let mut a = carrier(1);
        a.phone = Some("555-100-0001".to_string());
        let mut b = carrier(2);
        b.phone = Some("5551000001".to_string());
        let idx = build_inverted_index(&universe(vec![a, b]));
        let (scores, reasons) = score_pairwise_links(&idx);

        assert_eq!(scores[&(1, 2)], 40.0);
        let rs = &reasons[&(1, 2)];
        assert_eq!(rs.len(), 1);
        assert_eq!(rs[0].feature, Feature::Phone);
        assert_eq!(rs[0].frequency, 2);
        assert_eq!(rs[0].contribution, 40.0);
    }

    #[test]
    fn three_sharers_split_the_weight() {
        // freq=3 -> rarity 2/3 -> each pair gets 40 * 2/3 ≈ 26.667,
        // which sits below the default clustering threshold. By design:
        // a three-way shared phone is a lead, not a network.
        let carriers: Vec<CarrierRecord> = (1..=3)
            .map(|dot| {
                let mut c = carrier(dot);
                c.phone = Some("555-000-0000".to_string());
                c
            })
            .collect();
        let idx = build_inverted_index(&universe(carriers));
        let (scores, _) = score_pairwise_links(&idx);

        assert_eq!(scores.len(), 3);
        for pair in [(1, 2), (1, 3), (2, 3)] {
            let s = scores[&pair];
            assert!((s - 40.0 * 2.0 / 3.0).abs() < 1e-9, "score was {s}");
            assert!(s < 30.0);
        }
    }

    #[test]
    fn pairs_are_always_ascending() {
        let mut a = carrier(900);
        a.officer1 = Some("ACME HOLDINGS".to_string());
        let mut b = carrier(7);
        b.officer1 = Some("ACME HOLDINGS".to_string());
        let idx = build_inverted_index(&universe(vec![a, b]));
        let (scores, _) = score_pairwise_links(&idx);
        assert!(scores.contains_key(&(7, 900)));
        for (a, b) in scores.keys() {
            assert!(a < b);
        }
    }

    #[test]
    fn reason_values_are_capped_at_100_chars() {
        let long_street = "x".repeat(300);
        let mut a = carrier(1);
        a.phy_street = Some(long_street.clone());
        a.phy_city = Some("Austin".to_string());
        a.phy_state = Some("TX".to_string());
        let mut b = carrier(2);
        b.phy_street = Some(long_street);
        b.phy_city = Some("Austin".to_string());
        b.phy_state = Some("TX".to_string());
        let idx = build_inverted_index(&universe(vec![a, b]));
        let (_, reasons) = score_pairwise_links(&idx);
        assert_eq!(reasons[&(1, 2)][0].value.chars().count(), 100);
    }

    fn tenant(dot: i64, date: &str, status: &str) -> CarrierRecord {
        let mut c = carrier(dot);
        c.phy_street = Some("10 First Street".to_string());
        c.phy_city = Some("Austin".to_string());
        c.phy_state = Some("TX".to_string());
        c.add_date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok();
        c.status_code = Some(status.to_string());
        c
    }

    #[test]
    fn temporal_bonus_inside_window() {
        let carriers = universe(vec![
            tenant(1, "2024-01-01", "ACTIVE"),
            tenant(2, "2024-02-10", "OUT OF SERVICE"),
        ]);
        let idx = build_inverted_index(&carriers);
        let (mut scores, mut reasons) = score_pairwise_links(&idx);
        augment_temporal_signals(&carriers, &mut scores, &mut reasons);

        // 25 for the shared address bucket, plus the 40 temporal bonus.
        assert_eq!(scores[&(1, 2)], 65.0);
        let temporal: Vec<_> = reasons[&(1, 2)]
            .iter()
            .filter(|r| r.feature == Feature::AddressNewDot)
            .collect();
        assert_eq!(temporal.len(), 1);
        assert_eq!(temporal[0].value, "Same address, 40d apart, one inactive");
        assert_eq!(temporal[0].contribution, 40.0);
    }

    #[test]
    fn temporal_window_is_inclusive_at_180() {
        let at_180 = universe(vec![
            tenant(1, "2024-01-01", "REVOKED"),
            tenant(2, "2024-06-29", "ACTIVE"),
        ]);
        let idx = build_inverted_index(&at_180);
        let (mut scores, mut reasons) = score_pairwise_links(&idx);
        augment_temporal_signals(&at_180, &mut scores, &mut reasons);
        assert_eq!(scores[&(1, 2)], 65.0);

        let at_181 = universe(vec![
            tenant(1, "2024-01-01", "REVOKED"),
            tenant(2, "2024-06-30", "ACTIVE"),
        ]);
        let idx = build_inverted_index(&at_181);
        let (mut scores, mut reasons) = score_pairwise_links(&idx);
        augment_temporal_signals(&at_181, &mut scores, &mut reasons);
        assert_eq!(scores[&(1, 2)], 25.0); // address only, no bonus
    }

    #[test]
    fn temporal_requires_an_inactive_tenant() {
        let carriers = universe(vec![
            tenant(1, "2024-01-01", "ACTIVE"),
            tenant(2, "2024-02-01", "ACTIVE"),
        ]);
        let idx = build_inverted_index(&carriers);
        let (mut scores, mut reasons) = score_pairwise_links(&idx);
        augment_temporal_signals(&carriers, &mut scores, &mut reasons);
        assert_eq!(scores[&(1, 2)], 25.0);
    }

    #[test]
    fn temporal_requires_both_dates() {
        let mut undated = tenant(2, "2024-02-01", "REVOKED");
        undated.add_date = None;
        let carriers = universe(vec![tenant(1, "2024-01-01", "ACTIVE"), undated]);
        let idx = build_inverted_index(&carriers);
        let (mut scores, mut reasons) = score_pairwise_links(&idx);
        augment_temporal_signals(&carriers, &mut scores, &mut reasons);
        assert_eq!(scores[&(1, 2)], 25.0);
    }

    #[test]
    fn reason_sum_matches_score() {
        let mut a = tenant(1, "2024-01-01", "REVOKED");
        a.phone = Some("555-100-0001".to_string());
        a.officer1 = Some("ACME HOLDINGS".to_string());
        let mut b = tenant(2, "2024-02-10", "ACTIVE");
        b.phone = Some("5551000001".to_string());
        b.officer1 = Some("ACME HOLDINGS".to_string());
        let carriers = universe(vec![a, b]);
        let idx = build_inverted_index(&carriers);
        let (mut scores, mut reasons) = score_pairwise_links(&idx);
        augment_temporal_signals(&carriers, &mut scores, &mut reasons);

        let total: f64 = reasons[&(1, 2)].iter().map(|r| r.contribution).sum();
        assert!((total - scores[&(1, 2)]).abs() < 1e-6);
    }

    #[test]
    fn sort_reasons_orders_by_contribution_then_feature() {
        let mut reasons = vec![
            Reason {
                feature: Feature::Address,
                value: "addr".to_string(),
                frequency: 2,
                contribution: 25.0,
            },
            Reason {
                feature: Feature::AddressNewDot,
                value: "Same address, 40d apart, one inactive".to_string(),
                frequency: 2,
                contribution: 40.0,
            },
            Reason {
                feature: Feature::Phone,
                value: "5551000001".to_string(),
                frequency: 2,
                contribution: 40.0,
            },
        ];
        sort_reasons(&mut reasons);
        // Equal contributions: phone (index 3) beats address_new_dot (index 7).
        assert_eq!(reasons[0].feature, Feature::Phone);
        assert_eq!(reasons[1].feature, Feature::AddressNewDot);
        assert_eq!(reasons[2].feature, Feature::Address);
    }
}
