// =============================================================================
// index.rs — THE INVERTED INDEX FOUNDRY
// =============================================================================
//
// feature -> value -> set of DOT numbers. This is the whole trick:
// instead of comparing every carrier against every other carrier
// (O(n^2) over the national census — no), we bucket carriers by shared
// identifier and only score within buckets. A bucket of one is a carrier
// minding its own business. A bucket of two is interesting. A bucket of
// two hundred is a truck-stop payphone number and rarity weighting will
// grind it into dust downstream.
//
// BTreeMaps and BTreeSets everywhere, because downstream steps iterate
// these and the same census must produce the same output byte for byte.
// =============================================================================

use std::collections::{BTreeMap, BTreeSet};

use crate::detect::features::extract_features;
use crate::models::{CarrierRecord, Feature, PriorRevokeFlag};

/// feature -> normalized value -> DOTs presenting that value.
pub type InvertedIndex = BTreeMap<Feature, BTreeMap<String, BTreeSet<i64>>>;

/// Build the full inverted index over the carrier universe, including the
/// synthetic prior-revoke buckets.
///
/// The prior-revoke bucket is keyed "{min_dot}_{max_dot}" and contains
/// exactly that pair — a frequency-2 bucket by construction, which makes
/// the scorer award it full weight. If the referenced predecessor is not
/// in the universe (FMCSA referenced a DOT we never fetched), the edge is
/// silently dropped: we can't link a carrier to a ghost.
pub fn build_inverted_index(carriers: &BTreeMap<i64, CarrierRecord>) -> InvertedIndex {
    let mut index: InvertedIndex = BTreeMap::new();

    for (dot, carrier) in carriers {
        for (feature, value) in extract_features(carrier) {
            index
                .entry(feature)
                .or_default()
                .entry(value)
                .or_default()
                .insert(*dot);
        }

        if carrier.prior_revoke_flag == PriorRevokeFlag::Yes {
            if let Some(target) = carrier.prior_revoke_dot {
                if carriers.contains_key(&target) {
                    let key = format!("{}_{}", (*dot).min(target), (*dot).max(target));
                    let bucket = index
                        .entry(Feature::PriorRevoke)
                        .or_default()
                        .entry(key)
                        .or_default();
                    bucket.insert(*dot);
                    bucket.insert(target);
                }
            }
        }
    }

    index
}

#[cfg(test)]
mod tests {
    use super::*;

    fn carrier(dot: i64, phone: &str) -> CarrierRecord {
        CarrierRecord {
            dot,
            legal_name: format!("CARRIER {dot}"),
            phone: Some(phone.to_string()),
            ..CarrierRecord::default()
        }
    }

    fn universe(carriers: Vec<CarrierRecord>) -> BTreeMap<i64, CarrierRecord> {
        carriers.into_iter().map(|c| (c.dot, c)).collect()
    }

    #[test]
    fn shared_phone_lands_in_one_bucket() {
        let idx = build_inverted_index(&universe(vec![
            carrier(1, "555-100-0001"),
            carrier(2, "5551000001"),
            carrier(3, "555-999-9999"),
        ]));
        let bucket = &idx[&Feature::Phone]["5551000001"];
        assert_eq!(bucket.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn prior_revoke_emits_synthetic_pair_bucket() {
        let mut reborn = carrier(2, "555-100-0001");
        reborn.prior_revoke_flag = PriorRevokeFlag::Yes;
        reborn.prior_revoke_dot = Some(1);
        let idx = build_inverted_index(&universe(vec![carrier(1, ""), reborn]));
        let bucket = &idx[&Feature::PriorRevoke]["1_2"];
        assert_eq!(bucket.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn prior_revoke_to_unknown_dot_is_dropped() {
        let mut reborn = carrier(2, "");
        reborn.prior_revoke_flag = PriorRevokeFlag::Yes;
        reborn.prior_revoke_dot = Some(999); // never fetched
        let idx = build_inverted_index(&universe(vec![reborn]));
        assert!(idx.get(&Feature::PriorRevoke).is_none());
    }

    #[test]
    fn empty_identifiers_create_no_buckets() {
        let idx = build_inverted_index(&universe(vec![carrier(1, ""), carrier(2, "12345")]));
        assert!(idx.get(&Feature::Phone).is_none());
    }
}
