// =============================================================================
// features.rs — THE IDENTIFIER HARVESTER
// =============================================================================
//
// One carrier record goes in; a deduplicated set of (feature, value)
// tuples comes out. This is the entire vocabulary the pairwise scorer
// speaks. If a normalizer returns empty, the identifier never existed as
// far as the rest of the pipeline is concerned.
//
// The synthetic prior_revoke feature is NOT produced here — it needs to
// know whether the referenced predecessor DOT exists in the carrier
// universe, and a single carrier record can't answer that. The index
// builder handles it.
// =============================================================================

use std::collections::BTreeSet;

use crate::detect::normalize::{
    normalize_address, normalize_officer, normalize_phone, normalize_vin,
};
use crate::models::{CarrierRecord, Feature};

/// A VIN shorter than this is a partial scribble from a roadside
/// inspection form, not a vehicle identity.
pub const MIN_VIN_LEN: usize = 5;

fn opt(field: &Option<String>) -> &str {
    field.as_deref().unwrap_or("")
}

/// Extract every per-carrier identifier that participates in linking.
///
/// The BTreeSet gives us two properties for free: duplicates within one
/// carrier are suppressed (a carrier whose officer1 and officer2 are the
/// same person emits one officer tuple, not two), and iteration order is
/// deterministic.
pub fn extract_features(carrier: &CarrierRecord) -> BTreeSet<(Feature, String)> {
    let mut out = BTreeSet::new();

    let phone = normalize_phone(opt(&carrier.phone));
    if !phone.is_empty() {
        out.insert((Feature::Phone, phone));
    }
    let fax = normalize_phone(opt(&carrier.fax));
    if !fax.is_empty() {
        out.insert((Feature::Fax, fax));
    }
    let cell = normalize_phone(opt(&carrier.cell_phone));
    if !cell.is_empty() {
        out.insert((Feature::CellPhone, cell));
    }

    let address = normalize_address(
        opt(&carrier.phy_street),
        opt(&carrier.phy_city),
        opt(&carrier.phy_state),
    );
    if !address.is_empty() {
        out.insert((Feature::Address, address));
    }

    for officer in [&carrier.officer1, &carrier.officer2] {
        let name = normalize_officer(opt(officer));
        if !name.is_empty() {
            out.insert((Feature::Officer, name));
        }
    }

    for vin in &carrier.vins {
        let vin = normalize_vin(vin);
        if vin.len() >= MIN_VIN_LEN {
            out.insert((Feature::Vin, vin));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn carrier() -> CarrierRecord {
        CarrierRecord {
            dot: 42,
            legal_name: "SHADY SHIFTERS LLC".to_string(),
            phone: Some("555-100-0001".to_string()),
            fax: Some("555-100-0002".to_string()),
            phy_street: Some("10 First Street".to_string()),
            phy_city: Some("Austin".to_string()),
            phy_state: Some("TX".to_string()),
            officer1: Some("Acme Holdings".to_string()),
            officer2: Some("ACME   HOLDINGS".to_string()),
            vins: ["1HGBH41JXMN109186".to_string(), "ABC".to_string()]
                .into_iter()
                .collect(),
            ..CarrierRecord::default()
        }
    }

    #[test]
    fn extracts_all_participating_identifiers() {
        let feats = extract_features(&carrier());
        assert!(feats.contains(&(Feature::Phone, "5551000001".to_string())));
        assert!(feats.contains(&(Feature::Fax, "5551000002".to_string())));
        assert!(feats.contains(&(Feature::Address, "10 first st | austin | tx".to_string())));
        assert!(feats.contains(&(Feature::Vin, "1HGBH41JXMN109186".to_string())));
    }

    #[test]
    fn duplicate_officers_collapse_to_one_tuple() {
        let feats = extract_features(&carrier());
        let officers: Vec<_> = feats
            .iter()
            .filter(|(f, _)| *f == Feature::Officer)
            .collect();
        assert_eq!(officers.len(), 1);
        assert_eq!(officers[0].1, "ACME HOLDINGS");
    }

    #[test]
    fn short_vins_do_not_participate() {
        let feats = extract_features(&carrier());
        assert!(!feats.iter().any(|(f, v)| *f == Feature::Vin && v == "ABC"));
    }

    #[test]
    fn empty_carrier_emits_nothing() {
        let feats = extract_features(&CarrierRecord::default());
        assert!(feats.is_empty());
    }
}
