// =============================================================================
// models.rs — THE SACRED DATA STRUCTURES OF REGULATORY EVASION
// =============================================================================
//
// These structs represent the fundamental building blocks of our chameleon
// detection system. A "chameleon carrier" is a motor carrier that gets its
// operating authority revoked, waits a polite interval (sometimes days,
// sometimes hours), and re-registers under a brand-new USDOT number with
// the same trucks, the same officers, the same phone number, and frequently
// the same parking lot. Our job is to notice.
//
// Is it overkill to model nine distinct affiliation features with a fixed
// tie-breaking order? Yes. Do we care? Absolutely not.
// =============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// The affiliation features that can tie two carriers together.
///
/// This is a CLOSED enumeration with a FIXED order. The order matters:
/// it is the tie-breaker when two reasons on the same link carry equal
/// contributions, and determinism is non-negotiable because these scores
/// feed regulator-facing decisions. Nobody wants to explain to an auditor
/// why the same census produced two different reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// Same vehicle identification number showing up under two DOTs.
    /// Trucks don't clone themselves. This is the strongest tell we have.
    Vin,

    /// Same principal/officer name on two registrations. People DO share
    /// names, which is why rarity down-weighting exists, but "JOHN SMITH
    /// TRUCKING LLC" folding and "SMITH JOHN CARRIERS INC" appearing with
    /// the same officer is the oldest trick in the book.
    Officer,

    /// FMCSA's own census says so: the new registration explicitly points
    /// at a previously revoked DOT. The government did our job for us.
    PriorRevoke,

    /// Shared phone number. Chameleons keep their dispatch lines.
    Phone,

    /// Shared fax number. Yes, fax. The freight industry still faxes.
    Fax,

    /// Shared cell phone.
    CellPhone,

    /// Shared normalized physical address. Weakest of the direct features
    /// because office parks exist.
    Address,

    /// Temporal signal: a new DOT appears at the same address within 180
    /// days of another DOT there going inactive. Not extracted from any
    /// field — computed by the temporal augmenter.
    AddressNewDot,

    /// Reserved slot for "new entrant with a suspiciously large fleet".
    /// Declared in the weight table, produced by nothing. Yet.
    FleetAnomaly,
}

impl Feature {
    /// Every feature, in the canonical tie-breaking order.
    pub const ALL: [Feature; 9] = [
        Feature::Vin,
        Feature::Officer,
        Feature::PriorRevoke,
        Feature::Phone,
        Feature::Fax,
        Feature::CellPhone,
        Feature::Address,
        Feature::AddressNewDot,
        Feature::FleetAnomaly,
    ];

    /// The fixed scoring weight for this feature. Compile-time constants,
    /// not runtime configuration — the model IS the program.
    pub const fn weight(self) -> f64 {
        match self {
            Feature::Vin => 60.0,
            Feature::Officer => 55.0,
            Feature::PriorRevoke => 50.0,
            Feature::Phone => 40.0,
            Feature::Fax => 35.0,
            Feature::CellPhone => 35.0,
            Feature::Address => 25.0,
            Feature::AddressNewDot => 40.0,
            Feature::FleetAnomaly => 30.0,
        }
    }

    /// Position in the canonical order, used as the secondary sort key
    /// when ordering reasons within a link.
    pub const fn index(self) -> usize {
        match self {
            Feature::Vin => 0,
            Feature::Officer => 1,
            Feature::PriorRevoke => 2,
            Feature::Phone => 3,
            Feature::Fax => 4,
            Feature::CellPhone => 5,
            Feature::Address => 6,
            Feature::AddressNewDot => 7,
            Feature::FleetAnomaly => 8,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Feature::Vin => "vin",
            Feature::Officer => "officer",
            Feature::PriorRevoke => "prior_revoke",
            Feature::Phone => "phone",
            Feature::Fax => "fax",
            Feature::CellPhone => "cell_phone",
            Feature::Address => "address",
            Feature::AddressNewDot => "address_new_dot",
            Feature::FleetAnomaly => "fleet_anomaly",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// FMCSA's tri-state answer to "was this carrier previously revoked?".
/// The census field is a Y/N string except when it's empty, null, or
/// something creative. We refuse to pass raw strings around.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriorRevokeFlag {
    Yes,
    No,
    #[default]
    Unknown,
}

impl PriorRevokeFlag {
    pub fn from_code(code: Option<&str>) -> Self {
        match code.map(str::trim) {
            Some("Y") | Some("y") => PriorRevokeFlag::Yes,
            Some("N") | Some("n") => PriorRevokeFlag::No,
            _ => PriorRevokeFlag::Unknown,
        }
    }
}

/// One motor carrier as we know it: the census registration fields plus the
/// derived bits (VINs from inspections, crash aggregates) that the store
/// gateway joins in at load time.
///
/// Twenty-odd fields for one trucking company. The government needs two
/// identifiers (DOT and docket) to track one of these; we can afford
/// twenty fields.
#[derive(Debug, Clone, Default)]
pub struct CarrierRecord {
    /// The USDOT number. Primary key here, primary key in the store,
    /// primary key in the hearts of FMCSA analysts everywhere.
    pub dot: i64,

    pub legal_name: String,
    pub dba_name: Option<String>,

    // Physical address, as registered. Chameleons are remarkably lazy
    // about moving.
    pub phy_street: Option<String>,
    pub phy_city: Option<String>,
    pub phy_state: Option<String>,
    pub phy_zip: Option<String>,

    pub phone: Option<String>,
    pub fax: Option<String>,
    pub cell_phone: Option<String>,

    pub officer1: Option<String>,
    pub officer2: Option<String>,

    /// Operating authority status as reported by the census.
    /// "NOT AUTHORIZED", "OUT OF SERVICE", and "REVOKED" are the
    /// inactive statuses the temporal augmenter cares about.
    pub status_code: Option<String>,

    pub prior_revoke_flag: PriorRevokeFlag,
    /// The DOT of the revoked predecessor, when FMCSA knows it.
    pub prior_revoke_dot: Option<i64>,

    /// Registration date. Drives the 180-day temporal window.
    pub add_date: Option<NaiveDate>,

    pub power_units: Option<i64>,
    pub total_drivers: Option<i64>,
    pub fleet_size: Option<String>,
    pub docket_prefix: Option<String>,
    pub docket_number: Option<String>,

    /// VINs observed on this carrier's roadside inspections. Uppercased
    /// and trimmed at load; the extractor additionally demands length >= 5
    /// before a VIN participates in linking.
    pub vins: BTreeSet<String>,

    /// Crash aggregates, joined in from the crash table at load time.
    pub crash_count: i64,
    pub fatalities: i64,
}

/// One crash report row. Many per carrier, sadly.
#[derive(Debug, Clone)]
pub struct CrashRecord {
    pub dot: i64,
    pub report_date: Option<NaiveDate>,
    pub report_number: Option<String>,
    pub state: Option<String>,
    pub fatalities: i64,
    pub injuries: i64,
    pub tow_away: bool,
}

/// One roadside inspection row. The VIN is the payload we actually want;
/// everything else is context.
#[derive(Debug, Clone)]
pub struct InspectionRecord {
    pub dot: i64,
    pub inspection_date: Option<NaiveDate>,
    pub vin: Option<String>,
    pub state: Option<String>,
    pub vehicle_oos_total: i64,
    pub driver_oos_total: i64,
}

/// Why two carriers are linked: one feature match, with receipts.
///
/// Serialized as a JSON array on the link row so a human (or the web app
/// we refuse to think about) can read exactly which shared identifier
/// contributed what.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reason {
    pub feature: Feature,
    /// The shared value, truncated to 100 chars before storage. Nobody
    /// needs the 400-character street address in full. Twice.
    pub value: String,
    /// How many carriers share this value. Always >= 2, or it wouldn't
    /// be a reason.
    pub frequency: usize,
    /// weight x rarity(frequency), rounded to 4 decimal places.
    pub contribution: f64,
}

/// A scored affiliation between two carriers. Invariant: dot_a < dot_b,
/// always, everywhere, no exceptions. The unordered pair has exactly one
/// spelling in this codebase.
#[derive(Debug, Clone)]
pub struct CarrierLink {
    pub dot_a: i64,
    pub dot_b: i64,
    /// Sum of the unrounded reason contributions, rounded to 4dp.
    pub score: f64,
    /// Ordered by (-contribution, feature order, value).
    pub reasons: Vec<Reason>,
}

/// A connected component of carriers under links at or above the
/// clustering threshold. Size-1 clusters exist in memory (risk scoring
/// needs to answer "how big is your cluster" for everyone) but are never
/// persisted — a network of one is just a carrier.
#[derive(Debug, Clone)]
pub struct CarrierCluster {
    /// "C0001", "C0002", ... assigned after sorting by
    /// (-size, -max_link_score, members).
    pub cluster_id: String,
    pub size: usize,
    /// Number of intra-cluster pairs at or above the threshold.
    pub edge_count: usize,
    pub avg_link_score: f64,
    pub max_link_score: f64,
    /// Ascending DOT order. Strictly.
    pub members: Vec<i64>,
}

/// The final per-carrier verdict: how much does this carrier look like a
/// chameleon, how unsafe is it, and the weighted blend of the two.
/// These are ranked leads for humans, not legal conclusions — a composite
/// score cannot indict anyone.
#[derive(Debug, Clone, Serialize)]
pub struct CarrierRiskScore {
    pub dot: i64,
    /// 0-100. Identity-shifting signals only.
    pub chameleon_score: f64,
    /// 0-100. Crashes, fatalities, crash-per-truck ratio.
    pub safety_score: f64,
    /// round(0.7 * chameleon + 0.3 * safety, 2).
    pub composite_score: f64,
    /// Human-readable tokens explaining every point awarded.
    pub signals: Vec<String>,
    /// Size of the carrier's cluster, or 1 if it has no multi-member
    /// cluster to call home.
    pub cluster_size: usize,
}

/// Lifecycle status of one ingestion stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    Running,
    Done,
    Failed,
}

impl SyncStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            SyncStatus::Running => "running",
            SyncStatus::Done => "done",
            SyncStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_order_is_the_canonical_one() {
        let names: Vec<&str> = Feature::ALL.iter().map(|f| f.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "vin",
                "officer",
                "prior_revoke",
                "phone",
                "fax",
                "cell_phone",
                "address",
                "address_new_dot",
                "fleet_anomaly"
            ]
        );
        for (i, f) in Feature::ALL.iter().enumerate() {
            assert_eq!(f.index(), i);
        }
    }

    #[test]
    fn feature_weights_match_the_model() {
        assert_eq!(Feature::Vin.weight(), 60.0);
        assert_eq!(Feature::Officer.weight(), 55.0);
        assert_eq!(Feature::PriorRevoke.weight(), 50.0);
        assert_eq!(Feature::Phone.weight(), 40.0);
        assert_eq!(Feature::Fax.weight(), 35.0);
        assert_eq!(Feature::CellPhone.weight(), 35.0);
        assert_eq!(Feature::Address.weight(), 25.0);
        assert_eq!(Feature::AddressNewDot.weight(), 40.0);
        assert_eq!(Feature::FleetAnomaly.weight(), 30.0);
    }

    #[test]
    fn feature_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Feature::CellPhone).unwrap(),
            "\"cell_phone\""
        );
        assert_eq!(
            serde_json::to_string(&Feature::AddressNewDot).unwrap(),
            "\"address_new_dot\""
        );
    }

    #[test]
    fn prior_revoke_flag_from_census_codes() {
        assert_eq!(PriorRevokeFlag::from_code(Some("Y")), PriorRevokeFlag::Yes);
        assert_eq!(PriorRevokeFlag::from_code(Some("N")), PriorRevokeFlag::No);
        assert_eq!(PriorRevokeFlag::from_code(Some("")), PriorRevokeFlag::Unknown);
        assert_eq!(PriorRevokeFlag::from_code(None), PriorRevokeFlag::Unknown);
    }

    #[test]
    fn reasons_survive_the_json_round_trip() {
        // reasonsJson is stored as text; what comes back out must be what
        // went in, score contributions included.
        let reasons = vec![
            Reason {
                feature: Feature::Officer,
                value: "ACME HOLDINGS".to_string(),
                frequency: 2,
                contribution: 55.0,
            },
            Reason {
                feature: Feature::AddressNewDot,
                value: "Same address, 40d apart, one inactive".to_string(),
                frequency: 2,
                contribution: 40.0,
            },
        ];
        let json = serde_json::to_string(&reasons).unwrap();
        let back: Vec<Reason> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, reasons);
    }

    #[test]
    fn reason_json_shape_is_stable() {
        let r = Reason {
            feature: Feature::Phone,
            value: "5551000001".to_string(),
            frequency: 2,
            contribution: 40.0,
        };
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["feature"], "phone");
        assert_eq!(json["frequency"], 2);
        assert_eq!(json["contribution"], 40.0);
    }
}
