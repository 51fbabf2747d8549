// =============================================================================
// parse.rs — THE ROW COERCION CHAMBER
// =============================================================================
//
// Socrata returns everything as strings. Numbers are strings. Dates are
// strings. Booleans are strings, except when they're booleans, except
// when they're the string "1". This module turns that primordial soup
// into typed rows the store can upsert without flinching.
//
// The policy is tolerance, not correctness theater: a malformed numeric
// field becomes None, a malformed date becomes None, and a row with no
// usable DOT number is a Parse error the caller drops on the floor.
// Per-row hygiene is the upstream provider's job; our job is to not fall
// over when they skip a day.
// =============================================================================

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::error::EngineError;
use crate::models::{CrashRecord, InspectionRecord};

/// The raw string behind a JSON field, whatever shape it arrived in.
fn raw(row: &Value, key: &str) -> Option<String> {
    match row.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    }
}

/// A text field, truncated to the store's column width, with empty
/// strings collapsed to None.
pub fn text(row: &Value, key: &str, max_len: usize) -> Option<String> {
    let s = raw(row, key)?;
    if s.is_empty() {
        return None;
    }
    Some(s.chars().take(max_len).collect())
}

/// A numeric field, however Socrata chose to spell it today. Parses via
/// f64 so "123", "123.0", and 123 all land on 123; garbage lands on None.
pub fn safe_int(row: &Value, key: &str) -> Option<i64> {
    let s = raw(row, key)?;
    let n: f64 = s.trim().parse().ok()?;
    if n.is_finite() {
        Some(n as i64)
    } else {
        None
    }
}

/// A date field. Socrata emits ISO timestamps with or without fractional
/// seconds, and occasionally a bare date. Anything else is None.
pub fn safe_date(row: &Value, key: &str) -> Option<NaiveDate> {
    let s = raw(row, key)?;
    parse_date(s.trim())
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn require_dot(row: &Value) -> Result<i64, EngineError> {
    safe_int(row, "dot_number")
        .filter(|d| *d > 0)
        .ok_or_else(|| EngineError::Parse("row has no usable dot_number".to_string()))
}

/// One parsed census row, truncated to the store's column widths. This is
/// the upsert shape — the raw Y/N revoke flag and all — as opposed to the
/// typed CarrierRecord the detection engine loads back out.
#[derive(Debug, Clone)]
pub struct CensusRow {
    pub dot: i64,
    pub legal_name: String,
    pub dba_name: Option<String>,
    pub phy_street: Option<String>,
    pub phy_city: Option<String>,
    pub phy_state: Option<String>,
    pub phy_zip: Option<String>,
    pub phone: Option<String>,
    pub fax: Option<String>,
    pub cell_phone: Option<String>,
    pub officer1: Option<String>,
    pub officer2: Option<String>,
    pub status_code: Option<String>,
    pub prior_revoke_flag: Option<String>,
    pub prior_revoke_dot: Option<i64>,
    pub add_date: Option<NaiveDate>,
    pub power_units: Option<i64>,
    pub total_drivers: Option<i64>,
    pub fleet_size: Option<String>,
    pub docket_prefix: Option<String>,
    pub docket_number: Option<String>,
}

/// Parse a census row. A carrier we can't identify by a positive DOT
/// number is a carrier we can't store.
pub fn parse_census(row: &Value) -> Result<CensusRow, EngineError> {
    let dot = require_dot(row)?;
    Ok(CensusRow {
        dot,
        legal_name: text(row, "legal_name", 500).unwrap_or_default(),
        dba_name: text(row, "dba_name", 500),
        phy_street: text(row, "phy_street", 500),
        phy_city: text(row, "phy_city", 200),
        phy_state: text(row, "phy_state", 10),
        phy_zip: text(row, "phy_zip", 20),
        phone: text(row, "phone", 30),
        fax: text(row, "fax", 30),
        cell_phone: text(row, "cell_phone", 30),
        officer1: text(row, "company_officer_1", 300),
        officer2: text(row, "company_officer_2", 300),
        status_code: text(row, "status_code", 20),
        prior_revoke_flag: text(row, "prior_revoke_flag", 5),
        prior_revoke_dot: safe_int(row, "prior_revoke_dot_number"),
        add_date: safe_date(row, "add_date"),
        power_units: safe_int(row, "power_units"),
        total_drivers: safe_int(row, "total_drivers"),
        fleet_size: text(row, "fleetsize", 50),
        docket_prefix: text(row, "docket1prefix", 10),
        docket_number: text(row, "docket1", 20),
    })
}

/// Parse a crash row.
pub fn parse_crash(row: &Value) -> Result<CrashRecord, EngineError> {
    let dot = require_dot(row)?;
    let tow_away = raw(row, "tow_away")
        .map(|s| matches!(s.to_uppercase().as_str(), "Y" | "YES" | "TRUE" | "1"))
        .unwrap_or(false);
    Ok(CrashRecord {
        dot,
        report_date: safe_date(row, "report_date"),
        report_number: text(row, "report_number", 100),
        // The crash dataset can't decide what to call its state column.
        state: text(row, "report_state", 10).or_else(|| text(row, "state", 10)),
        fatalities: safe_int(row, "fatalities").unwrap_or(0),
        injuries: safe_int(row, "injuries").unwrap_or(0),
        tow_away,
    })
}

/// Parse an inspection row.
pub fn parse_inspection(row: &Value) -> Result<InspectionRecord, EngineError> {
    let dot = require_dot(row)?;
    Ok(InspectionRecord {
        dot,
        inspection_date: safe_date(row, "inspection_date")
            .or_else(|| safe_date(row, "insp_date")),
        vin: text(row, "vin", 30),
        state: text(row, "insp_state", 10).or_else(|| text(row, "state", 10)),
        vehicle_oos_total: safe_int(row, "vehicle_oos_total")
            .or_else(|| safe_int(row, "veh_oos_total"))
            .unwrap_or(0),
        driver_oos_total: safe_int(row, "driver_oos_total").unwrap_or(0),
    })
}
