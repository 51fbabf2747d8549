// =============================================================================
// ingest/mod.rs — THE FOUR-STAGE CENSUS VACUUM
// =============================================================================
//
// How do you find chameleons in a census of 3.8 million carriers without
// downloading all 3.8 million? You start where the bodies are buried:
//
//   Stage 1 — SEEDS. Every carrier FMCSA itself flagged with
//             prior_revoke_flag='Y', plus the revoked ancestors those
//             flags point at. The government hands us the suspects.
//   Stage 2 — ONE-HOP EXPANSION. Everyone who shares a phone, officer,
//             or address with a seed. Chameleons travel in packs.
//   Stage 3 — CRASHES for everyone now in scope.
//   Stage 4 — INSPECTIONS (and their VINs) for everyone now in scope.
//
// Each stage runs under its own SyncRun row, running -> done|failed.
// A stage that dies does NOT take the run down with it: whatever earlier
// stages landed in the store stays landed, later stages run on what
// exists, and the failure sits in the SyncRun table for the morning
// after. Store errors are the exception — if Postgres is gone, so are we.
// =============================================================================

pub mod parse;

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::Config;
use crate::dedup::UpsertDedup;
use crate::error::EngineError;
use crate::metrics::IngestMetrics;
use crate::models::{CrashRecord, InspectionRecord, SyncStatus};
use crate::soda::{
    escape_soql, SodaClient, SodaQuery, CENSUS_RESOURCE, CENSUS_SELECT, CRASH_RESOURCE,
    INSPECTION_RESOURCE,
};
use crate::store::{SeedContact, Store};
use parse::CensusRow;

/// Ancestor DOTs and safety records are fetched in IN(...) batches of
/// this many DOTs. Socrata URLs have feelings about length.
const DOT_BATCH: usize = 100;

/// Expansion harvesting caps: how many distinct seed identifiers we are
/// willing to chase per category.
const PHONE_CAP: usize = 200;
const OFFICER_CAP: usize = 100;
const ADDRESS_CAP: usize = 100;

/// OR-chain ceilings per query. Phone equality predicates are short;
/// officer and address predicates are not, so they get smaller chunks.
const PHONE_CHUNK: usize = 20;
const OFFICER_CHUNK: usize = 10;
const ADDRESS_CHUNK: usize = 10;

/// CLI-shaped knobs for one ingestion run.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Cap on seed carriers fetched in Stage 1 (0 = no cap).
    pub max_seeds: usize,
    /// 0 = seeds only, 1 = seeds plus one-hop expansion.
    pub expand_hops: u8,
    pub skip_crashes: bool,
    pub skip_inspections: bool,
}

/// One ingestion run's worth of machinery: the store, the SODA client,
/// the dedup filter, and the counters, all sharing a run id.
struct Ingestor {
    store: Store,
    soda: SodaClient,
    dedup: UpsertDedup,
    metrics: Arc<IngestMetrics>,
    run_id: String,
}

/// Run the four stages in order. Returns the number of stages that
/// failed (0 means a clean run); store-level errors abort outright.
pub async fn run_ingestion(
    store: &Store,
    config: &Config,
    run_id: &str,
    opts: &IngestOptions,
) -> Result<u64, EngineError> {
    let metrics = Arc::new(IngestMetrics::new());
    let soda = SodaClient::new(config, metrics.clone())
        .map_err(|e| EngineError::FetchFatal(e.to_string()))?;
    let dedup = UpsertDedup::new(
        config.dedup_expected_items,
        config.dedup_false_positive_rate,
        config.dedup_lru_size,
    );
    let ingestor = Ingestor {
        store: store.clone(),
        soda,
        dedup,
        metrics: metrics.clone(),
        run_id: run_id.to_string(),
    };

    info!(run_id, "starting ingestion run");

    // Stage 1: seeds. If this fails, there is nothing to expand, but we
    // still let the later stages look at whatever is already in scope.
    let seed_dots = match ingestor.stage_seeds(opts.max_seeds).await {
        Ok(dots) => dots,
        Err(e) => {
            survive_or_die("census_seeds", e)?;
            Vec::new()
        }
    };
    info!(seeds = seed_dots.len(), "seed DOT scope");

    // Stage 2: one hop outward.
    let mut scope = seed_dots.clone();
    if opts.expand_hops >= 1 && !seed_dots.is_empty() {
        match ingestor.stage_expand(&seed_dots).await {
            Ok(expanded) => scope = expanded,
            Err(e) => survive_or_die("census_expand", e)?,
        }
    }
    info!(carriers_in_scope = scope.len(), "active DOT scope");

    // Stages 3 and 4: safety records for the whole scope.
    if !opts.skip_crashes && !scope.is_empty() {
        if let Err(e) = ingestor.stage_crashes(&scope).await {
            survive_or_die("crashes", e)?;
        }
    }
    if !opts.skip_inspections && !scope.is_empty() {
        if let Err(e) = ingestor.stage_inspections(&scope).await {
            survive_or_die("inspections", e)?;
        }
    }

    metrics.log_summary();
    Ok(metrics.stage_failures())
}

/// Fetch failures are survivable (the stage is already marked failed in
/// its SyncRun row); a dead database is not.
fn survive_or_die(stage: &str, e: EngineError) -> Result<(), EngineError> {
    if matches!(e, EngineError::Store(_)) {
        return Err(e);
    }
    error!(stage, error = %e, "stage failed — continuing with prior data");
    Ok(())
}

impl Ingestor {
    // =========================================================================
    // Stage 1 — prior-revoke seeds, plus their revoked ancestors
    // =========================================================================

    async fn stage_seeds(&self, max_seeds: usize) -> Result<Vec<i64>, EngineError> {
        let sync_id = format!("{}_census_seeds", self.run_id);
        self.store.create_sync_run(&sync_id, "census_seeds").await?;
        info!("stage 1: fetching prior-revoke seeds from census");

        match self.fetch_seeds(max_seeds).await {
            Ok((dots, upserted)) => {
                self.store
                    .update_sync_run(&sync_id, SyncStatus::Done, upserted as i64, None)
                    .await?;
                Ok(dots)
            }
            Err(e) => {
                self.metrics.record_stage_failure();
                self.store
                    .update_sync_run(&sync_id, SyncStatus::Failed, 0, Some(&e.to_string()))
                    .await?;
                Err(e)
            }
        }
    }

    async fn fetch_seeds(&self, max_seeds: usize) -> Result<(Vec<i64>, u64), EngineError> {
        let rows = self
            .soda
            .fetch_all(&SodaQuery {
                resource: CENSUS_RESOURCE,
                where_clause: "prior_revoke_flag='Y'".to_string(),
                select: CENSUS_SELECT.to_string(),
                max_rows: max_seeds,
            })
            .await?;

        let parsed: Vec<CensusRow> = rows
            .iter()
            .filter_map(|v| parse::parse_census(v).ok())
            .collect();
        info!(seeds = parsed.len(), "retrieved seed carriers");
        let upserted = self.upsert_census_rows(&parsed).await?;

        // The scope is the seeds plus every revoked ancestor they point
        // at; the ancestors we didn't just fetch get their own lookup so
        // the prior-revoke linker has both ends of every edge.
        let fetched: BTreeSet<i64> = parsed.iter().map(|r| r.dot).collect();
        let mut seed_dots = fetched.clone();
        for row in &parsed {
            if let Some(prior) = row.prior_revoke_dot {
                if prior > 0 {
                    seed_dots.insert(prior);
                }
            }
        }

        let ancestors: Vec<i64> = seed_dots.difference(&fetched).copied().collect();
        if !ancestors.is_empty() {
            info!(
                ancestors = ancestors.len(),
                "fetching prior-revoke ancestor carriers"
            );
            for chunk in ancestors.chunks(DOT_BATCH) {
                let rows = self
                    .soda
                    .fetch_all(&SodaQuery {
                        resource: CENSUS_RESOURCE,
                        where_clause: dot_in_predicate(chunk),
                        select: CENSUS_SELECT.to_string(),
                        max_rows: 0,
                    })
                    .await?;
                let parsed: Vec<CensusRow> = rows
                    .iter()
                    .filter_map(|v| parse::parse_census(v).ok())
                    .collect();
                self.upsert_census_rows(&parsed).await?;
            }
        }

        Ok((seed_dots.into_iter().collect(), upserted))
    }

    // =========================================================================
    // Stage 2 — one-hop expansion over shared identifiers
    // =========================================================================

    async fn stage_expand(&self, seed_dots: &[i64]) -> Result<Vec<i64>, EngineError> {
        let sync_id = format!("{}_census_expand", self.run_id);
        self.store
            .create_sync_run(&sync_id, "census_expand")
            .await?;
        info!("stage 2: expanding one-hop neighbors");

        match self.fetch_expansion(seed_dots).await {
            Ok((discovered, upserted)) => {
                self.store
                    .update_sync_run(&sync_id, SyncStatus::Done, upserted as i64, None)
                    .await?;
                let scope: BTreeSet<i64> = discovered
                    .into_iter()
                    .chain(seed_dots.iter().copied())
                    .collect();
                Ok(scope.into_iter().collect())
            }
            Err(e) => {
                self.metrics.record_stage_failure();
                self.store
                    .update_sync_run(&sync_id, SyncStatus::Failed, 0, Some(&e.to_string()))
                    .await?;
                Err(e)
            }
        }
    }

    async fn fetch_expansion(
        &self,
        seed_dots: &[i64],
    ) -> Result<(BTreeSet<i64>, u64), EngineError> {
        let contacts = self.store.seed_contacts(seed_dots).await?;
        let (phones, officers, addresses) = harvest_identifiers(&contacts);
        info!(
            phones = phones.len(),
            officers = officers.len(),
            addresses = addresses.len(),
            "expansion identifiers harvested"
        );

        let mut discovered: BTreeSet<i64> = BTreeSet::new();
        let mut upserted = 0u64;

        for chunk in phones.chunks(PHONE_CHUNK) {
            upserted += self
                .expand_query(phone_predicate(chunk), &mut discovered)
                .await?;
        }
        for chunk in officers.chunks(OFFICER_CHUNK) {
            upserted += self
                .expand_query(officer_predicate(chunk), &mut discovered)
                .await?;
        }
        for chunk in addresses.chunks(ADDRESS_CHUNK) {
            upserted += self
                .expand_query(address_predicate(chunk), &mut discovered)
                .await?;
        }

        info!(
            related = discovered.len(),
            upserted, "expansion complete"
        );
        Ok((discovered, upserted))
    }

    /// Run one expansion query, recording every DOT it surfaces into the
    /// scope and upserting whatever the dedup filter hasn't seen.
    async fn expand_query(
        &self,
        where_clause: String,
        discovered: &mut BTreeSet<i64>,
    ) -> Result<u64, EngineError> {
        let rows = self
            .soda
            .fetch_all(&SodaQuery {
                resource: CENSUS_RESOURCE,
                where_clause,
                select: CENSUS_SELECT.to_string(),
                max_rows: 0,
            })
            .await?;
        let parsed: Vec<CensusRow> = rows
            .iter()
            .filter_map(|v| parse::parse_census(v).ok())
            .collect();
        for row in &parsed {
            discovered.insert(row.dot);
        }
        self.upsert_census_rows(&parsed).await
    }

    // =========================================================================
    // Stages 3 & 4 — safety records for the active scope
    // =========================================================================

    async fn stage_crashes(&self, dots: &[i64]) -> Result<u64, EngineError> {
        let sync_id = format!("{}_crashes", self.run_id);
        self.store.create_sync_run(&sync_id, "crashes").await?;
        info!(carriers = dots.len(), "stage 3: fetching crash records");

        match self.fetch_crashes(dots).await {
            Ok(total) => {
                self.store
                    .update_sync_run(&sync_id, SyncStatus::Done, total as i64, None)
                    .await?;
                Ok(total)
            }
            Err(e) => {
                self.metrics.record_stage_failure();
                self.store
                    .update_sync_run(&sync_id, SyncStatus::Failed, 0, Some(&e.to_string()))
                    .await?;
                Err(e)
            }
        }
    }

    async fn fetch_crashes(&self, dots: &[i64]) -> Result<u64, EngineError> {
        let mut total = 0u64;
        for chunk in dots.chunks(DOT_BATCH) {
            let rows = self
                .soda
                .fetch_all(&SodaQuery {
                    resource: CRASH_RESOURCE,
                    where_clause: dot_in_predicate(chunk),
                    select: String::new(),
                    max_rows: 0,
                })
                .await?;
            let parsed: Vec<CrashRecord> = rows
                .iter()
                .filter_map(|v| parse::parse_crash(v).ok())
                .collect();
            let n = self.store.upsert_crashes(&parsed).await?;
            self.metrics.record_crashes_upserted(n);
            total += n;
        }
        info!(crashes = total, "crash records upserted");
        Ok(total)
    }

    async fn stage_inspections(&self, dots: &[i64]) -> Result<u64, EngineError> {
        let sync_id = format!("{}_inspections", self.run_id);
        self.store.create_sync_run(&sync_id, "inspections").await?;
        info!(carriers = dots.len(), "stage 4: fetching inspection records");

        match self.fetch_inspections(dots).await {
            Ok(total) => {
                self.store
                    .update_sync_run(&sync_id, SyncStatus::Done, total as i64, None)
                    .await?;
                Ok(total)
            }
            Err(e) => {
                self.metrics.record_stage_failure();
                self.store
                    .update_sync_run(&sync_id, SyncStatus::Failed, 0, Some(&e.to_string()))
                    .await?;
                Err(e)
            }
        }
    }

    async fn fetch_inspections(&self, dots: &[i64]) -> Result<u64, EngineError> {
        let mut total = 0u64;
        for chunk in dots.chunks(DOT_BATCH) {
            let rows = self
                .soda
                .fetch_all(&SodaQuery {
                    resource: INSPECTION_RESOURCE,
                    where_clause: dot_in_predicate(chunk),
                    select: String::new(),
                    max_rows: 0,
                })
                .await?;
            let parsed: Vec<InspectionRecord> = rows
                .iter()
                .filter_map(|v| parse::parse_inspection(v).ok())
                .collect();
            let n = self.store.upsert_inspections(&parsed).await?;
            self.metrics.record_inspections_upserted(n);
            total += n;
        }
        info!(inspections = total, "inspection records upserted");
        Ok(total)
    }

    // =========================================================================
    // Shared plumbing
    // =========================================================================

    /// Upsert census rows that the dedup filter hasn't already seen this
    /// run. Expansion queries overlap heavily; re-writing an identical
    /// row would be correct but pointless.
    async fn upsert_census_rows(&self, rows: &[CensusRow]) -> Result<u64, EngineError> {
        let fresh: Vec<CensusRow> = rows
            .iter()
            .filter(|r| self.dedup.check_and_insert(r.dot))
            .cloned()
            .collect();
        let skipped = rows.len() - fresh.len();
        if skipped > 0 {
            self.metrics.record_duplicates_skipped(skipped as u64);
            warn!(skipped, "skipped already-upserted carriers");
        }
        let n = self.store.upsert_carriers(&fresh).await?;
        self.metrics.record_carriers_upserted(n);
        Ok(n)
    }
}

// =============================================================================
// Predicate builders — pure, and tested like it
// =============================================================================

fn dot_in_predicate(dots: &[i64]) -> String {
    let list: Vec<String> = dots.iter().map(|d| d.to_string()).collect();
    format!("dot_number in({})", list.join(","))
}

fn phone_predicate(phones: &[String]) -> String {
    let conditions: Vec<String> = phones
        .iter()
        .map(|p| format!("phone='{}'", escape_soql(p)))
        .collect();
    format!("({})", conditions.join(" OR "))
}

fn officer_predicate(officers: &[String]) -> String {
    let conditions: Vec<String> = officers
        .iter()
        .map(|o| {
            let o = escape_soql(o);
            format!("upper(company_officer_1)='{o}' OR upper(company_officer_2)='{o}'")
        })
        .collect();
    format!("({})", conditions.join(" OR "))
}

fn address_predicate(addresses: &[(String, String, String)]) -> String {
    let conditions: Vec<String> = addresses
        .iter()
        .map(|(street, city, state)| {
            format!(
                "(upper(phy_street)='{}' AND upper(phy_city)='{}' AND upper(phy_state)='{}')",
                escape_soql(street),
                escape_soql(city),
                escape_soql(state)
            )
        })
        .collect();
    format!("({})", conditions.join(" OR "))
}

/// Harvest the expansion identifiers from seed contact rows: phones with
/// at least 7 characters, officer names longer than 3, and complete
/// street/city/state triples — uppercased, deduplicated, sorted, capped.
fn harvest_identifiers(
    contacts: &[SeedContact],
) -> (Vec<String>, Vec<String>, Vec<(String, String, String)>) {
    let mut phones: BTreeSet<String> = BTreeSet::new();
    let mut officers: BTreeSet<String> = BTreeSet::new();
    let mut addresses: BTreeSet<(String, String, String)> = BTreeSet::new();

    for contact in contacts {
        if let Some(phone) = &contact.phone {
            let phone = phone.trim();
            if phone.len() >= 7 {
                phones.insert(phone.to_string());
            }
        }
        if let (Some(street), Some(city), Some(state)) = (
            &contact.phy_street,
            &contact.phy_city,
            &contact.phy_state,
        ) {
            let (street, city, state) = (street.trim(), city.trim(), state.trim());
            if !street.is_empty() && !city.is_empty() && !state.is_empty() {
                addresses.insert((
                    street.to_uppercase(),
                    city.to_uppercase(),
                    state.to_uppercase(),
                ));
            }
        }
        for officer in [&contact.officer1, &contact.officer2] {
            if let Some(name) = officer {
                let name = name.trim();
                if name.len() > 3 {
                    officers.insert(name.to_uppercase());
                }
            }
        }
    }

    (
        phones.into_iter().take(PHONE_CAP).collect(),
        officers.into_iter().take(OFFICER_CAP).collect(),
        addresses.into_iter().take(ADDRESS_CAP).collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(
        dot: i64,
        phone: Option<&str>,
        street: Option<&str>,
        officer1: Option<&str>,
    ) -> SeedContact {
        SeedContact {
            dot,
            phone: phone.map(String::from),
            phy_street: street.map(String::from),
            phy_city: street.map(|_| "Austin".to_string()),
            phy_state: street.map(|_| "TX".to_string()),
            officer1: officer1.map(String::from),
            officer2: None,
        }
    }

    #[test]
    fn dot_in_predicate_is_comma_joined() {
        assert_eq!(dot_in_predicate(&[1, 2, 3]), "dot_number in(1,2,3)");
    }

    #[test]
    fn phone_predicate_escapes_and_ors() {
        let p = phone_predicate(&["5551000001".to_string(), "555'9".to_string()]);
        assert_eq!(p, "(phone='5551000001' OR phone='555''9')");
    }

    #[test]
    fn officer_predicate_checks_both_columns() {
        let p = officer_predicate(&["O'BRIEN".to_string()]);
        assert_eq!(
            p,
            "(upper(company_officer_1)='O''BRIEN' OR upper(company_officer_2)='O''BRIEN')"
        );
    }

    #[test]
    fn address_predicate_requires_the_full_triple() {
        let p = address_predicate(&[(
            "10 FIRST ST".to_string(),
            "AUSTIN".to_string(),
            "TX".to_string(),
        )]);
        assert_eq!(
            p,
            "((upper(phy_street)='10 FIRST ST' AND upper(phy_city)='AUSTIN' AND upper(phy_state)='TX'))"
        );
    }

    #[test]
    fn harvest_filters_short_identifiers() {
        let contacts = vec![
            contact(1, Some("555-1000"), Some("10 First St"), Some("Acme Holdings")),
            contact(2, Some("123"), None, Some("Bo")), // both too short
            contact(3, Some("  555-1000  "), None, None), // dup after trim
        ];
        let (phones, officers, addresses) = harvest_identifiers(&contacts);
        assert_eq!(phones, vec!["555-1000".to_string()]);
        assert_eq!(officers, vec!["ACME HOLDINGS".to_string()]);
        assert_eq!(
            addresses,
            vec![(
                "10 FIRST ST".to_string(),
                "AUSTIN".to_string(),
                "TX".to_string()
            )]
        );
    }

    #[test]
    fn harvest_caps_each_category() {
        let contacts: Vec<SeedContact> = (0..300)
            .map(|i| SeedContact {
                dot: i,
                phone: Some(format!("555000{i:04}")),
                phy_street: None,
                phy_city: None,
                phy_state: None,
                officer1: None,
                officer2: None,
            })
            .collect();
        let (phones, _, _) = harvest_identifiers(&contacts);
        assert_eq!(phones.len(), PHONE_CAP);
    }
}
