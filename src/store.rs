// =============================================================================
// store.rs — THE POSTGRES GATEWAY
// =============================================================================
//
// Every byte of evidence lives in Postgres: the carrier census, the crash
// register, the inspections, and the three derived tables the detection
// engine rewrites on every run. This module is the only place in the
// codebase that speaks SQL, which means it is the only place that can
// violate the invariants — so it doesn't.
//
// The write-back discipline, carved in stone:
//   - ingestion upserts are idempotent (ON CONFLICT, always)
//   - detection write-back is ONE transaction: delete the run's links,
//     delete the run's clusters and their members, insert the new set,
//     replace every risk score, commit. A reader concurrent with
//     write-back sees the old world or the new world, never a chimera.
//   - inserts go out in batches of 500 rows because one-row-at-a-time
//     is for people with infinite evenings.
//
// Column names are quoted camelCase because the schema is shared with a
// Prisma-managed web application that we otherwise refuse to acknowledge.
// =============================================================================

use std::collections::BTreeMap;

use chrono::Utc;
use sqlx::postgres::{PgPool, PgPoolOptions, Postgres};
use sqlx::{QueryBuilder, Row};
use tracing::{debug, info};
use uuid::Uuid;

use crate::detect::normalize::normalize_vin;
use crate::detect::DetectionOutput;
use crate::error::EngineError;
use crate::ingest::parse::CensusRow;
use crate::models::{CarrierRecord, CrashRecord, InspectionRecord, PriorRevokeFlag, SyncStatus};

/// Rows per multi-row INSERT. 500 rows x ~24 binds sits comfortably
/// under Postgres's 65,535-parameter ceiling.
const INSERT_BATCH: usize = 500;

/// The contact fields the one-hop expansion harvests from seed carriers.
#[derive(Debug, Clone)]
pub struct SeedContact {
    pub dot: i64,
    pub phone: Option<String>,
    pub phy_street: Option<String>,
    pub phy_city: Option<String>,
    pub phy_state: Option<String>,
    pub officer1: Option<String>,
    pub officer2: Option<String>,
}

/// An abstraction over all database operations. Cheap to clone; the pool
/// does the sharing.
#[derive(Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    pub async fn connect(database_url: &str) -> Result<Self, EngineError> {
        info!("connecting to store");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Create every table the engine needs, idempotently. The schema is
    /// nominally owned by the web application's migration tool; this
    /// exists so a bare `ingest` against a fresh database Just Works.
    pub async fn ensure_schema(&self) -> Result<(), EngineError> {
        const DDL: &[&str] = &[
            r#"CREATE TABLE IF NOT EXISTS "FmcsaCarrier" (
                "id" TEXT NOT NULL,
                "dotNumber" BIGINT PRIMARY KEY,
                "legalName" TEXT NOT NULL,
                "dbaName" TEXT,
                "phyStreet" TEXT,
                "phyCity" TEXT,
                "phyState" TEXT,
                "phyZip" TEXT,
                "phone" TEXT,
                "fax" TEXT,
                "cellPhone" TEXT,
                "companyOfficer1" TEXT,
                "companyOfficer2" TEXT,
                "statusCode" TEXT,
                "priorRevokeFlag" TEXT,
                "priorRevokeDot" BIGINT,
                "addDate" DATE,
                "powerUnits" BIGINT,
                "totalDrivers" BIGINT,
                "fleetSize" TEXT,
                "docketPrefix" TEXT,
                "docketNumber" TEXT,
                "createdAt" TIMESTAMPTZ NOT NULL,
                "updatedAt" TIMESTAMPTZ NOT NULL
            )"#,
            r#"CREATE TABLE IF NOT EXISTS "FmcsaCrash" (
                "id" TEXT NOT NULL,
                "dotNumber" BIGINT NOT NULL,
                "reportDate" DATE,
                "reportNumber" TEXT,
                "state" TEXT,
                "fatalities" BIGINT NOT NULL DEFAULT 0,
                "injuries" BIGINT NOT NULL DEFAULT 0,
                "towAway" BOOLEAN NOT NULL DEFAULT FALSE,
                "createdAt" TIMESTAMPTZ NOT NULL,
                UNIQUE ("dotNumber", "reportDate", "reportNumber")
            )"#,
            r#"CREATE INDEX IF NOT EXISTS "FmcsaCrash_dotNumber_idx"
                ON "FmcsaCrash" ("dotNumber")"#,
            r#"CREATE TABLE IF NOT EXISTS "FmcsaInspection" (
                "id" TEXT NOT NULL,
                "dotNumber" BIGINT NOT NULL,
                "inspectionDate" DATE,
                "vin" TEXT,
                "state" TEXT,
                "vehicleOosTotal" BIGINT NOT NULL DEFAULT 0,
                "driverOosTotal" BIGINT NOT NULL DEFAULT 0,
                "createdAt" TIMESTAMPTZ NOT NULL,
                UNIQUE ("dotNumber", "inspectionDate", "vin", "state")
            )"#,
            r#"CREATE INDEX IF NOT EXISTS "FmcsaInspection_dotNumber_idx"
                ON "FmcsaInspection" ("dotNumber")"#,
            r#"CREATE TABLE IF NOT EXISTS "CarrierLink" (
                "id" TEXT NOT NULL,
                "dotNumberA" BIGINT NOT NULL,
                "dotNumberB" BIGINT NOT NULL,
                "score" DOUBLE PRECISION NOT NULL,
                "reasonsJson" TEXT NOT NULL,
                "runId" TEXT NOT NULL,
                UNIQUE ("dotNumberA", "dotNumberB", "runId")
            )"#,
            r#"CREATE INDEX IF NOT EXISTS "CarrierLink_runId_idx"
                ON "CarrierLink" ("runId")"#,
            r#"CREATE TABLE IF NOT EXISTS "CarrierCluster" (
                "id" TEXT PRIMARY KEY,
                "clusterId" TEXT NOT NULL,
                "size" BIGINT NOT NULL,
                "edgeCount" BIGINT NOT NULL,
                "avgLinkScore" DOUBLE PRECISION NOT NULL,
                "maxLinkScore" DOUBLE PRECISION NOT NULL,
                "runId" TEXT NOT NULL
            )"#,
            r#"CREATE TABLE IF NOT EXISTS "ClusterMember" (
                "id" TEXT NOT NULL,
                "clusterId" TEXT NOT NULL,
                "dotNumber" BIGINT NOT NULL,
                UNIQUE ("clusterId", "dotNumber")
            )"#,
            r#"CREATE TABLE IF NOT EXISTS "CarrierRiskScore" (
                "id" TEXT NOT NULL,
                "dotNumber" BIGINT PRIMARY KEY,
                "chameleonScore" DOUBLE PRECISION NOT NULL,
                "safetyScore" DOUBLE PRECISION NOT NULL,
                "compositeScore" DOUBLE PRECISION NOT NULL,
                "signalsJson" TEXT NOT NULL,
                "clusterSize" BIGINT NOT NULL,
                "updatedAt" TIMESTAMPTZ NOT NULL
            )"#,
            r#"CREATE TABLE IF NOT EXISTS "SyncRun" (
                "id" TEXT NOT NULL,
                "runId" TEXT PRIMARY KEY,
                "dataset" TEXT NOT NULL,
                "status" TEXT NOT NULL,
                "rowsProcessed" BIGINT NOT NULL DEFAULT 0,
                "errorMessage" TEXT,
                "createdAt" TIMESTAMPTZ NOT NULL,
                "updatedAt" TIMESTAMPTZ NOT NULL
            )"#,
        ];

        for statement in DDL {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        debug!("schema ensured");
        Ok(())
    }

    // =========================================================================
    // READ SIDE — loading the carrier universe for detection
    // =========================================================================

    /// Bulk-load every carrier, then join inspection VINs and crash
    /// aggregates in memory. Three queries total, regardless of universe
    /// size — the detection engine does not do N+1.
    pub async fn load_carriers(&self) -> Result<BTreeMap<i64, CarrierRecord>, EngineError> {
        let mut carriers: BTreeMap<i64, CarrierRecord> = BTreeMap::new();

        let rows = sqlx::query(
            r#"SELECT "dotNumber", "legalName", "dbaName",
                      "phyStreet", "phyCity", "phyState", "phyZip",
                      "phone", "fax", "cellPhone",
                      "companyOfficer1", "companyOfficer2",
                      "statusCode", "priorRevokeFlag", "priorRevokeDot",
                      "addDate", "powerUnits", "totalDrivers"
               FROM "FmcsaCarrier""#,
        )
        .fetch_all(&self.pool)
        .await?;

        for row in rows {
            let dot: i64 = row.try_get("dotNumber")?;
            let flag: Option<String> = row.try_get("priorRevokeFlag")?;
            carriers.insert(
                dot,
                CarrierRecord {
                    dot,
                    legal_name: row.try_get("legalName")?,
                    dba_name: row.try_get("dbaName")?,
                    phy_street: row.try_get("phyStreet")?,
                    phy_city: row.try_get("phyCity")?,
                    phy_state: row.try_get("phyState")?,
                    phy_zip: row.try_get("phyZip")?,
                    phone: row.try_get("phone")?,
                    fax: row.try_get("fax")?,
                    cell_phone: row.try_get("cellPhone")?,
                    officer1: row.try_get("companyOfficer1")?,
                    officer2: row.try_get("companyOfficer2")?,
                    status_code: row.try_get("statusCode")?,
                    prior_revoke_flag: PriorRevokeFlag::from_code(flag.as_deref()),
                    prior_revoke_dot: row.try_get("priorRevokeDot")?,
                    add_date: row.try_get("addDate")?,
                    power_units: row.try_get("powerUnits")?,
                    total_drivers: row.try_get("totalDrivers")?,
                    fleet_size: None,
                    docket_prefix: None,
                    docket_number: None,
                    ..CarrierRecord::default()
                },
            );
        }

        // VINs from inspections, joined in memory.
        let vin_rows = sqlx::query(
            r#"SELECT "dotNumber", "vin"
               FROM "FmcsaInspection"
               WHERE "vin" IS NOT NULL AND "vin" <> ''"#,
        )
        .fetch_all(&self.pool)
        .await?;
        for row in vin_rows {
            let dot: i64 = row.try_get("dotNumber")?;
            let vin: String = row.try_get("vin")?;
            if let Some(carrier) = carriers.get_mut(&dot) {
                carrier.vins.insert(normalize_vin(&vin));
            }
        }

        // Crash aggregates: one group-by, cast so SUM comes back BIGINT
        // instead of NUMERIC.
        let crash_rows = sqlx::query(
            r#"SELECT "dotNumber",
                      COUNT(*) AS "crashCount",
                      COALESCE(SUM("fatalities"), 0)::BIGINT AS "fatalities"
               FROM "FmcsaCrash"
               GROUP BY "dotNumber""#,
        )
        .fetch_all(&self.pool)
        .await?;
        for row in crash_rows {
            let dot: i64 = row.try_get("dotNumber")?;
            if let Some(carrier) = carriers.get_mut(&dot) {
                carrier.crash_count = row.try_get("crashCount")?;
                carrier.fatalities = row.try_get("fatalities")?;
            }
        }

        info!(carriers = carriers.len(), "loaded carriers from store");
        Ok(carriers)
    }

    /// The contact fields of the given carriers, for expansion harvesting.
    pub async fn seed_contacts(&self, dots: &[i64]) -> Result<Vec<SeedContact>, EngineError> {
        if dots.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query(
            r#"SELECT "dotNumber", "phone", "phyStreet", "phyCity", "phyState",
                      "companyOfficer1", "companyOfficer2"
               FROM "FmcsaCarrier"
               WHERE "dotNumber" = ANY($1)"#,
        )
        .bind(dots)
        .fetch_all(&self.pool)
        .await?;

        let mut contacts = Vec::with_capacity(rows.len());
        for row in rows {
            contacts.push(SeedContact {
                dot: row.try_get("dotNumber")?,
                phone: row.try_get("phone")?,
                phy_street: row.try_get("phyStreet")?,
                phy_city: row.try_get("phyCity")?,
                phy_state: row.try_get("phyState")?,
                officer1: row.try_get("companyOfficer1")?,
                officer2: row.try_get("companyOfficer2")?,
            });
        }
        Ok(contacts)
    }

    // =========================================================================
    // WRITE SIDE — ingestion upserts
    // =========================================================================

    pub async fn upsert_carriers(&self, rows: &[CensusRow]) -> Result<u64, EngineError> {
        if rows.is_empty() {
            return Ok(0);
        }
        let now = Utc::now();
        for chunk in rows.chunks(INSERT_BATCH) {
            let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
                r#"INSERT INTO "FmcsaCarrier" (
                    "id", "dotNumber", "legalName", "dbaName",
                    "phyStreet", "phyCity", "phyState", "phyZip",
                    "phone", "fax", "cellPhone",
                    "companyOfficer1", "companyOfficer2",
                    "statusCode", "priorRevokeFlag", "priorRevokeDot",
                    "addDate", "powerUnits", "totalDrivers",
                    "fleetSize", "docketPrefix", "docketNumber",
                    "createdAt", "updatedAt"
                ) "#,
            );
            qb.push_values(chunk, |mut b, r| {
                b.push_bind(Uuid::new_v4().to_string())
                    .push_bind(r.dot)
                    .push_bind(&r.legal_name)
                    .push_bind(&r.dba_name)
                    .push_bind(&r.phy_street)
                    .push_bind(&r.phy_city)
                    .push_bind(&r.phy_state)
                    .push_bind(&r.phy_zip)
                    .push_bind(&r.phone)
                    .push_bind(&r.fax)
                    .push_bind(&r.cell_phone)
                    .push_bind(&r.officer1)
                    .push_bind(&r.officer2)
                    .push_bind(&r.status_code)
                    .push_bind(&r.prior_revoke_flag)
                    .push_bind(r.prior_revoke_dot)
                    .push_bind(r.add_date)
                    .push_bind(r.power_units)
                    .push_bind(r.total_drivers)
                    .push_bind(&r.fleet_size)
                    .push_bind(&r.docket_prefix)
                    .push_bind(&r.docket_number)
                    .push_bind(now)
                    .push_bind(now);
            });
            qb.push(
                r#" ON CONFLICT ("dotNumber") DO UPDATE SET
                    "legalName" = EXCLUDED."legalName",
                    "dbaName" = EXCLUDED."dbaName",
                    "phyStreet" = EXCLUDED."phyStreet",
                    "phyCity" = EXCLUDED."phyCity",
                    "phyState" = EXCLUDED."phyState",
                    "phyZip" = EXCLUDED."phyZip",
                    "phone" = EXCLUDED."phone",
                    "fax" = EXCLUDED."fax",
                    "cellPhone" = EXCLUDED."cellPhone",
                    "companyOfficer1" = EXCLUDED."companyOfficer1",
                    "companyOfficer2" = EXCLUDED."companyOfficer2",
                    "statusCode" = EXCLUDED."statusCode",
                    "priorRevokeFlag" = EXCLUDED."priorRevokeFlag",
                    "priorRevokeDot" = EXCLUDED."priorRevokeDot",
                    "addDate" = EXCLUDED."addDate",
                    "powerUnits" = EXCLUDED."powerUnits",
                    "totalDrivers" = EXCLUDED."totalDrivers",
                    "fleetSize" = EXCLUDED."fleetSize",
                    "docketPrefix" = EXCLUDED."docketPrefix",
                    "docketNumber" = EXCLUDED."docketNumber",
                    "updatedAt" = NOW()"#,
            );
            qb.build().execute(&self.pool).await?;
        }
        Ok(rows.len() as u64)
    }

    pub async fn upsert_crashes(&self, rows: &[CrashRecord]) -> Result<u64, EngineError> {
        if rows.is_empty() {
            return Ok(0);
        }
        let now = Utc::now();
        for chunk in rows.chunks(INSERT_BATCH) {
            let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
                r#"INSERT INTO "FmcsaCrash" (
                    "id", "dotNumber", "reportDate", "reportNumber", "state",
                    "fatalities", "injuries", "towAway", "createdAt"
                ) "#,
            );
            qb.push_values(chunk, |mut b, r| {
                b.push_bind(Uuid::new_v4().to_string())
                    .push_bind(r.dot)
                    .push_bind(r.report_date)
                    .push_bind(&r.report_number)
                    .push_bind(&r.state)
                    .push_bind(r.fatalities)
                    .push_bind(r.injuries)
                    .push_bind(r.tow_away)
                    .push_bind(now);
            });
            // Natural dedup on (dot, reportDate, reportNumber) via the
            // table's unique constraint.
            qb.push(" ON CONFLICT DO NOTHING");
            qb.build().execute(&self.pool).await?;
        }
        Ok(rows.len() as u64)
    }

    pub async fn upsert_inspections(
        &self,
        rows: &[InspectionRecord],
    ) -> Result<u64, EngineError> {
        if rows.is_empty() {
            return Ok(0);
        }
        let now = Utc::now();
        for chunk in rows.chunks(INSERT_BATCH) {
            let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
                r#"INSERT INTO "FmcsaInspection" (
                    "id", "dotNumber", "inspectionDate", "vin", "state",
                    "vehicleOosTotal", "driverOosTotal", "createdAt"
                ) "#,
            );
            qb.push_values(chunk, |mut b, r| {
                b.push_bind(Uuid::new_v4().to_string())
                    .push_bind(r.dot)
                    .push_bind(r.inspection_date)
                    .push_bind(&r.vin)
                    .push_bind(&r.state)
                    .push_bind(r.vehicle_oos_total)
                    .push_bind(r.driver_oos_total)
                    .push_bind(now);
            });
            qb.push(" ON CONFLICT DO NOTHING");
            qb.build().execute(&self.pool).await?;
        }
        Ok(rows.len() as u64)
    }

    // =========================================================================
    // SYNC RUN BOOKKEEPING
    // =========================================================================

    pub async fn create_sync_run(&self, run_id: &str, dataset: &str) -> Result<(), EngineError> {
        let now = Utc::now();
        sqlx::query(
            r#"INSERT INTO "SyncRun"
                   ("id", "runId", "dataset", "status", "rowsProcessed", "createdAt", "updatedAt")
               VALUES ($1, $2, $3, 'running', 0, $4, $4)
               ON CONFLICT ("runId") DO UPDATE SET "status" = 'running', "updatedAt" = NOW()"#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(run_id)
        .bind(dataset)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn update_sync_run(
        &self,
        run_id: &str,
        status: SyncStatus,
        rows_processed: i64,
        error: Option<&str>,
    ) -> Result<(), EngineError> {
        sqlx::query(
            r#"UPDATE "SyncRun"
               SET "status" = $1, "rowsProcessed" = $2, "errorMessage" = $3, "updatedAt" = NOW()
               WHERE "runId" = $4"#,
        )
        .bind(status.as_str())
        .bind(rows_processed)
        .bind(error)
        .bind(run_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // =========================================================================
    // WRITE SIDE — detection write-back, one transaction, no survivors
    // =========================================================================

    /// Replace this run's links and clusters and every risk score, all or
    /// nothing. Returns (links, clusters, risk scores) written.
    pub async fn persist_detection(
        &self,
        run_id: &str,
        output: &DetectionOutput,
    ) -> Result<(u64, u64, u64), EngineError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // Out with this run's previous derived rows.
        sqlx::query(r#"DELETE FROM "CarrierLink" WHERE "runId" = $1"#)
            .bind(run_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            r#"DELETE FROM "ClusterMember" WHERE "clusterId" IN (
                   SELECT "id" FROM "CarrierCluster" WHERE "runId" = $1
               )"#,
        )
        .bind(run_id)
        .execute(&mut *tx)
        .await?;
        sqlx::query(r#"DELETE FROM "CarrierCluster" WHERE "runId" = $1"#)
            .bind(run_id)
            .execute(&mut *tx)
            .await?;

        // Links: only the meaningful ones earn a row.
        let links: Vec<_> = output.meaningful_links().collect();
        for chunk in links.chunks(INSERT_BATCH) {
            let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
                r#"INSERT INTO "CarrierLink"
                   ("id", "dotNumberA", "dotNumberB", "score", "reasonsJson", "runId") "#,
            );
            qb.push_values(chunk, |mut b, link| {
                let reasons_json =
                    serde_json::to_string(&link.reasons).unwrap_or_else(|_| "[]".to_string());
                b.push_bind(Uuid::new_v4().to_string())
                    .push_bind(link.dot_a)
                    .push_bind(link.dot_b)
                    .push_bind(link.score)
                    .push_bind(reasons_json)
                    .push_bind(run_id);
            });
            qb.push(
                r#" ON CONFLICT ("dotNumberA", "dotNumberB", "runId") DO UPDATE SET
                    "score" = EXCLUDED."score",
                    "reasonsJson" = EXCLUDED."reasonsJson""#,
            );
            qb.build().execute(&mut *tx).await?;
        }

        // Clusters: one parent row each, then members in batches.
        let mut clusters_written = 0u64;
        for cluster in output.multi_member_clusters() {
            let cluster_db_id = Uuid::new_v4().to_string();
            sqlx::query(
                r#"INSERT INTO "CarrierCluster"
                       ("id", "clusterId", "size", "edgeCount",
                        "avgLinkScore", "maxLinkScore", "runId")
                   VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
            )
            .bind(&cluster_db_id)
            .bind(&cluster.cluster_id)
            .bind(cluster.size as i64)
            .bind(cluster.edge_count as i64)
            .bind(cluster.avg_link_score)
            .bind(cluster.max_link_score)
            .bind(run_id)
            .execute(&mut *tx)
            .await?;

            for chunk in cluster.members.chunks(INSERT_BATCH) {
                let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
                    r#"INSERT INTO "ClusterMember" ("id", "clusterId", "dotNumber") "#,
                );
                qb.push_values(chunk, |mut b, dot| {
                    b.push_bind(Uuid::new_v4().to_string())
                        .push_bind(&cluster_db_id)
                        .push_bind(*dot);
                });
                qb.push(r#" ON CONFLICT ("clusterId", "dotNumber") DO NOTHING"#);
                qb.build().execute(&mut *tx).await?;
            }
            clusters_written += 1;
        }

        // Risk scores: latest run wins, for everyone, every time.
        sqlx::query(r#"DELETE FROM "CarrierRiskScore""#)
            .execute(&mut *tx)
            .await?;
        for chunk in output.risk_scores.chunks(INSERT_BATCH) {
            let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
                r#"INSERT INTO "CarrierRiskScore"
                   ("id", "dotNumber", "chameleonScore", "safetyScore",
                    "compositeScore", "signalsJson", "clusterSize", "updatedAt") "#,
            );
            qb.push_values(chunk, |mut b, rs| {
                let signals_json =
                    serde_json::to_string(&rs.signals).unwrap_or_else(|_| "[]".to_string());
                b.push_bind(Uuid::new_v4().to_string())
                    .push_bind(rs.dot)
                    .push_bind(rs.chameleon_score)
                    .push_bind(rs.safety_score)
                    .push_bind(rs.composite_score)
                    .push_bind(signals_json)
                    .push_bind(rs.cluster_size as i64)
                    .push_bind(now);
            });
            qb.push(
                r#" ON CONFLICT ("dotNumber") DO UPDATE SET
                    "chameleonScore" = EXCLUDED."chameleonScore",
                    "safetyScore" = EXCLUDED."safetyScore",
                    "compositeScore" = EXCLUDED."compositeScore",
                    "signalsJson" = EXCLUDED."signalsJson",
                    "clusterSize" = EXCLUDED."clusterSize",
                    "updatedAt" = EXCLUDED."updatedAt""#,
            );
            qb.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok((
            links.len() as u64,
            clusters_written,
            output.risk_scores.len() as u64,
        ))
    }
}
