// =============================================================================
// soda.rs — THE OPEN-DATA SIPHON
// =============================================================================
//
// data.transportation.gov publishes the FMCSA carrier census, crash
// register, and roadside inspection records through Socrata's SODA API:
// plain HTTP GET, JSON arrays out, SoQL predicates in. No API key, no
// OAuth dance, no session cookies. Just you, the federal government, and
// fifty thousand rows per page.
//
// The rules of engagement, all enforced here:
//   - $order=":id" on every query, because pagination without a stable
//     order is a slot machine
//   - $limit=50000, the cap for uncredentialed requests
//   - 500 ms between pages of a single query (we're obsessive, not rude)
//   - three attempts per page with 2s/4s backoff before we declare the
//     fetch dead and let the stage eat the failure
//   - single quotes in predicate literals are doubled, because SoQL
//     string escaping is SQL string escaping wearing a lanyard
//
// The circuit breaker wraps all of it: the backoff loop rides out the
// fast wobble, the breaker rides out the real outage.
// =============================================================================

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::circuit_breaker::CircuitBreaker;
use crate::config::Config;
use crate::error::EngineError;
use crate::metrics::IngestMetrics;

/// FMCSA carrier census (registration) resource.
pub const CENSUS_RESOURCE: &str = "az4n-8mr2";
/// FMCSA crash register resource.
pub const CRASH_RESOURCE: &str = "aayw-vxb3";
/// FMCSA roadside inspection resource.
pub const INSPECTION_RESOURCE: &str = "fx4q-ay7w";

/// The census fields we care about. Everything the feature extractor,
/// the temporal augmenter, and the risk scorer will ever ask for, and
/// not one column more — the census has ~90 columns and we are not
/// paying bandwidth for MCS-150 mileage years.
pub const CENSUS_SELECT: &str = "dot_number,legal_name,dba_name,phy_street,phy_city,phy_state,phy_zip,\
phone,fax,cell_phone,company_officer_1,company_officer_2,\
status_code,prior_revoke_flag,prior_revoke_dot_number,\
add_date,power_units,total_drivers,fleetsize,docket1prefix,docket1";

/// Page-fetch attempts before a stage failure. The waits between
/// attempts are 2s then 4s.
const MAX_FETCH_ATTEMPTS: u32 = 3;

/// Double single quotes for SoQL string literals. "O'BRIEN TRUCKING"
/// is a real officer name and it WILL appear in a predicate.
pub fn escape_soql(value: &str) -> String {
    value.replace('\'', "''")
}

/// One query's worth of knobs. `where_clause`/`select` empty means
/// "omit the parameter"; `max_rows` 0 means "no cap".
#[derive(Debug, Clone, Default)]
pub struct SodaQuery {
    pub resource: &'static str,
    pub where_clause: String,
    pub select: String,
    pub max_rows: usize,
}

/// The SODA client: reqwest underneath, circuit breaker on top,
/// metrics on the side.
pub struct SodaClient {
    http: reqwest::Client,
    base_url: String,
    page_size: usize,
    page_delay: Duration,
    breaker: CircuitBreaker,
    metrics: Arc<IngestMetrics>,
}

impl SodaClient {
    pub fn new(config: &Config, metrics: Arc<IngestMetrics>) -> anyhow::Result<Self> {
        // Socrata doesn't demand a User-Agent the way the SEC does, but
        // we identify ourselves anyway because we were raised right.
        let http = reqwest::Client::builder()
            .timeout(config.soda_timeout)
            .user_agent("ChameleonEngine/0.1 (carrier-affiliation-research)")
            .build()?;

        Ok(Self {
            http,
            base_url: config.soda_base_url.clone(),
            page_size: config.soda_page_size,
            page_delay: config.soda_page_delay,
            breaker: CircuitBreaker::new(
                "SODA",
                config.circuit_breaker_failure_threshold,
                config.circuit_breaker_reset_timeout,
                config.circuit_breaker_success_threshold,
            ),
            metrics,
        })
    }

    /// Fetch one page, retrying transient failures with 2s/4s backoff.
    /// Exhausted retries (or an open breaker) surface as FetchFatal.
    async fn fetch_page(
        &self,
        query: &SodaQuery,
        offset: usize,
    ) -> Result<Vec<Value>, EngineError> {
        let mut attempt: u32 = 0;
        loop {
            if !self.breaker.allow_request() {
                return Err(EngineError::FetchFatal(format!(
                    "circuit breaker is {} for {}",
                    self.breaker.state(),
                    query.resource
                )));
            }

            match self.request_page(query, offset).await {
                Ok(rows) => {
                    self.breaker.record_success();
                    self.metrics.record_page(rows.len() as u64);
                    return Ok(rows);
                }
                Err(EngineError::FetchTransient(msg)) => {
                    self.breaker.record_failure();
                    attempt += 1;
                    if attempt >= MAX_FETCH_ATTEMPTS {
                        return Err(EngineError::FetchFatal(format!(
                            "{} after {} attempts: {}",
                            query.resource, attempt, msg
                        )));
                    }
                    let wait = Duration::from_secs(1 << attempt); // 2s, then 4s
                    warn!(
                        resource = query.resource,
                        attempt,
                        wait_secs = wait.as_secs(),
                        error = msg.as_str(),
                        "page fetch failed — retrying"
                    );
                    self.metrics.record_http_retry();
                    tokio::time::sleep(wait).await;
                }
                Err(other) => return Err(other),
            }
        }
    }

    /// One raw HTTP round trip. Everything that can go wrong here is
    /// transient until the retry loop says otherwise.
    async fn request_page(
        &self,
        query: &SodaQuery,
        offset: usize,
    ) -> Result<Vec<Value>, EngineError> {
        let url = format!("{}/{}.json", self.base_url, query.resource);

        let limit = self.page_size.to_string();
        let offset_s = offset.to_string();
        let mut params: Vec<(&str, &str)> = vec![
            ("$limit", limit.as_str()),
            ("$offset", offset_s.as_str()),
            ("$order", ":id"),
        ];
        if !query.where_clause.is_empty() {
            params.push(("$where", query.where_clause.as_str()));
        }
        if !query.select.is_empty() {
            params.push(("$select", query.select.as_str()));
        }

        let response = self
            .http
            .get(&url)
            .query(&params)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| EngineError::FetchTransient(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::FetchTransient(format!(
                "HTTP {status} from {}",
                query.resource
            )));
        }

        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| EngineError::FetchTransient(format!("bad JSON page: {e}")))
    }

    /// Paginate a query to exhaustion (or to `max_rows`, whichever comes
    /// first), with the mandatory 500 ms of politeness between pages.
    pub async fn fetch_all(&self, query: &SodaQuery) -> Result<Vec<Value>, EngineError> {
        let mut all_rows: Vec<Value> = Vec::new();
        let mut offset = 0usize;

        loop {
            let page = self.fetch_page(query, offset).await?;
            if page.is_empty() {
                break;
            }
            let page_len = page.len();
            all_rows.extend(page);
            debug!(
                resource = query.resource,
                rows = all_rows.len(),
                "fetched rows so far"
            );

            if query.max_rows > 0 && all_rows.len() >= query.max_rows {
                all_rows.truncate(query.max_rows);
                break;
            }
            if page_len < self.page_size {
                break;
            }
            offset += self.page_size;
            tokio::time::sleep(self.page_delay).await;
        }

        info!(
            resource = query.resource,
            rows = all_rows.len(),
            "query complete"
        );
        Ok(all_rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soql_escaping_doubles_quotes() {
        assert_eq!(escape_soql("O'BRIEN TRUCKING"), "O''BRIEN TRUCKING");
        assert_eq!(escape_soql("plain"), "plain");
        assert_eq!(escape_soql("a''b"), "a''''b");
    }

    #[test]
    fn census_select_names_every_extractor_field() {
        for field in [
            "dot_number",
            "phone",
            "fax",
            "cell_phone",
            "company_officer_1",
            "company_officer_2",
            "phy_street",
            "status_code",
            "prior_revoke_flag",
            "prior_revoke_dot_number",
            "add_date",
            "power_units",
        ] {
            assert!(CENSUS_SELECT.contains(field), "missing {field}");
        }
    }
}
