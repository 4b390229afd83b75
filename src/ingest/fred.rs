/// FRED (Federal Reserve Economic Data) CSV Client
///
/// Retrieves monthly unemployment-rate series from the St. Louis Fed's
/// `fredgraph.csv` endpoint: one `<STATE>UR` series per requested state plus
/// the national `UNRATE` series.
///
/// Graph CSV export: https://fred.stlouisfed.org/graph/fredgraph.csv?id=UNRATE
///
/// The body is a two-column CSV with a header row, e.g.
///
/// ```text
/// observation_date,CAUR
/// 1976-01-01,9.2
/// 1976-02-01,9.2
/// ```

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use futures::future::try_join_all;

use crate::logging;
use crate::model::{FetchError, Observation, SeriesId, TimeSeries, NATIONAL_SERIES_ID};

pub const FRED_BASE_URL: &str = "https://fred.stlouisfed.org";

/// FRED writes this in the value column for months with no observation.
const MISSING_VALUE: &str = ".";

// ============================================================================
// URL Construction
// ============================================================================

/// Builds the CSV download URL for one upstream series id.
pub fn build_series_url(base_url: &str, upstream_id: &str) -> String {
    format!(
        "{}/graph/fredgraph.csv?id={}",
        base_url.trim_end_matches('/'),
        upstream_id
    )
}

// ============================================================================
// CSV Decoding
// ============================================================================

/// Parse a FRED graph CSV body into a `TimeSeries`.
///
/// Only the first two columns are read (date, percent); the header names are
/// ignored because FRED has renamed the date column over time. Rows whose
/// value is `.` are skipped. Anything else that fails to decode is an error
/// rather than a silently dropped row.
pub fn parse_series_csv(body: &str, id: SeriesId, upstream_id: &str) -> Result<TimeSeries, FetchError> {
    let malformed = |reason: String| FetchError::Malformed {
        series: upstream_id.to_string(),
        reason,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers = reader.headers().map_err(|e| malformed(e.to_string()))?;
    if headers.len() < 2 {
        return Err(malformed(format!("expected 2 columns, header has {}", headers.len())));
    }

    let mut observations = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| malformed(e.to_string()))?;
        let line = i + 2;

        let (Some(date_field), Some(value_field)) = (record.get(0), record.get(1)) else {
            return Err(malformed(format!("line {}: expected 2 columns", line)));
        };

        if value_field == MISSING_VALUE {
            continue;
        }

        let date = NaiveDate::parse_from_str(date_field, "%Y-%m-%d")
            .map_err(|e| malformed(format!("line {}: bad date '{}': {}", line, date_field, e)))?;
        let percent: f64 = value_field
            .parse()
            .map_err(|e| malformed(format!("line {}: bad value '{}': {}", line, value_field, e)))?;
        if !percent.is_finite() {
            return Err(malformed(format!("line {}: non-finite value '{}'", line, value_field)));
        }

        observations.push(Observation { date, percent });
    }

    if observations.is_empty() {
        return Err(FetchError::Empty(upstream_id.to_string()));
    }

    Ok(TimeSeries::new(id, observations))
}

// ============================================================================
// Series Sources
// ============================================================================

/// Anything that can produce a series by id. The HTTP client is the
/// production implementation; tests substitute canned data.
#[async_trait]
pub trait SeriesSource: Send + Sync {
    async fn fetch(&self, id: SeriesId) -> Result<TimeSeries, FetchError>;
}

/// HTTP client for the FRED graph CSV endpoint.
#[derive(Debug, Clone)]
pub struct FredClient {
    http: reqwest::Client,
    base_url: String,
    national_id: String,
}

impl FredClient {
    /// Client with the public FRED endpoint and the standard national series.
    pub fn with_defaults(timeout: Duration) -> Result<Self, FetchError> {
        Self::new(FRED_BASE_URL, NATIONAL_SERIES_ID, timeout)
    }

    /// # Parameters
    /// - `base_url`: scheme and host, e.g. `https://fred.stlouisfed.org`
    /// - `national_id`: upstream id for the national series
    /// - `timeout`: applied to each retrieval
    pub fn new(base_url: &str, national_id: &str, timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Request(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.to_string(),
            national_id: national_id.to_string(),
        })
    }

    pub fn series_url(&self, id: SeriesId) -> String {
        build_series_url(&self.base_url, &id.upstream_id(&self.national_id))
    }

    async fn fetch_body(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .http
            .get(url)
            .header("Accept", "text/csv")
            .send()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FetchError::Http(response.status().as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))
    }
}

#[async_trait]
impl SeriesSource for FredClient {
    async fn fetch(&self, id: SeriesId) -> Result<TimeSeries, FetchError> {
        let upstream_id = id.upstream_id(&self.national_id);
        let url = self.series_url(id);
        tracing::debug!(series = %upstream_id, %url, "fetching series");

        let result = match self.fetch_body(&url).await {
            Ok(body) => parse_series_csv(&body, id, &upstream_id),
            Err(e) => Err(e),
        };

        match &result {
            Ok(series) => tracing::debug!(
                series = %upstream_id,
                observations = series.len(),
                "series fetched"
            ),
            Err(e) => logging::log_fetch_failure(&upstream_id, "fetch", e),
        }

        result
    }
}

/// Fetch every id concurrently and wait for all of them.
///
/// Results come back in the order of `ids`. The first failure fails the
/// whole batch; there are no partial results.
pub async fn fetch_all(source: &dyn SeriesSource, ids: &[SeriesId]) -> Result<Vec<TimeSeries>, FetchError> {
    try_join_all(ids.iter().map(|&id| source.fetch(id))).await
}

// ============================================================================
// Tests
// ============================================================================
