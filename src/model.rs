/// Observation, TimeSeries, SeriesId, FetchError, VizError
/// core data structures and error handling
///
/// Core data types for the unemployment visualization service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no I/O. Series are fetched in `ingest`, compared in `analysis`
/// and drawn in `chart`; all of them speak in these types.

use chrono::NaiveDate;
use thiserror::Error;

use crate::states::StateCode;

// ---------------------------------------------------------------------------
// Series identifiers
// ---------------------------------------------------------------------------

/// FRED series id for the national unemployment rate.
pub const NATIONAL_SERIES_ID: &str = "UNRATE";

/// Display label for the national series.
pub const NATIONAL_LABEL: &str = "United States";

/// Which upstream series to retrieve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesId {
    /// Monthly unemployment rate for one state, keyed `<CODE>UR` upstream.
    State(StateCode),
    /// The national unemployment rate.
    National,
}

impl SeriesId {
    /// Upstream series identifier. `national_id` is the configured id for the
    /// national series (normally [`NATIONAL_SERIES_ID`]).
    pub fn upstream_id(&self, national_id: &str) -> String {
        match self {
            SeriesId::State(code) => format!("{}UR", code.as_str()),
            SeriesId::National => national_id.to_string(),
        }
    }

    /// Human-readable label used in titles and legends.
    pub fn label(&self) -> &'static str {
        match self {
            SeriesId::State(code) => code.name(),
            SeriesId::National => NATIONAL_LABEL,
        }
    }
}

impl std::fmt::Display for SeriesId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeriesId::State(code) => write!(f, "{}", code),
            SeriesId::National => write!(f, "US"),
        }
    }
}

// ---------------------------------------------------------------------------
// Observation types
// ---------------------------------------------------------------------------

/// A single monthly observation: the calendar date the provider reports and
/// the unemployment rate in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub percent: f64,
}

/// A date-ordered run of observations for one series. Read-only once fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub id: SeriesId,
    pub observations: Vec<Observation>,
}

impl TimeSeries {
    /// Builds a series, sorting observations by date so downstream code can
    /// rely on ordering regardless of how the provider returned them.
    pub fn new(id: SeriesId, mut observations: Vec<Observation>) -> Self {
        observations.sort_by_key(|o| o.date);
        Self { id, observations }
    }

    pub fn label(&self) -> &'static str {
        self.id.label()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.first().map(|o| o.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(|o| o.date)
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when fetching or decoding a FRED series.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// Non-2xx HTTP response from the provider.
    #[error("HTTP error: {0}")]
    Http(u16),
    /// The request never produced a response (connect failure, timeout, body read).
    #[error("Request failed: {0}")]
    Request(String),
    /// The body was not the expected two-column date/value CSV.
    #[error("Parse error for series {series}: {reason}")]
    Malformed { series: String, reason: String },
    /// The body parsed but held no observations.
    #[error("No data available for series: {0}")]
    Empty(String),
}

/// Everything that can abort a visualization request.
#[derive(Debug, Error)]
pub enum VizError {
    /// An input code is not in the state registry. Surfaced as 404.
    #[error("State code {0} not found")]
    StateNotFound(String),
    #[error(transparent)]
    Upstream(#[from] FetchError),
    /// A series has no observations in the comparison year, so no average exists.
    #[error("Series {series} has no observations in {year}")]
    InsufficientData { series: String, year: i32 },
    #[error("Render error: {0}")]
    Render(String),
}

impl VizError {
    /// Whether the caller can fix the request (as opposed to a server-side failure).
    pub fn is_client_error(&self) -> bool {
        matches!(self, VizError::StateNotFound(_))
    }
}
