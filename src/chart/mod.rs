/// Chart assembly for the unemployment visualization service.
///
/// A `ChartSpec` is the renderer-neutral description of one response: the
/// title chosen by the comparison, one line per requested state, and the
/// dashed national line. It is serialized by `document` (JSON) or drawn by
/// `raster` (PNG).
///
/// Submodules:
/// - `document`: Plotly-compatible JSON chart document.
/// - `raster`: PNG rendering.

pub mod document;
pub mod raster;

use chrono::NaiveDate;

use crate::analysis::comparison::{LineColor, Narrative};
use crate::model::{Observation, TimeSeries};

pub const X_AXIS_LABEL: &str = "Date";
pub const Y_AXIS_LABEL: &str = "Percent Unemployed";
pub const LEGEND_TITLE: &str = "States";

pub const DEFAULT_WIDTH: u32 = 640;
pub const DEFAULT_HEIGHT: u32 = 412;

// ---------------------------------------------------------------------------
// Output format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Png,
}

impl OutputFormat {
    /// PNG when `view` is `true` in any letter case, JSON otherwise.
    pub fn from_view(view: Option<&str>) -> Self {
        match view {
            Some(v) if v.trim().eq_ignore_ascii_case("true") => OutputFormat::Png,
            _ => OutputFormat::Json,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Json => "application/json",
            OutputFormat::Png => "image/png",
        }
    }
}

// ---------------------------------------------------------------------------
// Chart description
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ChartLine {
    pub name: String,
    pub color: LineColor,
    pub dashed: bool,
    pub points: Vec<Observation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub lines: Vec<ChartLine>,
    pub width: u32,
    pub height: u32,
}

impl ChartSpec {
    /// Assembles the chart: requested states in slot order, each colored per
    /// the narrative, followed by the (already aligned) national line, dashed.
    ///
    /// The national line is last for every state count, including three-state
    /// charts, which do not use the older `state 1, US, state 2, state 3`
    /// trace order.
    pub fn build(states: &[TimeSeries], national: &TimeSeries, narrative: &Narrative, width: u32, height: u32) -> Self {
        let mut lines: Vec<ChartLine> = states
            .iter()
            .zip(&narrative.state_colors)
            .map(|(series, &color)| ChartLine {
                name: series.label().to_string(),
                color,
                dashed: false,
                points: series.observations.clone(),
            })
            .collect();

        lines.push(ChartLine {
            name: national.label().to_string(),
            color: narrative.national_color,
            dashed: true,
            points: national.observations.clone(),
        });

        ChartSpec {
            title: narrative.title.clone(),
            lines,
            width,
            height,
        }
    }

    /// Earliest and latest date across every line.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.lines.iter().flat_map(|l| l.points.iter().map(|p| p.date));
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }

    /// Smallest and largest value across every line.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let mut values = self.lines.iter().flat_map(|l| l.points.iter().map(|p| p.percent));
        let first = values.next()?;
        Some(values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}
