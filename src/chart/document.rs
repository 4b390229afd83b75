//! Plotly-compatible JSON chart document.
//!
//! The shape matches what a `react-plotly.js` front end expects from
//! `figure.to_json()`: a `data` array of scatter traces and a `layout`
//! object. Only the fields this service sets are modelled.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ChartSpec, LEGEND_TITLE, X_AXIS_LABEL, Y_AXIS_LABEL};
use crate::model::VizError;

const TRANSPARENT: &str = "rgba(0,0,0,0)";
const FONT_FAMILY: &str = "Open Sans, extra bold";
const FONT_SIZE: u32 = 9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDocument {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: String,
    pub mode: String,
    pub name: String,
    pub x: Vec<NaiveDate>,
    pub y: Vec<f64>,
    pub line: LineStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub title: Text,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub family: String,
    pub size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Legend {
    pub title: Text,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub title: Text,
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub paper_bgcolor: String,
    pub plot_bgcolor: String,
    pub font: Font,
    pub legend: Legend,
    pub width: u32,
    pub height: u32,
}

fn text(s: &str) -> Text {
    Text { text: s.to_string() }
}

impl ChartDocument {
    pub fn from_spec(spec: &ChartSpec) -> Self {
        let data = spec
            .lines
            .iter()
            .map(|line| Trace {
                kind: "scatter".to_string(),
                mode: "lines".to_string(),
                name: line.name.clone(),
                x: line.points.iter().map(|p| p.date).collect(),
                y: line.points.iter().map(|p| p.percent).collect(),
                line: LineStyle {
                    color: line.color.css().to_string(),
                    dash: line.dashed.then(|| "dash".to_string()),
                },
            })
            .collect();

        let layout = Layout {
            title: text(&spec.title),
            xaxis: Axis { title: text(X_AXIS_LABEL) },
            yaxis: Axis { title: text(Y_AXIS_LABEL) },
            paper_bgcolor: TRANSPARENT.to_string(),
            plot_bgcolor: TRANSPARENT.to_string(),
            font: Font { family: FONT_FAMILY.to_string(), size: FONT_SIZE },
            legend: Legend { title: text(LEGEND_TITLE) },
            width: spec.width,
            height: spec.height,
        };

        ChartDocument { data, layout }
    }

    /// `(name, color)` of every trace, in drawing order.
    pub fn series_styles(&self) -> Vec<(String, String)> {
        self.data
            .iter()
            .map(|t| (t.name.clone(), t.line.color.clone()))
            .collect()
    }
}

/// Serializes the chart as a JSON string.
pub fn to_json(spec: &ChartSpec) -> Result<String, VizError> {
    serde_json::to_string(&ChartDocument::from_spec(spec)).map_err(|e| VizError::Render(e.to_string()))
}

/// Reads a chart document back, e.g. from a response body.
pub fn from_json(json: &str) -> Result<ChartDocument, VizError> {
    serde_json::from_str(json).map_err(|e| VizError::Render(e.to_string()))
}
