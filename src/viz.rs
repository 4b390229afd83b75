//! One visualization request, end to end: fetch, align, compare, render.

use crate::analysis::{alignment, comparison};
use crate::chart::{document, raster, ChartSpec, OutputFormat};
use crate::ingest::fred::{fetch_all, SeriesSource};
use crate::model::{SeriesId, VizError};
use crate::request::ComparisonRequest;

/// Per-request rendering settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartOptions {
    /// Year whose observations are averaged.
    pub reference_year: i32,
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartOutput {
    Json(String),
    Png(Vec<u8>),
}

/// Fetches every requested state plus the national series, then builds the
/// chart. Any failure aborts the request; nothing partial is returned.
pub async fn visualize(
    source: &dyn SeriesSource,
    request: &ComparisonRequest,
    options: ChartOptions,
) -> Result<ChartOutput, VizError> {
    let mut ids: Vec<SeriesId> = request.states().iter().map(|&s| SeriesId::State(s)).collect();
    ids.push(SeriesId::National);

    let mut series = fetch_all(source, &ids).await?;
    let national = series
        .pop()
        .ok_or_else(|| VizError::Render("national series missing from fetch results".to_string()))?;
    let states = series;

    let national = alignment::align_national(&national, &states);
    let cmp = comparison::compare(&states, &national, options.reference_year)?;
    let spec = ChartSpec::build(&states, &national, &cmp.narrative, options.width, options.height);

    match options.format {
        OutputFormat::Json => document::to_json(&spec).map(ChartOutput::Json),
        OutputFormat::Png => {
            let png = tokio::task::spawn_blocking(move || raster::render_png(&spec))
                .await
                .map_err(|e| VizError::Render(e.to_string()))??;
            Ok(ChartOutput::Png(png))
        }
    }
}
