//! PNG rendering.
//!
//! Draws into an in-memory RGB buffer with `plotters` and encodes it with
//! `image`. The national line is dashed; every line gets a legend entry.
//! Text is drawn with DejaVu Sans, embedded in the binary and registered as
//! plotters' `sans-serif` family on first use.

use std::io::Cursor;
use std::sync::OnceLock;

use chrono::{Duration, NaiveDate};
use image::{DynamicImage, ImageFormat, RgbImage};
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use plotters::style::{register_font, FontStyle};

use super::{ChartSpec, X_AXIS_LABEL, Y_AXIS_LABEL};
use crate::model::VizError;

const DASH_LENGTH: u32 = 6;
const DASH_GAP: u32 = 4;

const FONT_FAMILY: &str = "sans-serif";
static FONT_BYTES: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");
static FONT_REGISTERED: OnceLock<bool> = OnceLock::new();

/// Registers the embedded font with plotters. Without a registered font,
/// plotters cannot lay out captions, axis labels or legend entries.
fn ensure_font() -> Result<(), VizError> {
    let registered =
        *FONT_REGISTERED.get_or_init(|| register_font(FONT_FAMILY, FontStyle::Normal, FONT_BYTES).is_ok());
    if registered {
        Ok(())
    } else {
        Err(VizError::Render("embedded chart font could not be loaded".to_string()))
    }
}

fn render_err<E: std::fmt::Display>(e: E) -> VizError {
    VizError::Render(e.to_string())
}

/// Renders the chart to PNG bytes.
pub fn render_png(spec: &ChartSpec) -> Result<Vec<u8>, VizError> {
    let (width, height) = (spec.width, spec.height);
    if width == 0 || height == 0 {
        return Err(VizError::Render(format!("invalid image size {}x{}", width, height)));
    }
    ensure_font()?;

    let (start, mut end) = spec
        .date_range()
        .ok_or_else(|| VizError::Render("chart has no observations".to_string()))?;
    if end <= start {
        end = start + Duration::days(1);
    }
    let (lo, hi) = spec.value_range().unwrap_or((0.0, 1.0));
    let pad = ((hi - lo) * 0.05).max(0.5);

    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&spec.title, (FONT_FAMILY, 14))
            .margin(10)
            .x_label_area_size(32)
            .y_label_area_size(44)
            .build_cartesian_2d(start..end, (lo - pad)..(hi + pad))
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .x_desc(X_AXIS_LABEL)
            .y_desc(Y_AXIS_LABEL)
            .x_label_formatter(&|d: &NaiveDate| d.format("%Y").to_string())
            .y_label_formatter(&|v: &f64| format!("{:.1}", v))
            .draw()
            .map_err(render_err)?;

        for line in &spec.lines {
            let (r, g, b) = line.color.rgb();
            let color = RGBColor(r, g, b);
            let points = line.points.iter().map(|p| (p.date, p.percent));

            let anno = if line.dashed {
                chart
                    .draw_series(DashedLineSeries::new(points, DASH_LENGTH, DASH_GAP, color.stroke_width(1)))
                    .map_err(render_err)?
            } else {
                chart
                    .draw_series(LineSeries::new(points, color.stroke_width(1)))
                    .map_err(render_err)?
            };
            anno.label(line.name.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], color));
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font((FONT_FAMILY, 11))
            .draw()
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
    }

    let image = RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| VizError::Render("pixel buffer does not match image size".to_string()))?;
    let mut png = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(render_err)?;

    Ok(png)
}
