//! HTTP surface.
//!
//! `GET /viz/{statecode}?statecode2=&statecode3=&view=` returns a Plotly
//! chart document as JSON, or a PNG when `view=true`. Unknown state codes
//! are a 404 with `{"detail": "State code XX not found"}`; everything else
//! that goes wrong is a 500 with the same body shape.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use crate::analysis::comparison::{reference_year, reference_year_for};
use crate::chart::OutputFormat;
use crate::config::ServiceConfig;
use crate::ingest::fred::SeriesSource;
use crate::model::VizError;
use crate::request::normalize;
use crate::viz::{visualize, ChartOptions, ChartOutput};

impl IntoResponse for VizError {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            StatusCode::NOT_FOUND
        } else {
            tracing::error!(error = %self, "visualization failed");
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(serde_json::json!({ "detail": self.to_string() }))).into_response()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn SeriesSource>,
    /// Pinned current year; `None` reads the wall clock per request.
    pub current_year: Option<i32>,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl AppState {
    pub fn new(source: Arc<dyn SeriesSource>, config: &ServiceConfig) -> Self {
        Self {
            source,
            current_year: config.current_year,
            chart_width: config.chart_width,
            chart_height: config.chart_height,
        }
    }

    fn reference_year(&self) -> i32 {
        match self.current_year {
            Some(year) => reference_year_for(year),
            None => reference_year(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct VizQuery {
    pub statecode2: Option<String>,
    pub statecode3: Option<String>,
    pub view: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/viz/{statecode}", get(unemployment_visualization))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Visualize state unemployment rates from FRED.
///
/// `statecode` is any USPS code for the 50 states or DC, case-insensitive.
/// `statecode2` / `statecode3` add states to compare against; `view=true`
/// returns a PNG instead of JSON for a react-plotly front end.
async fn unemployment_visualization(
    State(state): State<AppState>,
    Path(statecode): Path<String>,
    Query(query): Query<VizQuery>,
) -> Result<Response, VizError> {
    let request = normalize(&statecode, query.statecode2.as_deref(), query.statecode3.as_deref())?;

    let options = ChartOptions {
        reference_year: state.reference_year(),
        width: state.chart_width,
        height: state.chart_height,
        format: OutputFormat::from_view(query.view.as_deref()),
    };

    let output = visualize(state.source.as_ref(), &request, options).await?;
    tracing::info!(
        states = ?request.states().iter().map(|s| s.as_str()).collect::<Vec<_>>(),
        year = options.reference_year,
        format = ?options.format,
        "visualization served"
    );

    let response = match output {
        ChartOutput::Json(body) => ([(header::CONTENT_TYPE, OutputFormat::Json.content_type())], body).into_response(),
        ChartOutput::Png(bytes) => ([(header::CONTENT_TYPE, OutputFormat::Png.content_type())], bytes).into_response(),
    };
    Ok(response)
}

/// Bind and serve until Ctrl-C.
pub async fn run_server(config: &ServiceConfig, source: Arc<dyn SeriesSource>) -> anyhow::Result<()> {
    let app = router(AppState::new(source, config));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
            }
            tracing::info!("shutting down");
        })
        .await
        .context("server error")?;

    Ok(())
}
