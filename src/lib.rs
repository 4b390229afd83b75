//! State unemployment-rate comparison charts.
//!
//! Fetches monthly unemployment series for up to three U.S. states plus the
//! national rate from FRED, compares their averages five years back, and
//! serves the result as a Plotly chart document or a PNG.

pub mod analysis;
pub mod chart;
pub mod config;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod request;
pub mod server;
pub mod states;
pub mod verify;
pub mod viz;
