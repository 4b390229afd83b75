/// Series analysis for the unemployment visualization service.
///
/// Submodules:
/// - `alignment`: trims the national series to the requested states' range.
/// - `comparison`: trailing-window averages and narrative selection.

pub mod alignment;
pub mod comparison;
