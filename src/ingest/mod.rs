/// Upstream data acquisition.
///
/// Submodules:
/// - `fred`: FRED graph CSV client, decoding, and the `SeriesSource` seam.

pub mod fred;
