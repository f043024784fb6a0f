/// Metric extractors: compact current-state summaries of normalized feeds.
///
/// Every extractor is a pure function of a `Series`. An empty series yields
/// the documented default structure (missing values, "Unknown" labels), so an
/// unreachable feed degrades the report instead of failing it.
///
/// Submodules:
/// - `stats` — window statistics that skip missing values.
/// - `solar_wind`, `magnetometer` — L1 plasma and field, GOES disturbance.
/// - `xray`, `protons` — GOES flux channels.
/// - `indices`, `regions`, `flares` — solar cycle, sunspots and the flare catalog.

pub mod flares;
pub mod indices;
pub mod magnetometer;
pub mod protons;
pub mod regions;
pub mod solar_wind;
pub mod stats;
pub mod xray;
