/// Threshold alerts and feed staleness.
///
/// - `thresholds` — fixed-threshold checks over current conditions.
/// - `stalenesses` — age checks on the latest sample of a feed.

pub mod stalenesses;
pub mod thresholds;
