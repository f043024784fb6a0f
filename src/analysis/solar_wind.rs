//! Solar wind plasma summaries (DSCOVR/ACE at L1).

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::stats;
use crate::model::Series;

/// Samples covering 24 hours at the nominal 15-minute cadence.
pub const WINDOW_24H_SAMPLES: usize = 96;

/// Sun–Earth L1 point to Earth, km.
const L1_DISTANCE_KM: f64 = 1_500_000.0;

/// Speed assumed when the plasma feed has no current value, km/s.
pub const DEFAULT_SPEED_KM_S: f64 = 400.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SolarWindMetrics {
    pub current_speed: Option<f64>,
    pub current_density: Option<f64>,
    pub current_temperature: Option<f64>,
    pub avg_speed_24h: Option<f64>,
    pub max_speed_24h: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Current plasma state from the last sample plus 24h speed statistics.
pub fn extract_solar_wind(series: &Series) -> SolarWindMetrics {
    let Some(latest) = series.latest() else {
        return SolarWindMetrics::default();
    };

    let speeds = stats::present(series.tail(WINDOW_24H_SAMPLES), "speed");
    SolarWindMetrics {
        current_speed: latest.value("speed"),
        current_density: latest.value("density"),
        current_temperature: latest.value("temperature"),
        avg_speed_24h: stats::mean(&speeds),
        max_speed_24h: stats::max(&speeds),
        timestamp: latest.timestamp,
    }
}

/// Compact plasma view for the ACE satellite report.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlasmaSnapshot {
    pub current_speed: Option<f64>,
    pub current_density: Option<f64>,
}

pub fn plasma_snapshot(series: &Series) -> PlasmaSnapshot {
    let latest = series.latest();
    PlasmaSnapshot {
        current_speed: latest.and_then(|p| p.value("speed")),
        current_density: latest.and_then(|p| p.value("density")),
    }
}

/// Minutes for solar wind at `speed` km/s to travel from L1 to Earth.
///
/// Missing speed is taken as 400 km/s; a non-positive speed yields 60 minutes.
pub fn propagation_time_minutes(speed: Option<f64>) -> f64 {
    let speed = speed.unwrap_or(DEFAULT_SPEED_KM_S);
    if speed > 0.0 {
        (L1_DISTANCE_KM / speed) / 60.0
    } else {
        60.0
    }
}
