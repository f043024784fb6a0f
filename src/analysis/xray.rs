//! GOES X-ray flux summary and flare classification.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::stats;
use crate::model::{Series, XrayClass};

pub const SHORT_CHANNEL: &str = "0.05-0.4nm";
pub const LONG_CHANNEL: &str = "0.1-0.8nm";

/// Long-channel samples covering 24 hours at 5-minute cadence.
pub const WINDOW_24H_SAMPLES: usize = 288;

/// Percentile used as the background flux level.
const BACKGROUND_QUANTILE: f64 = 0.1;

/// Classifies a long-channel (0.1-0.8nm) flux in W/m².
///
/// Breakpoints are lower-inclusive: 1e-8 is already B-class.
pub fn classify_xray_flux(flux: Option<f64>) -> XrayClass {
    match flux {
        None => XrayClass::Unknown,
        Some(f) if f < 1e-8 => XrayClass::A,
        Some(f) if f < 1e-7 => XrayClass::B,
        Some(f) if f < 1e-6 => XrayClass::C,
        Some(f) if f < 1e-5 => XrayClass::M,
        Some(f) if f < 1e-4 => XrayClass::X,
        Some(f) => XrayClass::XMultiple((f / 1e-4) as u32),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XrayMetrics {
    pub current_flux: Option<f64>,
    pub classification: XrayClass,
    pub max_24h: Option<f64>,
    pub background_level: Option<f64>,
    /// Samples on either channel.
    pub data_points: usize,
    pub last_update: Option<DateTime<Utc>>,
}

impl Default for XrayMetrics {
    fn default() -> Self {
        Self {
            current_flux: None,
            classification: XrayClass::Unknown,
            max_24h: None,
            background_level: None,
            data_points: 0,
            last_update: None,
        }
    }
}

pub fn extract_xray(series: &Series) -> XrayMetrics {
    let short = series.filter_tag("energy", SHORT_CHANNEL);
    let long = series.filter_tag("energy", LONG_CHANNEL);
    let data_points = short.len() + long.len();
    if data_points == 0 {
        return XrayMetrics::default();
    }

    let window = stats::present(long.tail(WINDOW_24H_SAMPLES), "flux");
    let current_flux = long.latest().and_then(|p| p.value("flux"));
    let last_update = short.last_update().max(long.last_update());

    XrayMetrics {
        current_flux,
        classification: classify_xray_flux(current_flux),
        max_24h: stats::max(&window),
        background_level: stats::quantile(&window, BACKGROUND_QUANTILE),
        data_points,
        last_update,
    }
}
