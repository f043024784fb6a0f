//! Magnetic field summaries: the interplanetary field at L1 (Bz/Bt) and the
//! GOES geostationary magnetometer disturbance level.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::solar_wind::WINDOW_24H_SAMPLES;
use super::stats;
use crate::model::Series;

/// Each L1 sample stands for this many minutes.
const SAMPLE_MINUTES: u32 = 15;

/// GOES magnetometer samples covering 24 hours at 1-minute cadence.
pub const GOES_WINDOW_24H_SAMPLES: usize = 1440;

// ---------------------------------------------------------------------------
// Interplanetary magnetic field
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImfMetrics {
    pub current_bz: Option<f64>,
    pub current_bt: Option<f64>,
    pub southward_duration_minutes: u32,
    pub avg_bt_24h: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Current Bz/Bt plus how long the field pointed south over the last day.
pub fn extract_imf(series: &Series) -> ImfMetrics {
    let Some(latest) = series.latest() else {
        return ImfMetrics::default();
    };

    let window = series.tail(WINDOW_24H_SAMPLES);
    let southward_samples = stats::present(window, "bz_gsm")
        .into_iter()
        .filter(|bz| *bz < 0.0)
        .count() as u32;

    ImfMetrics {
        current_bz: latest.value("bz_gsm"),
        current_bt: latest.value("bt"),
        southward_duration_minutes: southward_samples * SAMPLE_MINUTES,
        avg_bt_24h: stats::mean(&stats::present(window, "bt")),
        timestamp: latest.timestamp,
    }
}

/// Compact field view for the ACE satellite report.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MagneticSnapshot {
    pub current_bz: Option<f64>,
    pub current_bt: Option<f64>,
}

pub fn magnetic_snapshot(series: &Series) -> MagneticSnapshot {
    let latest = series.latest();
    MagneticSnapshot {
        current_bz: latest.and_then(|p| p.value("bz_gsm")),
        current_bt: latest.and_then(|p| p.value("bt")),
    }
}

// ---------------------------------------------------------------------------
// GOES magnetometer disturbance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DisturbanceLevel {
    Quiet,
    Unsettled,
    Active,
    #[serde(rename = "Minor Storm")]
    MinorStorm,
    #[serde(rename = "Major Storm")]
    MajorStorm,
    Unknown,
}

impl fmt::Display for DisturbanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DisturbanceLevel::Quiet => "Quiet",
            DisturbanceLevel::Unsettled => "Unsettled",
            DisturbanceLevel::Active => "Active",
            DisturbanceLevel::MinorStorm => "Minor Storm",
            DisturbanceLevel::MajorStorm => "Major Storm",
            DisturbanceLevel::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

/// Maps the 24h standard deviation of the total field (nT) to a label.
pub fn classify_disturbance(variation: Option<f64>) -> DisturbanceLevel {
    match variation {
        None => DisturbanceLevel::Unknown,
        Some(v) if v < 10.0 => DisturbanceLevel::Quiet,
        Some(v) if v < 20.0 => DisturbanceLevel::Unsettled,
        Some(v) if v < 30.0 => DisturbanceLevel::Active,
        Some(v) if v < 50.0 => DisturbanceLevel::MinorStorm,
        Some(_) => DisturbanceLevel::MajorStorm,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldComponents {
    pub hp: Option<f64>,
    pub he: Option<f64>,
    pub hn: Option<f64>,
    pub total: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeomagneticMetrics {
    pub current_field: FieldComponents,
    pub variation_24h: Option<f64>,
    pub disturbance_level: DisturbanceLevel,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Default for GeomagneticMetrics {
    fn default() -> Self {
        Self {
            current_field: FieldComponents::default(),
            variation_24h: None,
            disturbance_level: DisturbanceLevel::Unknown,
            timestamp: None,
        }
    }
}

/// Total field, whichever name the feed uses for it.
fn total_field(point: &crate::model::TimePoint) -> Option<f64> {
    point.value("total").or_else(|| point.value("Ht"))
}

pub fn extract_geomagnetic(series: &Series) -> GeomagneticMetrics {
    let Some(latest) = series.latest() else {
        return GeomagneticMetrics::default();
    };

    let totals: Vec<f64> = series
        .tail(GOES_WINDOW_24H_SAMPLES)
        .iter()
        .filter_map(total_field)
        .collect();
    let variation = stats::sample_std_dev(&totals);

    GeomagneticMetrics {
        current_field: FieldComponents {
            hp: latest.value("Hp"),
            he: latest.value("He"),
            hn: latest.value("Hn"),
            total: total_field(latest),
        },
        variation_24h: variation,
        disturbance_level: classify_disturbance(variation),
        timestamp: latest.timestamp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feeds::FeedShape;
    use crate::ingest::{FeedPayload, normalize};
    use serde_json::{Value, json};

    fn mag_table(rows: Vec<Value>) -> Series {
        let mut table = vec![json!(["time_tag", "bx_gsm", "by_gsm", "bz_gsm", "bt"])];
        table.extend(rows);
        let payload =
            FeedPayload::from_json("mag-7-day", FeedShape::Table, Value::Array(table)).unwrap();
        normalize(&payload, "time_tag")
    }

    fn goes_records(totals: &[f64]) -> Series {
        let records: Vec<Value> = totals
            .iter()
            .map(|t| json!({"time_tag": "2024-05-01T00:00:00Z", "Hp": 90.0, "He": 10.0, "Hn": 1.0, "total": t}))
            .collect();
        let payload =
            FeedPayload::from_json("magnetometers-1-day", FeedShape::Records, Value::Array(records))
                .unwrap();
        normalize(&payload, "time_tag")
    }

    #[test]
    fn test_southward_duration_counts_negative_bz() {
        let series = mag_table(vec![
            json!(["2024-05-01 00:00:00.000", "1", "1", "-2.0", "5.0"]),
            json!(["2024-05-01 00:15:00.000", "1", "1", "0.0", "5.0"]),
            json!(["2024-05-01 00:30:00.000", "1", "1", null, "5.0"]),
            json!(["2024-05-01 00:45:00.000", "1", "1", "-8.5", "7.0"]),
        ]);
        let metrics = extract_imf(&series);

        assert_eq!(metrics.southward_duration_minutes, 30);
        assert_eq!(metrics.current_bz, Some(-8.5));
        assert_eq!(metrics.current_bt, Some(7.0));
        assert_eq!(metrics.avg_bt_24h, Some(5.5));
    }

    #[test]
    fn test_empty_imf_series_yields_default() {
        let metrics = extract_imf(&Series::default());
        assert_eq!(metrics.current_bz, None);
        assert_eq!(metrics.southward_duration_minutes, 0);
    }

    #[test]
    fn test_disturbance_breakpoints() {
        assert_eq!(classify_disturbance(Some(9.99)), DisturbanceLevel::Quiet);
        assert_eq!(classify_disturbance(Some(10.0)), DisturbanceLevel::Unsettled);
        assert_eq!(classify_disturbance(Some(29.9)), DisturbanceLevel::Active);
        assert_eq!(classify_disturbance(Some(49.9)), DisturbanceLevel::MinorStorm);
        assert_eq!(classify_disturbance(Some(50.0)), DisturbanceLevel::MajorStorm);
        assert_eq!(classify_disturbance(None), DisturbanceLevel::Unknown);
    }

    #[test]
    fn test_geomagnetic_variation_and_label() {
        let metrics = extract_geomagnetic(&goes_records(&[100.0, 100.0, 100.0, 100.0]));
        assert_eq!(metrics.variation_24h, Some(0.0));
        assert_eq!(metrics.disturbance_level, DisturbanceLevel::Quiet);
        assert_eq!(metrics.current_field.total, Some(100.0));
        assert_eq!(metrics.current_field.hp, Some(90.0));

        let stormy = extract_geomagnetic(&goes_records(&[0.0, 200.0, 0.0, 200.0]));
        assert_eq!(stormy.disturbance_level, DisturbanceLevel::MajorStorm);
    }

    #[test]
    fn test_empty_goes_series_yields_default() {
        let metrics = extract_geomagnetic(&Series::default());
        assert_eq!(metrics, GeomagneticMetrics::default());
        assert_eq!(metrics.current_field, FieldComponents::default());
        assert_eq!(metrics.variation_24h, None);
        assert_eq!(metrics.disturbance_level, DisturbanceLevel::Unknown);
        assert_eq!(metrics.timestamp, None);
    }

    #[test]
    fn test_single_sample_has_unknown_disturbance() {
        let metrics = extract_geomagnetic(&goes_records(&[100.0]));
        assert_eq!(metrics.variation_24h, None);
        assert_eq!(metrics.disturbance_level, DisturbanceLevel::Unknown);
    }

    #[test]
    fn test_disturbance_serializes_with_spaces() {
        assert_eq!(
            serde_json::to_value(DisturbanceLevel::MinorStorm).unwrap(),
            json!("Minor Storm")
        );
    }
}
