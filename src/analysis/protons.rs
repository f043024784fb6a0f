//! GOES integral proton flux per energy channel, with SEP detection.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::stats;
use crate::model::Series;

/// Samples covering 24 hours at 5-minute cadence.
pub const WINDOW_24H_SAMPLES: usize = 288;

/// Flux (pfu) on a >=10 MeV channel above which an SEP event is flagged.
pub const SEP_THRESHOLD_PFU: f64 = 10.0;

const SEP_CHANNEL: &str = ">=10MeV";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProtonChannel {
    pub current_flux: Option<f64>,
    pub max_24h: Option<f64>,
    pub avg_24h: Option<f64>,
    pub alert_threshold_exceeded: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProtonMetrics {
    pub channels: BTreeMap<String, ProtonChannel>,
    pub sep_event_in_progress: bool,
    pub last_update: Option<DateTime<Utc>>,
}

/// Whether a channel label names the >=10 MeV threshold, ignoring spacing
/// (the feed writes ">=10 MeV").
fn is_sep_channel(label: &str) -> bool {
    let compact: String = label.chars().filter(|c| !c.is_whitespace()).collect();
    compact == SEP_CHANNEL
}

pub fn extract_protons(series: &Series) -> ProtonMetrics {
    let mut grouped: BTreeMap<String, Series> = BTreeMap::new();
    for point in &series.points {
        let label = point.tag("energy").unwrap_or("unknown").to_string();
        grouped.entry(label).or_default().points.push(point.clone());
    }

    let channels: BTreeMap<String, ProtonChannel> = grouped
        .into_iter()
        .map(|(label, channel)| {
            let window = stats::present(channel.tail(WINDOW_24H_SAMPLES), "flux");
            let current = channel.latest().and_then(|p| p.value("flux"));
            let exceeded =
                is_sep_channel(&label) && current.is_some_and(|flux| flux > SEP_THRESHOLD_PFU);
            let summary = ProtonChannel {
                current_flux: current,
                max_24h: stats::max(&window),
                avg_24h: stats::mean(&window),
                alert_threshold_exceeded: exceeded,
            };
            (label, summary)
        })
        .collect();

    ProtonMetrics {
        sep_event_in_progress: channels.values().any(|c| c.alert_threshold_exceeded),
        channels,
        last_update: series.last_update(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feeds::FeedShape;
    use crate::ingest::{FeedPayload, normalize};
    use serde_json::{Value, json};

    fn protons(samples: &[(&str, f64)]) -> Series {
        let records: Vec<Value> = samples
            .iter()
            .enumerate()
            .map(|(i, (energy, flux))| {
                json!({"time_tag": format!("2024-05-01T00:{:02}:00Z", i), "satellite": 18, "flux": flux, "energy": energy})
            })
            .collect();
        let payload = FeedPayload::from_json(
            "integral-protons-1-day",
            FeedShape::Records,
            Value::Array(records),
        )
        .unwrap();
        normalize(&payload, "time_tag")
    }

    #[test]
    fn test_channels_are_grouped_by_energy() {
        let metrics = extract_protons(&protons(&[
            (">=10 MeV", 1.0),
            (">=100 MeV", 0.1),
            (">=10 MeV", 3.0),
        ]));

        assert_eq!(metrics.channels.len(), 2);
        let ten = &metrics.channels[">=10 MeV"];
        assert_eq!(ten.current_flux, Some(3.0));
        assert_eq!(ten.max_24h, Some(3.0));
        assert_eq!(ten.avg_24h, Some(2.0));
        assert!(!metrics.sep_event_in_progress);
    }

    #[test]
    fn test_sep_flag_requires_ten_mev_channel_above_threshold() {
        let metrics = extract_protons(&protons(&[(">=10 MeV", 10.5), (">=100 MeV", 50.0)]));
        assert!(metrics.channels[">=10 MeV"].alert_threshold_exceeded);
        assert!(!metrics.channels[">=100 MeV"].alert_threshold_exceeded);
        assert!(metrics.sep_event_in_progress);
    }

    #[test]
    fn test_threshold_is_strict() {
        let metrics = extract_protons(&protons(&[(">=10MeV", 10.0)]));
        assert!(!metrics.sep_event_in_progress);
    }

    #[test]
    fn test_empty_series_has_no_channels() {
        let metrics = extract_protons(&Series::default());
        assert!(metrics.channels.is_empty());
        assert!(!metrics.sep_event_in_progress);
    }
}
