//! Flare catalog analysis: windowed class counts, activity level, and
//! best-effort attribution of each flare to a sunspot region.
//!
//! # Region attribution
//! The GOES flare list rarely names a source region. When it does not, the
//! flare is matched against the regions observed on the flare's day, in tiers:
//!
//! 1. regions whose historical event count for the flare's class is non-zero;
//! 2. regions whose flare probability for the class meets a threshold;
//! 3. every candidate region.
//!
//! Within the first non-empty tier the region with the highest
//! `complex*1000 + area + c_prob + 10*m_prob + 100*x_prob` wins; on an exact
//! tie the region encountered first in feed order is kept. The outcome is
//! order-sensitive and must stay reproducible, so keep the formula and the
//! first-wins rule as they are.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::ingest::parse_timestamp;
use crate::model::{ActiveRegion, Attribution, FlareEvent, FlareLetter, Series, TimePoint};

/// Flares returned in the report, most recent first.
const LISTED_FLARES: usize = 10;

/// Multi-day counting window.
const MULTI_DAY_HOURS: i64 = 72;

pub const DATA_SOURCE: &str = "NOAA SWPC";

// ---------------------------------------------------------------------------
// Class counts and activity level
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClassCounts {
    #[serde(rename = "B")]
    pub b: u32,
    #[serde(rename = "C")]
    pub c: u32,
    #[serde(rename = "M")]
    pub m: u32,
    #[serde(rename = "X")]
    pub x: u32,
}

impl ClassCounts {
    pub fn record(&mut self, letter: FlareLetter) {
        match letter {
            FlareLetter::B => self.b += 1,
            FlareLetter::C => self.c += 1,
            FlareLetter::M => self.m += 1,
            FlareLetter::X => self.x += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActivityLevel {
    Quiet,
    #[serde(rename = "Very Low")]
    VeryLow,
    Low,
    #[serde(rename = "Low-Moderate")]
    LowModerate,
    Moderate,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
    Unknown,
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ActivityLevel::Quiet => "Quiet",
            ActivityLevel::VeryLow => "Very Low",
            ActivityLevel::Low => "Low",
            ActivityLevel::LowModerate => "Low-Moderate",
            ActivityLevel::Moderate => "Moderate",
            ActivityLevel::High => "High",
            ActivityLevel::VeryHigh => "Very High",
            ActivityLevel::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

/// Activity level from 24-hour flare counts; the first matching rule wins.
pub fn classify_activity(counts: &ClassCounts) -> ActivityLevel {
    if counts.x > 0 {
        ActivityLevel::VeryHigh
    } else if counts.m >= 3 {
        ActivityLevel::High
    } else if counts.m >= 1 {
        ActivityLevel::Moderate
    } else if counts.c >= 5 {
        ActivityLevel::LowModerate
    } else if counts.c >= 1 {
        ActivityLevel::Low
    } else if counts.b >= 1 {
        ActivityLevel::VeryLow
    } else {
        ActivityLevel::Quiet
    }
}

// ---------------------------------------------------------------------------
// Region attribution
// ---------------------------------------------------------------------------

/// Minimum flare probability (percent) for the probability tier.
fn probability_threshold(letter: FlareLetter) -> Option<f64> {
    match letter {
        FlareLetter::B => None,
        FlareLetter::C => Some(50.0),
        FlareLetter::M => Some(20.0),
        FlareLetter::X => Some(5.0),
    }
}

fn event_count(region: &ActiveRegion, letter: FlareLetter) -> u32 {
    match letter {
        FlareLetter::B => 0,
        FlareLetter::C => region.c_xray_events,
        FlareLetter::M => region.m_xray_events,
        FlareLetter::X => region.x_xray_events,
    }
}

fn flare_probability(region: &ActiveRegion, letter: FlareLetter) -> f64 {
    match letter {
        FlareLetter::B => 0.0,
        FlareLetter::C => region.c_flare_probability,
        FlareLetter::M => region.m_flare_probability,
        FlareLetter::X => region.x_flare_probability,
    }
}

/// Ranking score used to pick among candidate regions.
pub fn region_score(region: &ActiveRegion) -> f64 {
    let complex = if region.is_complex() { 1.0 } else { 0.0 };
    complex * 1000.0
        + region.area
        + region.c_flare_probability
        + 10.0 * region.m_flare_probability
        + 100.0 * region.x_flare_probability
}

/// Highest-scoring region; the first one wins on exact ties.
fn best_by_score<'a>(regions: impl Iterator<Item = &'a ActiveRegion>) -> Option<&'a ActiveRegion> {
    let mut best: Option<(&ActiveRegion, f64)> = None;
    for region in regions {
        let score = region_score(region);
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((region, score)),
        }
    }
    best.map(|(region, _)| region)
}

/// Picks a source region for a flare of class `letter` seen on `day`.
///
/// Candidates are the regions observed that day; when none were, the
/// currently active regions stand in.
pub fn attribute_region<'a>(
    letter: Option<FlareLetter>,
    day: Option<NaiveDate>,
    regions: &'a [ActiveRegion],
) -> Option<(&'a ActiveRegion, Attribution)> {
    let same_day: Vec<&ActiveRegion> = match day {
        Some(d) => regions.iter().filter(|r| r.observed == Some(d)).collect(),
        None => Vec::new(),
    };
    let candidates = if same_day.is_empty() {
        regions.iter().filter(|r| r.is_active()).collect()
    } else {
        same_day
    };
    if candidates.is_empty() {
        return None;
    }

    if let Some(letter) = letter {
        if let Some(region) =
            best_by_score(candidates.iter().copied().filter(|r| event_count(r, letter) > 0))
        {
            return Some((region, Attribution::EventHistory));
        }
        if let Some(threshold) = probability_threshold(letter) {
            if let Some(region) = best_by_score(
                candidates
                    .iter()
                    .copied()
                    .filter(|r| flare_probability(r, letter) >= threshold),
            ) {
                return Some((region, Attribution::Probability));
            }
        }
    }

    best_by_score(candidates.into_iter()).map(|region| (region, Attribution::ComplexityScore))
}

// ---------------------------------------------------------------------------
// Catalog analysis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlareActivity {
    pub counts_24h: ClassCounts,
    pub counts_3d: ClassCounts,
    pub recent_flares: Vec<FlareEvent>,
    pub activity_level: ActivityLevel,
    pub data_source: &'static str,
}

impl FlareActivity {
    /// Result when the flare catalog could not be fetched.
    pub fn unavailable() -> Self {
        Self {
            counts_24h: ClassCounts::default(),
            counts_3d: ClassCounts::default(),
            recent_flares: Vec::new(),
            activity_level: ActivityLevel::Unknown,
            data_source: "None",
        }
    }
}

fn time_tag(point: &TimePoint, names: &[&str]) -> Option<DateTime<Utc>> {
    names
        .iter()
        .find_map(|name| point.tag(name))
        .and_then(parse_timestamp)
}

/// Reads one catalog row. Rows without a class are skipped.
pub fn flare_from_point(point: &TimePoint) -> Option<FlareEvent> {
    let class = point
        .tag("max_class")
        .or_else(|| point.tag("class_type"))
        .filter(|c| !c.is_empty())?
        .to_string();
    let region = point.value("region").filter(|v| *v > 0.0).map(|v| v as u32);

    Some(FlareEvent {
        letter: FlareLetter::from_class(&class),
        class,
        begin: time_tag(point, &["begin_time"]),
        peak: time_tag(point, &["max_time", "peak_time"]),
        end: time_tag(point, &["end_time"]),
        attribution: if region.is_some() {
            Attribution::Reported
        } else {
            Attribution::Unattributed
        },
        region,
        location: point.tag("location").unwrap_or_default().to_string(),
        intensity: point
            .value("max_xrlong")
            .or_else(|| point.value("peak_flux"))
            .unwrap_or(0.0),
    })
}

/// Counts, attributes and ranks the flares in `catalog` relative to `now`.
pub fn analyze_flares(catalog: &Series, regions: &[ActiveRegion], now: DateTime<Utc>) -> FlareActivity {
    let day_cutoff = now - Duration::hours(24);
    let multi_day_cutoff = now - Duration::hours(MULTI_DAY_HOURS);

    let mut counts_24h = ClassCounts::default();
    let mut counts_3d = ClassCounts::default();
    let mut flares = Vec::new();

    for point in &catalog.points {
        let Some(mut flare) = flare_from_point(point) else {
            continue;
        };

        if let (Some(letter), Some(at)) = (flare.letter, flare.reference_time()) {
            if at > day_cutoff {
                counts_24h.record(letter);
            }
            if at > multi_day_cutoff {
                counts_3d.record(letter);
            }
        }

        if flare.region.is_none() {
            let day = flare.reference_time().map(|t| t.date_naive());
            match attribute_region(flare.letter, day, regions) {
                Some((region, attribution)) => {
                    flare.region = region.id;
                    flare.attribution = attribution;
                    if flare.location.is_empty() {
                        flare.location = region.location.clone();
                    }
                }
                None => flare.attribution = Attribution::Unattributed,
            }
        }

        flares.push(flare);
    }

    // Stable sort: equal times keep feed order.
    flares.sort_by(|a, b| b.reference_time().cmp(&a.reference_time()));
    flares.truncate(LISTED_FLARES);

    FlareActivity {
        activity_level: classify_activity(&counts_24h),
        counts_24h,
        counts_3d,
        recent_flares: flares,
        data_source: DATA_SOURCE,
    }
}
