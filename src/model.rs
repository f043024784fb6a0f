/// Core data types for the space-weather monitoring service.
///
/// This module defines the shared domain model imported by all other modules:
/// normalized time series, solar regions and flares, forecast days, alerts,
/// and the error types raised at the feed and service boundaries.
/// It contains no I/O.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Time series
// ---------------------------------------------------------------------------

/// One sample of a feed after normalization.
///
/// Numeric columns land in `fields`; a value that is absent, `null`, or not
/// a finite number is stored as `None` ("missing"). Non-numeric strings are
/// additionally kept in `tags` so label columns (energy channel, magnetic
/// class, flare class) survive normalization.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimePoint {
    pub timestamp: Option<DateTime<Utc>>,
    pub fields: BTreeMap<String, Option<f64>>,
    pub tags: BTreeMap<String, String>,
}

impl TimePoint {
    /// Numeric value of a field, `None` when absent or missing.
    pub fn value(&self, name: &str) -> Option<f64> {
        self.fields.get(name).copied().flatten()
    }

    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(String::as_str)
    }
}

/// Ordered sequence of samples, in source order (chronological ascending).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Series {
    pub points: Vec<TimePoint>,
}

impl Series {
    pub fn new(points: Vec<TimePoint>) -> Self {
        Self { points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// The last sample in source order.
    pub fn latest(&self) -> Option<&TimePoint> {
        self.points.last()
    }

    /// The trailing `n` samples (fewer if the series is shorter).
    pub fn tail(&self, n: usize) -> &[TimePoint] {
        let start = self.points.len().saturating_sub(n);
        &self.points[start..]
    }

    /// Samples whose tag `name` equals `value`, preserving order.
    pub fn filter_tag(&self, name: &str, value: &str) -> Series {
        Series::new(
            self.points
                .iter()
                .filter(|p| p.tag(name) == Some(value))
                .cloned()
                .collect(),
        )
    }

    /// Latest timestamp present anywhere in the series.
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.points.iter().filter_map(|p| p.timestamp).max()
    }
}

// ---------------------------------------------------------------------------
// Solar regions and flares
// ---------------------------------------------------------------------------

/// A numbered sunspot region as reported on one observation day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveRegion {
    #[serde(rename = "number")]
    pub id: Option<u32>,
    pub location: String,
    pub area: f64,
    #[serde(rename = "class")]
    pub magnetic_class: String,
    #[serde(rename = "spots")]
    pub spot_count: u32,
    #[serde(skip)]
    pub status: String,
    #[serde(skip)]
    pub observed: Option<NaiveDate>,
    #[serde(skip)]
    pub c_xray_events: u32,
    #[serde(skip)]
    pub m_xray_events: u32,
    #[serde(skip)]
    pub x_xray_events: u32,
    #[serde(skip)]
    pub c_flare_probability: f64,
    #[serde(skip)]
    pub m_flare_probability: f64,
    #[serde(skip)]
    pub x_flare_probability: f64,
}

impl ActiveRegion {
    /// Magnetically complex: class mentions beta-gamma (incl. beta-gamma-delta)
    /// or delta. Case-insensitive substring match.
    pub fn is_complex(&self) -> bool {
        let class = self.magnetic_class.to_ascii_lowercase();
        ["beta-gamma", "beta-gamma-delta", "delta"]
            .iter()
            .any(|c| class.contains(c))
    }

    pub fn is_active(&self) -> bool {
        self.status == "active"
    }

    /// Regions larger than this many millionths of a hemisphere count as large.
    pub const LARGE_AREA: f64 = 500.0;

    pub fn is_large(&self) -> bool {
        self.area > Self::LARGE_AREA
    }
}

/// GOES flare class letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum FlareLetter {
    B,
    C,
    M,
    X,
}

impl FlareLetter {
    /// Parses the leading letter of a class string like "M1.4".
    /// A-class and unrecognised strings yield `None`.
    pub fn from_class(class: &str) -> Option<Self> {
        match class.trim().chars().next()?.to_ascii_uppercase() {
            'B' => Some(FlareLetter::B),
            'C' => Some(FlareLetter::C),
            'M' => Some(FlareLetter::M),
            'X' => Some(FlareLetter::X),
            _ => None,
        }
    }
}

/// How a flare's source region was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribution {
    /// The catalog named the region.
    Reported,
    /// Region's historical event count for the flare's class is non-zero.
    EventHistory,
    /// Region's flare probability for the class meets the tier threshold.
    Probability,
    /// Highest complexity/area/probability score among candidates.
    ComplexityScore,
    /// No candidate region.
    Unattributed,
}

/// A flare from the catalog, with its best-effort source region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlareEvent {
    pub class: String,
    #[serde(skip)]
    pub letter: Option<FlareLetter>,
    pub begin: Option<DateTime<Utc>>,
    pub peak: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub region: Option<u32>,
    pub attribution: Attribution,
    pub location: String,
    pub intensity: f64,
}

impl FlareEvent {
    /// Peak time, falling back to begin time.
    pub fn reference_time(&self) -> Option<DateTime<Utc>> {
        self.peak.or(self.begin)
    }
}

// ---------------------------------------------------------------------------
// Forecast and alerts
// ---------------------------------------------------------------------------

/// Storm outlook for one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub storm_probability: f64,
    pub expected_kp: u8,
    #[serde(rename = "expected_conditions")]
    pub condition_label: &'static str,
}

/// Alert severity, in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Warning,
    Alert,
    Severe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    SolarWind,
    MagneticField,
    GeomagneticStorm,
    SustainedSouthward,
}

/// A threshold breach detected in the current conditions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub level: AlertLevel,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// X-ray classification
// ---------------------------------------------------------------------------

/// Flare class implied by a long-channel X-ray flux.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XrayClass {
    A,
    B,
    C,
    M,
    X,
    /// Flux at or above 1e-4 W/m², carrying the integer multiple of 1e-4.
    XMultiple(u32),
    Unknown,
}

impl fmt::Display for XrayClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XrayClass::A => write!(f, "A-class"),
            XrayClass::B => write!(f, "B-class"),
            XrayClass::C => write!(f, "C-class"),
            XrayClass::M => write!(f, "M-class"),
            XrayClass::X => write!(f, "X-class"),
            XrayClass::XMultiple(n) => write!(f, "X{}-class", n),
            XrayClass::Unknown => write!(f, "Unknown"),
        }
    }
}

impl Serialize for XrayClass {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when fetching or decoding an upstream feed.
///
/// These never cross the feed boundary: `FeedSource::fetch` logs them and
/// hands callers `None`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FeedError {
    /// Non-2xx HTTP response.
    #[error("HTTP error: {0}")]
    Http(u16),
    #[error("request timed out")]
    Timeout,
    /// Connection, DNS or TLS failure.
    #[error("transport error: {0}")]
    Transport(String),
    /// The body was not valid JSON.
    #[error("parse error: {0}")]
    Parse(String),
    /// Valid JSON, but not the shape declared for the feed.
    #[error("unexpected shape for {feed}: expected {expected}")]
    Shape { feed: String, expected: &'static str },
}

/// Errors surfaced by the downstream operations for unknown request variants.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceError {
    #[error("Unknown satellite type: {0}")]
    UnknownSatellite(String),
    #[error("Unknown analysis type: {0}")]
    UnknownAnalysisType(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
