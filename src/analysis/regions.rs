//! Sunspot region parsing and flare-potential assessment.

use std::fmt;

use serde::Serialize;

use crate::model::{ActiveRegion, Series, TimePoint};

/// Active regions listed in the report.
const LISTED_REGIONS: usize = 5;

fn count(point: &TimePoint, field: &str) -> u32 {
    point
        .value(field)
        .filter(|v| *v >= 0.0)
        .map(|v| v as u32)
        .unwrap_or(0)
}

/// Builds a region from one row of the regions feed.
pub fn region_from_point(point: &TimePoint) -> ActiveRegion {
    ActiveRegion {
        id: point.value("region").filter(|v| *v > 0.0).map(|v| v as u32),
        location: point.tag("location").unwrap_or_default().to_string(),
        area: point.value("area").unwrap_or(0.0),
        magnetic_class: point.tag("mag_class").unwrap_or_default().to_string(),
        spot_count: count(point, "number_spots"),
        status: point.tag("status").unwrap_or_default().to_string(),
        observed: point.timestamp.map(|t| t.date_naive()),
        c_xray_events: count(point, "c_xray_events"),
        m_xray_events: count(point, "m_xray_events"),
        x_xray_events: count(point, "x_xray_events"),
        c_flare_probability: point.value("c_flare_probability").unwrap_or(0.0),
        m_flare_probability: point.value("m_flare_probability").unwrap_or(0.0),
        x_flare_probability: point.value("x_flare_probability").unwrap_or(0.0),
    }
}

pub fn parse_regions(series: &Series) -> Vec<ActiveRegion> {
    series.points.iter().map(region_from_point).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FlarePotential {
    #[serde(rename = "Very Low")]
    VeryLow,
    Low,
    #[serde(rename = "Low-Moderate")]
    LowModerate,
    Moderate,
    High,
}

impl fmt::Display for FlarePotential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FlarePotential::VeryLow => "Very Low",
            FlarePotential::Low => "Low",
            FlarePotential::LowModerate => "Low-Moderate",
            FlarePotential::Moderate => "Moderate",
            FlarePotential::High => "High",
        };
        f.write_str(label)
    }
}

/// Flare potential from the counts of complex and large active regions.
pub fn assess_flare_potential(active: &[&ActiveRegion]) -> FlarePotential {
    if active.is_empty() {
        return FlarePotential::VeryLow;
    }

    let complex = active.iter().filter(|r| r.is_complex()).count();
    let large = active.iter().filter(|r| r.is_large()).count();

    if complex >= 2 || large >= 3 {
        FlarePotential::High
    } else if complex >= 1 || large >= 2 {
        FlarePotential::Moderate
    } else if active.len() >= 5 {
        FlarePotential::LowModerate
    } else {
        FlarePotential::Low
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SunspotAnalysis {
    pub total_regions: usize,
    pub complex_regions: usize,
    pub large_regions: usize,
    pub regions: Vec<ActiveRegion>,
    pub flare_potential: FlarePotential,
}

impl Default for SunspotAnalysis {
    fn default() -> Self {
        Self {
            total_regions: 0,
            complex_regions: 0,
            large_regions: 0,
            regions: Vec::new(),
            flare_potential: FlarePotential::VeryLow,
        }
    }
}

pub fn analyze_sunspots(regions: &[ActiveRegion]) -> SunspotAnalysis {
    let active: Vec<&ActiveRegion> = regions.iter().filter(|r| r.is_active()).collect();

    SunspotAnalysis {
        total_regions: active.len(),
        complex_regions: active.iter().filter(|r| r.is_complex()).count(),
        large_regions: active.iter().filter(|r| r.is_large()).count(),
        regions: active.iter().take(LISTED_REGIONS).map(|r| (*r).clone()).collect(),
        flare_potential: assess_flare_potential(&active),
    }
}
