//! Observed solar-cycle indices (F10.7 radio flux and sunspot number).

use serde::Serialize;

use crate::model::Series;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SolarIndices {
    #[serde(rename = "f10.7")]
    pub f107: Option<f64>,
    #[serde(rename = "smoothed_f10.7")]
    pub smoothed_f107: Option<f64>,
    pub sunspot_number: Option<f64>,
    pub smoothed_ssn: Option<f64>,
    /// Month of the record, `YYYY-MM`.
    pub date: Option<String>,
}

/// Indices from the most recent monthly record.
pub fn extract_indices(series: &Series) -> SolarIndices {
    let Some(latest) = series.latest() else {
        return SolarIndices::default();
    };

    SolarIndices {
        f107: latest.value("f10.7"),
        smoothed_f107: latest.value("smoothed_f10.7"),
        sunspot_number: latest.value("ssn"),
        smoothed_ssn: latest.value("smoothed_ssn"),
        date: latest.timestamp.map(|t| t.format("%Y-%m").to_string()),
    }
}
