//! Risk and classification engine.
//!
//! Combines extractor outputs into derived indices: an estimated Dst, a
//! per-day storm outlook, the overall solar assessment and the
//! latitude-dependent rotation rate. These are documented empirical
//! heuristics, not physical models. Every function is pure; callers pass the
//! clock in.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::analysis::flares::{ActivityLevel, FlareActivity};
use crate::analysis::indices::SolarIndices;
use crate::analysis::regions::{FlarePotential, SunspotAnalysis};
use crate::analysis::solar_wind::DEFAULT_SPEED_KM_S;
use crate::analysis::stats::round_to;
use crate::model::{ForecastDay, ServiceError};

// ---------------------------------------------------------------------------
// Dst and storm probability
// ---------------------------------------------------------------------------

/// Dst floor reported while the field points north.
pub const QUIET_DST: f64 = -2.0;

/// Upper bound on the daily storm probability.
pub const MAX_STORM_PROBABILITY: f64 = 0.95;

pub const DEFAULT_FORECAST_DAYS: u32 = 3;

/// Longest outlook accepted, one solar rotation.
pub const MAX_FORECAST_DAYS: u32 = 27;

/// Estimated Dst (nT) from solar-wind speed and IMF Bz.
///
/// A missing speed counts as 400 km/s and a missing Bz as 0, which lands on
/// the quiet floor.
pub fn estimate_dst(speed: Option<f64>, bz: Option<f64>) -> f64 {
    let bz = bz.unwrap_or(0.0);
    if bz >= 0.0 {
        return QUIET_DST;
    }
    let speed = speed.unwrap_or(DEFAULT_SPEED_KM_S).max(0.0);
    -20.0 * (speed / DEFAULT_SPEED_KM_S).sqrt() * bz.abs()
}

/// Inputs shared by every forecast day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurrentConditions {
    pub solar_wind_speed: Option<f64>,
    pub bz_component: Option<f64>,
    pub dst_index: f64,
}

impl CurrentConditions {
    pub fn new(solar_wind_speed: Option<f64>, bz_component: Option<f64>) -> Self {
        Self {
            solar_wind_speed,
            bz_component,
            dst_index: estimate_dst(solar_wind_speed, bz_component),
        }
    }
}

/// Storm probability, clamped to `MAX_STORM_PROBABILITY`.
pub fn storm_probability(conditions: &CurrentConditions) -> f64 {
    let mut probability: f64 = 0.1;
    if conditions.solar_wind_speed.unwrap_or(0.0) > 600.0 {
        probability += 0.3;
    }
    if conditions.bz_component.unwrap_or(0.0) < -10.0 {
        probability += 0.4;
    }
    if conditions.dst_index < -50.0 {
        probability += 0.2;
    }
    probability.min(MAX_STORM_PROBABILITY)
}

pub fn estimate_kp(probability: f64) -> u8 {
    if probability < 0.2 {
        3
    } else if probability < 0.4 {
        4
    } else if probability < 0.6 {
        5
    } else if probability < 0.8 {
        6
    } else {
        7
    }
}

pub fn condition_label(probability: f64) -> &'static str {
    if probability < 0.2 {
        "Quiet to unsettled"
    } else if probability < 0.4 {
        "Active conditions likely"
    } else if probability < 0.6 {
        "Minor storm possible"
    } else if probability < 0.8 {
        "Moderate storm likely"
    } else {
        "Strong storm expected"
    }
}

// ---------------------------------------------------------------------------
// Forecast
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastReport {
    pub forecast_period: String,
    pub generated_at: DateTime<Utc>,
    pub current_conditions: CurrentConditions,
    pub predictions: Vec<ForecastDay>,
}

pub fn validate_forecast_days(days: u32) -> Result<(), ServiceError> {
    if days > MAX_FORECAST_DAYS {
        return Err(ServiceError::InvalidRequest(format!(
            "forecast horizon {} days exceeds the maximum of {}",
            days, MAX_FORECAST_DAYS
        )));
    }
    Ok(())
}

/// One outlook per day offset `1..=days` from `now`.
///
/// Days do not influence each other; each uses the same current conditions.
/// Horizons beyond `MAX_FORECAST_DAYS`, or dates past the calendar's end, are
/// rejected as `InvalidRequest`.
pub fn generate_forecast_at(
    days: u32,
    conditions: CurrentConditions,
    now: DateTime<Utc>,
) -> Result<ForecastReport, ServiceError> {
    validate_forecast_days(days)?;

    let probability = storm_probability(&conditions);

    let predictions = (1..=days)
        .map(|offset| {
            let date = now
                .checked_add_signed(Duration::days(i64::from(offset)))
                .ok_or_else(|| {
                    ServiceError::InvalidRequest(format!(
                        "forecast day {} after {} is out of range",
                        offset,
                        now.to_rfc3339()
                    ))
                })?;
            Ok(ForecastDay {
                date: date.date_naive(),
                storm_probability: round_to(probability, 2),
                expected_kp: estimate_kp(probability),
                condition_label: condition_label(probability),
            })
        })
        .collect::<Result<Vec<_>, ServiceError>>()?;

    Ok(ForecastReport {
        forecast_period: format!("{} days", days),
        generated_at: now,
        current_conditions: conditions,
        predictions,
    })
}

// ---------------------------------------------------------------------------
// Overall assessment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CyclePhase {
    Minimum,
    #[serde(rename = "Rising/Declining")]
    RisingOrDeclining,
    Maximum,
    Unknown,
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CyclePhase::Minimum => "Minimum",
            CyclePhase::RisingOrDeclining => "Rising/Declining",
            CyclePhase::Maximum => "Maximum",
            CyclePhase::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

pub fn classify_cycle_phase(sunspot_number: Option<f64>) -> CyclePhase {
    match sunspot_number {
        None => CyclePhase::Unknown,
        Some(ssn) if ssn < 30.0 => CyclePhase::Minimum,
        Some(ssn) if ssn < 80.0 => CyclePhase::RisingOrDeclining,
        Some(_) => CyclePhase::Maximum,
    }
}

/// Advisory summary; the text is not consumed numerically anywhere.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub solar_cycle_phase: CyclePhase,
    pub activity_trend: &'static str,
    pub forecast_confidence: &'static str,
    pub key_risks: Vec<String>,
    pub recommendations: Vec<String>,
}

pub fn assess(
    indices: &SolarIndices,
    sunspots: &SunspotAnalysis,
    flares: &FlareActivity,
) -> Assessment {
    let mut key_risks = Vec::new();
    let mut recommendations = Vec::new();

    if matches!(
        flares.activity_level,
        ActivityLevel::High | ActivityLevel::VeryHigh
    ) {
        key_risks.push("Elevated risk of radio blackouts".to_string());
        recommendations.push("Monitor HF radio communications".to_string());
    }

    if matches!(
        sunspots.flare_potential,
        FlarePotential::High | FlarePotential::Moderate
    ) {
        key_risks.push(format!(
            "{} potential for significant flares",
            sunspots.flare_potential
        ));
        recommendations.push("Prepare for possible geomagnetic disturbances".to_string());
    }

    if sunspots.complex_regions > 0 {
        key_risks.push(format!(
            "{} magnetically complex regions present",
            sunspots.complex_regions
        ));
    }

    Assessment {
        solar_cycle_phase: classify_cycle_phase(indices.sunspot_number),
        activity_trend: "Unknown",
        forecast_confidence: "Medium",
        key_risks,
        recommendations,
    }
}

// ---------------------------------------------------------------------------
// Differential rotation
// ---------------------------------------------------------------------------

/// Earth's orbital motion in degrees per day, subtracted for the synodic period.
const EARTH_ORBIT_DEG_PER_DAY: f64 = 0.9856;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SolarRotation {
    pub latitude: f64,
    pub rotation_rate_deg_per_day: f64,
    pub rotation_period_days: f64,
    pub synodic_period_days: f64,
}

/// Sidereal rotation rate at a heliographic latitude in degrees.
pub fn solar_rotation(latitude: f64) -> SolarRotation {
    let sin2 = latitude.to_radians().sin().powi(2);
    let rate = 14.713 - 2.396 * sin2 - 1.787 * sin2 * sin2;

    SolarRotation {
        latitude,
        rotation_rate_deg_per_day: round_to(rate, 3),
        rotation_period_days: round_to(360.0 / rate, 2),
        synodic_period_days: round_to(360.0 / (rate - EARTH_ORBIT_DEG_PER_DAY), 2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()
    }

    // --- Dst ----------------------------------------------------------------

    #[test]
    fn test_dst_quiet_floor_when_bz_non_negative() {
        assert_eq!(estimate_dst(Some(800.0), Some(0.0)), -2.0);
        assert_eq!(estimate_dst(Some(800.0), Some(5.0)), -2.0);
    }

    #[test]
    fn test_dst_missing_inputs_default_to_quiet() {
        assert_eq!(estimate_dst(None, None), -2.0);
        assert_eq!(CurrentConditions::new(None, None).dst_index, -2.0);
    }

    #[test]
    fn test_dst_formula() {
        assert_relative_eq!(estimate_dst(Some(400.0), Some(-10.0)), -200.0);
        assert_relative_eq!(estimate_dst(None, Some(-10.0)), -200.0);
        assert_relative_eq!(estimate_dst(Some(1600.0), Some(-5.0)), -200.0);
    }

    // --- Storm probability --------------------------------------------------

    #[test]
    fn test_probability_is_clamped() {
        let conditions = CurrentConditions {
            solar_wind_speed: Some(1000.0),
            bz_component: Some(-20.0),
            dst_index: -60.0,
        };
        assert_relative_eq!(storm_probability(&conditions), 0.95);
    }

    #[test]
    fn test_quiet_conditions_give_base_probability() {
        let conditions = CurrentConditions::new(Some(350.0), Some(2.0));
        assert_relative_eq!(storm_probability(&conditions), 0.1);
        assert_eq!(estimate_kp(0.1), 3);
        assert_eq!(condition_label(0.1), "Quiet to unsettled");
    }

    #[test]
    fn test_kp_and_label_breakpoints() {
        assert_eq!(estimate_kp(0.2), 4);
        assert_eq!(estimate_kp(0.4), 5);
        assert_eq!(estimate_kp(0.6), 6);
        assert_eq!(estimate_kp(0.8), 7);
        assert_eq!(condition_label(0.4), "Minor storm possible");
        assert_eq!(condition_label(0.95), "Strong storm expected");
    }

    // --- Forecast -----------------------------------------------------------

    #[test]
    fn test_forecast_has_one_day_per_offset() {
        let conditions = CurrentConditions::new(Some(650.0), Some(-12.0));
        let report = generate_forecast_at(3, conditions, now()).unwrap();

        assert_eq!(report.forecast_period, "3 days");
        assert_eq!(report.predictions.len(), 3);
        assert_eq!(report.predictions[0].date.to_string(), "2024-05-11");
        assert_eq!(report.predictions[2].date.to_string(), "2024-05-13");
        // 0.1 + 0.3 + 0.4 + 0.2 (Dst ~ -306) clamps.
        assert_eq!(report.predictions[0].storm_probability, 0.95);
        assert_eq!(report.predictions[0].expected_kp, 7);
        assert_eq!(report.predictions[1].storm_probability, 0.95);
    }

    #[test]
    fn test_forecast_probability_is_rounded() {
        let conditions = CurrentConditions::new(Some(700.0), None);
        let report = generate_forecast_at(1, conditions, now()).unwrap();
        assert_eq!(report.predictions[0].storm_probability, 0.4);
        assert_eq!(report.predictions[0].condition_label, "Minor storm possible");
    }

    #[test]
    fn test_zero_days_yields_no_predictions() {
        let report = generate_forecast_at(0, CurrentConditions::new(None, None), now()).unwrap();
        assert!(report.predictions.is_empty());
    }

    #[test]
    fn test_forecast_horizon_is_capped() {
        let conditions = CurrentConditions::new(Some(400.0), Some(-5.0));
        let longest = generate_forecast_at(MAX_FORECAST_DAYS, conditions, now()).unwrap();
        assert_eq!(longest.predictions.len(), MAX_FORECAST_DAYS as usize);

        let err = generate_forecast_at(100_000_000, conditions, now()).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidRequest(_)));
        let err = generate_forecast_at(MAX_FORECAST_DAYS + 1, conditions, now()).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidRequest(_)));
    }

    #[test]
    fn test_forecast_past_calendar_end_is_rejected() {
        let conditions = CurrentConditions::new(Some(400.0), Some(-5.0));
        let late = DateTime::<Utc>::MAX_UTC - Duration::hours(1);
        let err = generate_forecast_at(1, conditions, late).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidRequest(_)));
    }

    // --- Assessment ---------------------------------------------------------

    #[test]
    fn test_cycle_phase_breakpoints() {
        assert_eq!(classify_cycle_phase(Some(0.0)), CyclePhase::Minimum);
        assert_eq!(classify_cycle_phase(Some(29.9)), CyclePhase::Minimum);
        assert_eq!(classify_cycle_phase(Some(30.0)), CyclePhase::RisingOrDeclining);
        assert_eq!(classify_cycle_phase(Some(80.0)), CyclePhase::Maximum);
        assert_eq!(classify_cycle_phase(None), CyclePhase::Unknown);
    }

    #[test]
    fn test_assessment_accumulates_risks() {
        let indices = SolarIndices {
            sunspot_number: Some(140.0),
            ..SolarIndices::default()
        };
        let sunspots = SunspotAnalysis {
            complex_regions: 2,
            flare_potential: FlarePotential::High,
            ..SunspotAnalysis::default()
        };
        let mut flares = FlareActivity::unavailable();
        flares.activity_level = ActivityLevel::VeryHigh;

        let assessment = assess(&indices, &sunspots, &flares);
        assert_eq!(assessment.solar_cycle_phase, CyclePhase::Maximum);
        assert_eq!(
            assessment.key_risks,
            vec![
                "Elevated risk of radio blackouts",
                "High potential for significant flares",
                "2 magnetically complex regions present",
            ]
        );
        assert_eq!(assessment.recommendations.len(), 2);
        assert_eq!(assessment.forecast_confidence, "Medium");
    }

    #[test]
    fn test_quiet_assessment_has_no_risks() {
        let assessment = assess(
            &SolarIndices::default(),
            &SunspotAnalysis::default(),
            &FlareActivity::unavailable(),
        );
        assert!(assessment.key_risks.is_empty());
        assert_eq!(assessment.solar_cycle_phase, CyclePhase::Unknown);
    }

    // --- Rotation -----------------------------------------------------------

    #[test]
    fn test_equatorial_rotation() {
        let rotation = solar_rotation(0.0);
        assert_eq!(rotation.rotation_rate_deg_per_day, 14.713);
        assert_eq!(rotation.rotation_period_days, 24.47);
        assert_eq!(rotation.synodic_period_days, 26.22);
    }

    #[test]
    fn test_rotation_slows_toward_poles() {
        let equator = solar_rotation(0.0);
        let mid = solar_rotation(30.0);
        assert!(mid.rotation_rate_deg_per_day < equator.rotation_rate_deg_per_day);
        assert_eq!(solar_rotation(-30.0), SolarRotation { latitude: -30.0, ..mid });
    }
}
