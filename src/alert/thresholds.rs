//! Space-weather threshold checking.
//!
//! Each rule is independent, so several alerts may fire together. Nothing is
//! deduplicated or remembered between calls.

use chrono::{DateTime, Utc};

use crate::model::{Alert, AlertLevel, AlertType};

pub const SOLAR_WIND_SPEED_KM_S: f64 = 700.0;
pub const SOUTHWARD_BZ_NT: f64 = -15.0;
pub const SEVERE_DST_NT: f64 = -100.0;
pub const SUSTAINED_SOUTHWARD_MINUTES: u32 = 180;

/// Current values the alert rules look at.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AlertInputs {
    pub speed: Option<f64>,
    pub bz: Option<f64>,
    pub dst: f64,
    pub southward_duration_minutes: u32,
}

/// Applies every threshold rule, in a fixed order, stamping alerts with `now`.
///
/// Missing speed or Bz never trigger a rule.
pub fn evaluate_alerts_at(inputs: &AlertInputs, now: DateTime<Utc>) -> Vec<Alert> {
    let mut alerts = Vec::new();
    let mut raise = |level, alert_type, message: String| {
        alerts.push(Alert {
            level,
            alert_type,
            message,
            timestamp: now,
        })
    };

    if let Some(speed) = inputs.speed.filter(|s| *s > SOLAR_WIND_SPEED_KM_S) {
        raise(
            AlertLevel::Warning,
            AlertType::SolarWind,
            format!("High solar wind speed detected: {:.1} km/s", speed),
        );
    }

    if let Some(bz) = inputs.bz.filter(|b| *b < SOUTHWARD_BZ_NT) {
        raise(
            AlertLevel::Alert,
            AlertType::MagneticField,
            format!("Strong southward magnetic field: Bz = {:.1} nT", bz),
        );
    }

    if inputs.dst < SEVERE_DST_NT {
        raise(
            AlertLevel::Severe,
            AlertType::GeomagneticStorm,
            format!("Severe geomagnetic storm conditions: Dst = {:.1} nT", inputs.dst),
        );
    }

    if inputs.southward_duration_minutes > SUSTAINED_SOUTHWARD_MINUTES {
        raise(
            AlertLevel::Warning,
            AlertType::SustainedSouthward,
            format!(
                "Sustained southward IMF for {} minutes",
                inputs.southward_duration_minutes
            ),
        );
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 20, 0, 0).unwrap()
    }

    #[test]
    fn test_only_severe_storm_alert() {
        let inputs = AlertInputs {
            speed: Some(500.0),
            bz: Some(-5.0),
            dst: -150.0,
            southward_duration_minutes: 0,
        };
        let alerts = evaluate_alerts_at(&inputs, now());

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].level, AlertLevel::Severe);
        assert_eq!(alerts[0].alert_type, AlertType::GeomagneticStorm);
        assert_eq!(alerts[0].message, "Severe geomagnetic storm conditions: Dst = -150.0 nT");
        assert_eq!(alerts[0].timestamp, now());
    }

    #[test]
    fn test_all_rules_can_fire_together() {
        let inputs = AlertInputs {
            speed: Some(850.5),
            bz: Some(-22.0),
            dst: -300.0,
            southward_duration_minutes: 240,
        };
        let types: Vec<_> = evaluate_alerts_at(&inputs, now())
            .into_iter()
            .map(|a| a.alert_type)
            .collect();
        assert_eq!(
            types,
            vec![
                AlertType::SolarWind,
                AlertType::MagneticField,
                AlertType::GeomagneticStorm,
                AlertType::SustainedSouthward,
            ]
        );
    }

    #[test]
    fn test_thresholds_are_strict() {
        let inputs = AlertInputs {
            speed: Some(700.0),
            bz: Some(-15.0),
            dst: -100.0,
            southward_duration_minutes: 180,
        };
        assert!(evaluate_alerts_at(&inputs, now()).is_empty());
    }

    #[test]
    fn test_missing_inputs_raise_nothing() {
        let inputs = AlertInputs {
            dst: -2.0,
            ..AlertInputs::default()
        };
        assert!(evaluate_alerts_at(&inputs, now()).is_empty());
    }

    #[test]
    fn test_message_embeds_triggering_value() {
        let inputs = AlertInputs {
            speed: Some(812.3),
            dst: -2.0,
            ..AlertInputs::default()
        };
        let alerts = evaluate_alerts_at(&inputs, now());
        assert_eq!(alerts[0].message, "High solar wind speed detected: 812.3 km/s");
        assert_eq!(alerts[0].level, AlertLevel::Warning);
    }

    #[test]
    fn test_whole_values_keep_one_decimal() {
        let inputs = AlertInputs {
            speed: Some(820.0),
            bz: Some(-16.0),
            dst: -2.0,
            ..AlertInputs::default()
        };
        let alerts = evaluate_alerts_at(&inputs, now());
        assert_eq!(alerts[0].message, "High solar wind speed detected: 820.0 km/s");
        assert_eq!(alerts[1].message, "Strong southward magnetic field: Bz = -16.0 nT");
    }
}
