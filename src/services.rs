/// Downstream operations consumed by the transport layer.
///
/// `SpaceWeatherService` owns one feed source for the process lifetime and
/// builds every report fresh per call. Feed failures are already logged by
/// the source; here they only degrade the affected metric to its default.
/// Unknown request variants come back as `ServiceError`.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::alert::stalenesses::is_stale_at;
use crate::alert::thresholds::{AlertInputs, evaluate_alerts_at};
use crate::analysis::flares::{FlareActivity, analyze_flares};
use crate::analysis::indices::{SolarIndices, extract_indices};
use crate::analysis::magnetometer::{
    GeomagneticMetrics, ImfMetrics, MagneticSnapshot, extract_geomagnetic, extract_imf,
    magnetic_snapshot,
};
use crate::analysis::protons::{ProtonMetrics, extract_protons};
use crate::analysis::regions::{SunspotAnalysis, analyze_sunspots, parse_regions};
use crate::analysis::solar_wind::{
    PlasmaSnapshot, extract_solar_wind, plasma_snapshot, propagation_time_minutes,
};
use crate::analysis::xray::{XrayMetrics, extract_xray};
use crate::config::Config;
use crate::feeds::Feed;
use crate::imaging::{ImageAnalyzer, ImageReport, NoImageSupport, RasterAnalyzer};
use crate::ingest::FeedSource;
use crate::logging::{self, Source};
use crate::model::{Alert, Series, ServiceError};
use crate::risk::{
    Assessment, CurrentConditions, ForecastReport, SolarRotation, assess, generate_forecast_at,
    solar_rotation, validate_forecast_days,
};

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionsReport {
    pub timestamp: DateTime<Utc>,
    pub solar_indices: SolarIndices,
    pub sunspot_analysis: SunspotAnalysis,
    pub flare_activity: FlareActivity,
    pub overall_assessment: Assessment,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoesReport {
    pub xray: XrayMetrics,
    pub proton: ProtonMetrics,
    pub magnetometer: GeomagneticMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AceReport {
    pub plasma: PlasmaSnapshot,
    pub magnetic: MagneticSnapshot,
    pub propagation_time_minutes: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SatelliteReport {
    Goes(GoesReport),
    Ace(AceReport),
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Counts feed outcomes for one operation's summary log line.
struct FetchTally<'a> {
    operation: &'a str,
    total: usize,
    successful: usize,
}

impl<'a> FetchTally<'a> {
    fn new(operation: &'a str) -> Self {
        Self {
            operation,
            total: 0,
            successful: 0,
        }
    }

    fn finish(self) {
        logging::log_fetch_summary(self.operation, self.total, self.successful);
    }
}

pub struct SpaceWeatherService<S: FeedSource> {
    source: S,
    imaging: Box<dyn ImageAnalyzer>,
    stale_after_minutes: u64,
}

impl<S: FeedSource> SpaceWeatherService<S> {
    pub fn new(source: S, imaging: Box<dyn ImageAnalyzer>, stale_after_minutes: u64) -> Self {
        Self {
            source,
            imaging,
            stale_after_minutes,
        }
    }

    /// Picks the image capability and staleness threshold from `config`.
    pub fn from_config(source: S, config: &Config) -> Self {
        let imaging: Box<dyn ImageAnalyzer> = if config.imaging.enabled {
            Box::new(RasterAnalyzer)
        } else {
            Box::new(NoImageSupport)
        };
        Self::new(source, imaging, config.monitoring.stale_after_minutes)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetches one feed, warning when its latest sample is stale.
    fn series(&self, feed: Feed, now: DateTime<Utc>, tally: &mut FetchTally) -> Option<Series> {
        tally.total += 1;
        let series = self.source.fetch_series(feed)?;
        tally.successful += 1;

        if let Some(latest) = series.latest().filter(|_| feed.is_realtime()) {
            if is_stale_at(latest, self.stale_after_minutes, now) {
                logging::warn(
                    Source::Swpc,
                    Some(feed.id()),
                    &format!(
                        "latest sample is older than {} minutes ({})",
                        self.stale_after_minutes,
                        latest
                            .timestamp
                            .map(|t| t.to_rfc3339())
                            .unwrap_or_else(|| "no timestamp".to_string())
                    ),
                );
            }
        }
        Some(series)
    }

    // -- Solar conditions ----------------------------------------------------

    pub fn analyze_current_conditions(&self) -> ConditionsReport {
        self.analyze_current_conditions_at(Utc::now())
    }

    pub fn analyze_current_conditions_at(&self, now: DateTime<Utc>) -> ConditionsReport {
        let mut tally = FetchTally::new("current conditions");

        let solar_indices = self
            .series(Feed::SolarIndices, now, &mut tally)
            .map(|s| extract_indices(&s))
            .unwrap_or_default();
        let regions = self
            .series(Feed::SolarRegions, now, &mut tally)
            .map(|s| parse_regions(&s))
            .unwrap_or_default();
        let flare_activity = match self.series(Feed::FlareCatalog, now, &mut tally) {
            Some(catalog) => analyze_flares(&catalog, &regions, now),
            None => FlareActivity::unavailable(),
        };
        tally.finish();

        let sunspot_analysis = analyze_sunspots(&regions);
        let overall_assessment = assess(&solar_indices, &sunspot_analysis, &flare_activity);

        ConditionsReport {
            timestamp: now,
            solar_indices,
            sunspot_analysis,
            flare_activity,
            overall_assessment,
        }
    }

    // -- Satellite views -----------------------------------------------------

    pub fn fetch_latest_data(&self, satellite: &str) -> Result<SatelliteReport, ServiceError> {
        self.fetch_latest_data_at(satellite, Utc::now())
    }

    pub fn fetch_latest_data_at(
        &self,
        satellite: &str,
        now: DateTime<Utc>,
    ) -> Result<SatelliteReport, ServiceError> {
        match satellite.to_ascii_lowercase().as_str() {
            "goes" => {
                let mut tally = FetchTally::new("goes data");
                let xray = self.series(Feed::XrayFlux, now, &mut tally);
                let proton = self.series(Feed::ProtonFlux, now, &mut tally);
                let magnetometer = self.series(Feed::GoesMagnetometer, now, &mut tally);
                tally.finish();

                Ok(SatelliteReport::Goes(GoesReport {
                    xray: xray.map(|s| extract_xray(&s)).unwrap_or_default(),
                    proton: proton.map(|s| extract_protons(&s)).unwrap_or_default(),
                    magnetometer: magnetometer
                        .map(|s| extract_geomagnetic(&s))
                        .unwrap_or_default(),
                }))
            }
            "ace" => {
                let mut tally = FetchTally::new("ace data");
                let plasma = self
                    .series(Feed::AcePlasma, now, &mut tally)
                    .map(|s| plasma_snapshot(&s))
                    .unwrap_or_default();
                let magnetic = self
                    .series(Feed::AceMag, now, &mut tally)
                    .map(|s| magnetic_snapshot(&s))
                    .unwrap_or_default();
                tally.finish();

                Ok(SatelliteReport::Ace(AceReport {
                    propagation_time_minutes: propagation_time_minutes(plasma.current_speed),
                    plasma,
                    magnetic,
                }))
            }
            _ => Err(ServiceError::UnknownSatellite(satellite.to_string())),
        }
    }

    // -- Forecast and alerts -------------------------------------------------

    /// Current L1 plasma and field, shared by the forecast and the alerts.
    fn l1_conditions(&self, operation: &str, now: DateTime<Utc>) -> (CurrentConditions, ImfMetrics) {
        let mut tally = FetchTally::new(operation);
        let wind = self
            .series(Feed::SolarWindPlasma, now, &mut tally)
            .map(|s| extract_solar_wind(&s))
            .unwrap_or_default();
        let imf = self
            .series(Feed::SolarWindMag, now, &mut tally)
            .map(|s| extract_imf(&s))
            .unwrap_or_default();
        tally.finish();

        (CurrentConditions::new(wind.current_speed, imf.current_bz), imf)
    }

    pub fn generate_forecast(&self, days: u32) -> Result<ForecastReport, ServiceError> {
        self.generate_forecast_at(days, Utc::now())
    }

    /// Rejects an out-of-range horizon before any feed is fetched.
    pub fn generate_forecast_at(
        &self,
        days: u32,
        now: DateTime<Utc>,
    ) -> Result<ForecastReport, ServiceError> {
        validate_forecast_days(days)?;
        let (conditions, _) = self.l1_conditions("forecast", now);
        generate_forecast_at(days, conditions, now)
    }

    pub fn check_alerts(&self) -> Vec<Alert> {
        self.check_alerts_at(Utc::now())
    }

    pub fn check_alerts_at(&self, now: DateTime<Utc>) -> Vec<Alert> {
        let (conditions, imf) = self.l1_conditions("alerts", now);
        let inputs = AlertInputs {
            speed: conditions.solar_wind_speed,
            bz: conditions.bz_component,
            dst: conditions.dst_index,
            southward_duration_minutes: imf.southward_duration_minutes,
        };

        let alerts = evaluate_alerts_at(&inputs, now);
        for alert in &alerts {
            logging::info(Source::System, None, &format!("alert raised: {}", alert.message));
        }
        alerts
    }

    // -- Images and rotation -------------------------------------------------

    pub fn analyze_image(&self, url: &str, analysis_type: &str) -> Result<ImageReport, ServiceError> {
        self.analyze_image_at(url, analysis_type, Utc::now())
    }

    pub fn analyze_image_at(
        &self,
        url: &str,
        analysis_type: &str,
        now: DateTime<Utc>,
    ) -> Result<ImageReport, ServiceError> {
        if !analysis_type.eq_ignore_ascii_case("solar") {
            return Err(ServiceError::UnknownAnalysisType(analysis_type.to_string()));
        }
        if !self.imaging.is_available() {
            return Ok(ImageReport::unavailable());
        }

        let bytes = match self.source.fetch_bytes(url) {
            Ok(bytes) => bytes,
            Err(e) => {
                logging::warn(Source::Imaging, None, &format!("fetch {} failed: {}", url, e));
                return Ok(ImageReport::failed(e));
            }
        };

        match self.imaging.analyze(&bytes, now) {
            Ok(analysis) => Ok(ImageReport::Completed(analysis)),
            Err(e) => {
                logging::warn(Source::Imaging, None, &format!("analysis of {} failed: {}", url, e));
                Ok(ImageReport::failed(e))
            }
        }
    }

    pub fn solar_rotation(&self, latitude: f64) -> SolarRotation {
        solar_rotation(latitude)
    }
}
