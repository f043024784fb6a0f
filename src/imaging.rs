//! Solar image analysis capability.
//!
//! Image decoding is an optional capability behind the `ImageAnalyzer` trait.
//! `RasterAnalyzer` decodes PNG/JPEG and measures brightness and edges;
//! `NoImageSupport` reports itself unavailable so callers answer with a
//! structured "capability unavailable" result instead of failing.

use chrono::{DateTime, Utc};
use image::GrayImage;
use imageproc::edges::canny;
use serde::Serialize;
use thiserror::Error;

use crate::analysis::stats::{self, round_to};

/// Gray level above which a pixel counts as bright.
const BRIGHT_LEVEL: u8 = 200;

const CANNY_LOW: f32 = 50.0;
const CANNY_HIGH: f32 = 150.0;

/// Fraction of edge pixels above which structure is reported.
const EDGE_FRACTION: f64 = 0.05;

pub const NO_FEATURES: &str = "No significant features detected";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ImagingError {
    #[error("image decode error: {0}")]
    Decode(String),

    #[error("image has no pixels")]
    Empty,

    #[error("image analysis is not available")]
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrightnessStats {
    pub mean: f64,
    pub std: f64,
    pub max: f64,
    pub min: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageAnalysis {
    /// `(width, height)` in pixels.
    pub image_dimensions: (u32, u32),
    pub brightness_analysis: BrightnessStats,
    pub bright_regions_percentage: f64,
    pub potential_features: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// Outcome of an image request, serialized without a tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ImageReport {
    Completed(ImageAnalysis),
    Unavailable { error: String, suggestion: String },
    Failed { error: String },
}

impl ImageReport {
    pub fn unavailable() -> Self {
        ImageReport::Unavailable {
            error: "Image analysis is not available".to_string(),
            suggestion: "Enable imaging in the configuration (SWMON_IMAGING_ENABLED=true)"
                .to_string(),
        }
    }

    pub fn failed(reason: impl std::fmt::Display) -> Self {
        ImageReport::Failed {
            error: format!("Failed to analyze image: {}", reason),
        }
    }
}

pub trait ImageAnalyzer {
    fn is_available(&self) -> bool;

    fn analyze(&self, bytes: &[u8], now: DateTime<Utc>) -> Result<ImageAnalysis, ImagingError>;
}

/// Decodes with `image` and detects edges with `imageproc`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RasterAnalyzer;

impl ImageAnalyzer for RasterAnalyzer {
    fn is_available(&self) -> bool {
        true
    }

    fn analyze(&self, bytes: &[u8], now: DateTime<Utc>) -> Result<ImageAnalysis, ImagingError> {
        let decoded =
            image::load_from_memory(bytes).map_err(|e| ImagingError::Decode(e.to_string()))?;
        let gray = decoded.to_luma8();
        analyze_gray(&gray, now)
    }
}

/// Stand-in used when imaging is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoImageSupport;

impl ImageAnalyzer for NoImageSupport {
    fn is_available(&self) -> bool {
        false
    }

    fn analyze(&self, _bytes: &[u8], _now: DateTime<Utc>) -> Result<ImageAnalysis, ImagingError> {
        Err(ImagingError::Unavailable)
    }
}

/// Brightness statistics and feature hints for a grayscale image.
pub fn analyze_gray(gray: &GrayImage, now: DateTime<Utc>) -> Result<ImageAnalysis, ImagingError> {
    let pixels = gray.as_raw();
    if pixels.is_empty() {
        return Err(ImagingError::Empty);
    }

    let levels: Vec<f64> = pixels.iter().map(|p| f64::from(*p)).collect();
    let brightness = BrightnessStats {
        mean: stats::mean(&levels).unwrap_or(0.0),
        std: stats::population_std_dev(&levels).unwrap_or(0.0),
        max: stats::max(&levels).unwrap_or(0.0),
        min: levels.iter().copied().fold(f64::INFINITY, f64::min),
    };

    let bright = pixels.iter().filter(|p| **p > BRIGHT_LEVEL).count();
    let bright_percentage = bright as f64 / pixels.len() as f64 * 100.0;

    let edges = canny(gray, CANNY_LOW, CANNY_HIGH);
    let edge_count = edges.as_raw().iter().filter(|p| **p > 0).count();
    let edge_fraction = edge_count as f64 / pixels.len() as f64;

    Ok(ImageAnalysis {
        image_dimensions: gray.dimensions(),
        brightness_analysis: brightness,
        bright_regions_percentage: round_to(bright_percentage, 2),
        potential_features: identify_features(bright_percentage, edge_fraction),
        timestamp: now,
    })
}

fn identify_features(bright_percentage: f64, edge_fraction: f64) -> Vec<String> {
    let mut features = Vec::new();
    if bright_percentage > 10.0 {
        features.push("Possible active regions detected".to_string());
    }
    if bright_percentage > 20.0 {
        features.push("Significant bright areas - possible flare activity".to_string());
    }
    if edge_fraction > EDGE_FRACTION {
        features.push("Complex magnetic structures visible".to_string());
    }
    if features.is_empty() {
        features.push(NO_FEATURES.to_string());
    }
    features
}
