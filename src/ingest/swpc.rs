/// SWPC (NOAA Space Weather Prediction Center) Data Client
///
/// Retrieves real-time solar wind, GOES particle/X-ray/magnetometer and solar
/// region products from the SWPC JSON services.
///
/// Service index: https://services.swpc.noaa.gov/
///
/// One client is built per process and shared by every operation; requests
/// carry a bounded timeout and are never retried.

use std::time::Duration;

use crate::config::FeedConfig;
use crate::feeds::{Feed, feed_url};
use crate::ingest::{FeedPayload, FeedSource};
use crate::logging::{self, Source};
use crate::model::FeedError;

pub const SWPC_BASE_URL: &str = "https://services.swpc.noaa.gov";

/// Nominal per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// Client
// ============================================================================

pub struct SwpcClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl SwpcClient {
    /// Builds the long-lived HTTP client.
    pub fn new(config: &FeedConfig) -> Result<Self, FeedError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| FeedError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get_text(&self, url: &str) -> Result<String, FeedError> {
        let response = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .send()
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            return Err(FeedError::Http(response.status().as_u16()));
        }

        response.text().map_err(map_transport_error)
    }
}

fn map_transport_error(err: reqwest::Error) -> FeedError {
    if err.is_timeout() {
        FeedError::Timeout
    } else {
        FeedError::Transport(err.to_string())
    }
}

impl FeedSource for SwpcClient {
    fn fetch_payload(&self, feed: Feed) -> Result<FeedPayload, FeedError> {
        let url = feed_url(&self.base_url, feed);
        logging::debug(Source::Swpc, Some(feed.id()), &format!("GET {}", url));

        let body = self.get_text(&url)?;
        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| FeedError::Parse(e.to_string()))?;

        let spec = feed.spec();
        FeedPayload::from_json(spec.id, spec.shape, value)
    }

    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FeedError> {
        let response = self.http.get(url).send().map_err(map_transport_error)?;

        if !response.status().is_success() {
            return Err(FeedError::Http(response.status().as_u16()));
        }

        let bytes = response.bytes().map_err(map_transport_error)?;
        Ok(bytes.to_vec())
    }
}

// ============================================================================
// Tests
// ============================================================================
