/// Offline feed replay.
///
/// When live SWPC data is unavailable (or must be pinned for testing), serve
/// previously captured payloads instead. A replay directory holds one
/// `<feed-id>.json` file per feed; feeds without a file behave exactly like an
/// unreachable upstream.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::feeds::{FEED_REGISTRY, Feed};
use crate::ingest::{FeedPayload, FeedSource};
use crate::logging::{self, Source};
use crate::model::FeedError;

#[derive(Debug, Default, Clone)]
pub struct ReplayFeeds {
    payloads: HashMap<Feed, Value>,
    blobs: HashMap<String, Vec<u8>>,
}

impl ReplayFeeds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every `<feed-id>.json` present in `dir`.
    ///
    /// Unreadable or invalid files are logged and skipped; a missing
    /// directory is an error since it is almost certainly a typo.
    pub fn from_dir(dir: &Path) -> std::io::Result<Self> {
        if !dir.is_dir() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("replay directory {} does not exist", dir.display()),
            ));
        }

        let mut replay = Self::new();
        for spec in &FEED_REGISTRY {
            let path = dir.join(format!("{}.json", spec.id));
            if !path.exists() {
                continue;
            }
            let loaded = fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|text| serde_json::from_str::<Value>(&text).map_err(|e| e.to_string()));
            match loaded {
                Ok(value) => {
                    replay.payloads.insert(spec.feed, value);
                }
                Err(e) => logging::warn(
                    Source::System,
                    Some(spec.id),
                    &format!("skipping replay file {}: {}", path.display(), e),
                ),
            }
        }

        logging::info(
            Source::System,
            None,
            &format!("replaying {} feeds from {}", replay.payloads.len(), dir.display()),
        );
        Ok(replay)
    }

    pub fn with_feed(mut self, feed: Feed, payload: Value) -> Self {
        self.payloads.insert(feed, payload);
        self
    }

    pub fn with_bytes(mut self, url: &str, bytes: Vec<u8>) -> Self {
        self.blobs.insert(url.to_string(), bytes);
        self
    }
}

impl FeedSource for ReplayFeeds {
    fn fetch_payload(&self, feed: Feed) -> Result<FeedPayload, FeedError> {
        let spec = feed.spec();
        let value = self.payloads.get(&feed).cloned().ok_or(FeedError::Http(404))?;
        FeedPayload::from_json(spec.id, spec.shape, value)
    }

    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FeedError> {
        self.blobs
            .get(url)
            .cloned()
            .ok_or_else(|| FeedError::Transport(format!("no replay data for {}", url)))
    }
}

// ============================================================================
// Tests
// ============================================================================
