/// Upstream feed access.
///
/// Submodules:
/// - `swpc`      — blocking HTTP client for the live SWPC feeds.
/// - `normalize` — turns either payload shape into a `Series`.
/// - `replay`    — serves canned payloads for offline work and tests.

pub mod normalize;
pub mod replay;
pub mod swpc;

use crate::feeds::Feed;
use crate::logging::{self, Source};
use crate::model::{FeedError, Series};

pub use normalize::{FeedPayload, normalize, parse_timestamp};

/// Anything that can hand out feed payloads.
///
/// Implementors provide `fetch_payload`, which surfaces the failure reason.
/// `fetch` never fails: transport errors, HTTP errors, timeouts and malformed
/// bodies are logged and reported as `None`, which callers treat as a
/// degraded but valid input.
pub trait FeedSource {
    fn fetch_payload(&self, feed: Feed) -> Result<FeedPayload, FeedError>;

    /// Raw bytes at an arbitrary URL (used for image analysis).
    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FeedError>;

    fn fetch(&self, feed: Feed) -> Option<FeedPayload> {
        match self.fetch_payload(feed) {
            Ok(payload) => {
                logging::debug(
                    Source::Swpc,
                    Some(feed.id()),
                    &format!("received {} samples", payload.len()),
                );
                Some(payload)
            }
            Err(e) => {
                logging::log_feed_failure(feed.id(), "fetch", &e);
                None
            }
        }
    }

    /// Fetches and normalizes a feed.
    fn fetch_series(&self, feed: Feed) -> Option<Series> {
        self.fetch(feed)
            .map(|payload| normalize(&payload, feed.spec().time_key))
    }
}
