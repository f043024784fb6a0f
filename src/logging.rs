/// Structured logging for the space-weather monitoring service
///
/// Every entry is tagged with the data source and, where relevant, the feed
/// id, so a degraded upstream is easy to spot in the log. Output goes through
/// the `log` facade; `init_logger` installs `env_logger` writing to stderr or
/// appending to a file.

use std::fmt;
use std::fs::OpenOptions;

use crate::model::FeedError;

const TARGET: &str = "swmon_service";

// ---------------------------------------------------------------------------
// Data Source Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Swpc,
    Imaging,
    System,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Swpc => write!(f, "SWPC"),
            Source::Imaging => write!(f, "IMG"),
            Source::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - the product is temporarily unpublished or empty
    Expected,
    /// Unexpected failure - indicates service degradation or a format change
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Classify a feed failure by its cause.
pub fn classify_feed_failure(err: &FeedError) -> FailureType {
    match err {
        // SWPC returns 404 while a product is being regenerated
        FeedError::Http(404) => FailureType::Expected,
        FeedError::Http(code) if *code >= 500 => FailureType::Unexpected,
        FeedError::Http(_) => FailureType::Unknown,
        FeedError::Timeout | FeedError::Transport(_) => FailureType::Unknown,
        // A body we cannot read means the upstream format moved under us
        FeedError::Parse(_) | FeedError::Shape { .. } => FailureType::Unexpected,
    }
}

// ---------------------------------------------------------------------------
// Logger Setup
// ---------------------------------------------------------------------------

/// Install the global logger.
///
/// With `log_file` set, entries are appended to that file instead of stderr.
/// Calling this twice is harmless; the first logger wins.
pub fn init_logger(
    level: log::LevelFilter,
    log_file: Option<&str>,
    timestamps: bool,
) -> std::io::Result<()> {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);

    if !timestamps {
        builder.format_timestamp(None);
    }

    if let Some(path) = log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    let _ = builder.try_init();
    Ok(())
}

fn format_entry(source: Source, feed: Option<&str>, message: &str) -> String {
    let feed_part = feed.map(|s| format!(" [{}]", s)).unwrap_or_default();
    format!("{}{}: {}", source, feed_part, message)
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

pub fn info(source: Source, feed: Option<&str>, message: &str) {
    log::info!(target: TARGET, "{}", format_entry(source, feed, message));
}

pub fn warn(source: Source, feed: Option<&str>, message: &str) {
    log::warn!(target: TARGET, "{}", format_entry(source, feed, message));
}

pub fn error(source: Source, feed: Option<&str>, message: &str) {
    log::error!(target: TARGET, "{}", format_entry(source, feed, message));
}

pub fn debug(source: Source, feed: Option<&str>, message: &str) {
    log::debug!(target: TARGET, "{}", format_entry(source, feed, message));
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log a feed failure with automatic classification
pub fn log_feed_failure(feed_id: &str, operation: &str, err: &FeedError) {
    let failure_type = classify_feed_failure(err);
    let message = format!("{} failed [{}]: {}", operation, failure_type, err);

    match failure_type {
        FailureType::Expected => debug(Source::Swpc, Some(feed_id), &message),
        FailureType::Unexpected => error(Source::Swpc, Some(feed_id), &message),
        FailureType::Unknown => warn(Source::Swpc, Some(feed_id), &message),
    }
}

/// Log how many feeds an operation managed to fetch
pub fn log_fetch_summary(operation: &str, total: usize, successful: usize) {
    let failed = total - successful.min(total);
    let message = format!(
        "{}: {}/{} feeds available, {} unavailable",
        operation, successful, total, failed
    );

    if failed == 0 {
        info(Source::Swpc, None, &message);
    } else if successful == 0 {
        error(Source::Swpc, None, &message);
    } else {
        warn(Source::Swpc, None, &message);
    }
}
