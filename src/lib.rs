//! Space-weather monitoring service.
//!
//! Read-through aggregator over the NOAA SWPC real-time feeds: fetches and
//! normalizes the feeds, summarizes each one, and derives storm risk, flare
//! activity and threshold alerts. Nothing is persisted between calls.

pub mod alert;
pub mod analysis;
pub mod config;
pub mod feeds;
pub mod imaging;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod risk;
pub mod services;
pub mod verify;
