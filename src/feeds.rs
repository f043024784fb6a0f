/// Feed registry for the space-weather monitoring service.
///
/// Defines the canonical list of SWPC feeds consumed by this service, along
/// with the payload shape each one is declared to return. This is the single
/// source of truth for feed paths: all other modules should reference feeds
/// from here rather than hardcoding URLs.

use std::fmt;

// ---------------------------------------------------------------------------
// Feed identifiers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feed {
    SolarWindPlasma,
    SolarWindMag,
    AcePlasma,
    AceMag,
    XrayFlux,
    ProtonFlux,
    GoesMagnetometer,
    SolarIndices,
    SolarRegions,
    FlareCatalog,
}

/// Payload layout a feed is declared to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedShape {
    /// Array of flat objects, one per sample.
    Records,
    /// Array of arrays whose first row names the columns.
    Table,
}

impl fmt::Display for FeedShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedShape::Records => write!(f, "array of objects"),
            FeedShape::Table => write!(f, "header row followed by data rows"),
        }
    }
}

/// Metadata for a single upstream feed.
pub struct FeedSpec {
    pub feed: Feed,
    /// Short stable identifier, used in logs and replay file names.
    pub id: &'static str,
    /// Path appended to the configured base URL.
    pub path: &'static str,
    pub shape: FeedShape,
    /// Column holding the sample time.
    pub time_key: &'static str,
    /// Spacecraft or product family the feed belongs to.
    pub satellite: &'static str,
    pub description: &'static str,
}

/// Indexed by `Feed::spec`; entries stay in `Feed` declaration order.
pub static FEED_REGISTRY: [FeedSpec; 10] = [
    FeedSpec {
        feed: Feed::SolarWindPlasma,
        id: "plasma-7-day",
        path: "/products/solar-wind/plasma-7-day.json",
        shape: FeedShape::Table,
        time_key: "time_tag",
        satellite: "DSCOVR",
        description: "Real-time solar wind density, speed and temperature, 7 days.",
    },
    FeedSpec {
        feed: Feed::SolarWindMag,
        id: "mag-7-day",
        path: "/products/solar-wind/mag-7-day.json",
        shape: FeedShape::Table,
        time_key: "time_tag",
        satellite: "DSCOVR",
        description: "Interplanetary magnetic field in GSM coordinates, 7 days.",
    },
    FeedSpec {
        feed: Feed::AcePlasma,
        id: "plasma-1-day",
        path: "/products/solar-wind/plasma-1-day.json",
        shape: FeedShape::Table,
        time_key: "time_tag",
        satellite: "ACE",
        description: "Solar wind plasma at L1, last 24 hours.",
    },
    FeedSpec {
        feed: Feed::AceMag,
        id: "mag-1-day",
        path: "/products/solar-wind/mag-1-day.json",
        shape: FeedShape::Table,
        time_key: "time_tag",
        satellite: "ACE",
        description: "Interplanetary magnetic field at L1, last 24 hours.",
    },
    FeedSpec {
        feed: Feed::XrayFlux,
        id: "xrays-7-day",
        path: "/json/goes/primary/xrays-7-day.json",
        shape: FeedShape::Records,
        time_key: "time_tag",
        satellite: "GOES",
        description: "GOES X-ray flux, short (0.05-0.4nm) and long (0.1-0.8nm) channels.",
    },
    FeedSpec {
        feed: Feed::ProtonFlux,
        id: "integral-protons-1-day",
        path: "/json/goes/primary/integral-protons-1-day.json",
        shape: FeedShape::Records,
        time_key: "time_tag",
        satellite: "GOES",
        description: "GOES integral proton flux by energy threshold.",
    },
    FeedSpec {
        feed: Feed::GoesMagnetometer,
        id: "magnetometers-1-day",
        path: "/json/goes/primary/magnetometers-1-day.json",
        shape: FeedShape::Records,
        time_key: "time_tag",
        satellite: "GOES",
        description: "GOES geostationary magnetometer (Hp, He, Hn, total).",
    },
    FeedSpec {
        feed: Feed::SolarIndices,
        id: "solar-cycle-indices",
        path: "/json/solar-cycle/observed-solar-cycle-indices.json",
        shape: FeedShape::Records,
        time_key: "time-tag",
        satellite: "SWPC",
        description: "Monthly observed sunspot number and F10.7 radio flux.",
    },
    FeedSpec {
        feed: Feed::SolarRegions,
        id: "solar-regions",
        path: "/json/regions/solar-regions.json",
        shape: FeedShape::Records,
        time_key: "observed_date",
        satellite: "SWPC",
        description: "Numbered sunspot regions with magnetic class and flare history.",
    },
    FeedSpec {
        feed: Feed::FlareCatalog,
        id: "xray-flares-7-day",
        path: "/json/goes/primary/xray-flares-7-day.json",
        shape: FeedShape::Records,
        time_key: "time_tag",
        satellite: "GOES",
        description: "GOES X-ray flare event list, 7 days.",
    },
];

impl Feed {
    /// Registry entry for this feed.
    pub fn spec(self) -> &'static FeedSpec {
        let index = match self {
            Feed::SolarWindPlasma => 0,
            Feed::SolarWindMag => 1,
            Feed::AcePlasma => 2,
            Feed::AceMag => 3,
            Feed::XrayFlux => 4,
            Feed::ProtonFlux => 5,
            Feed::GoesMagnetometer => 6,
            Feed::SolarIndices => 7,
            Feed::SolarRegions => 8,
            Feed::FlareCatalog => 9,
        };
        &FEED_REGISTRY[index]
    }

    pub fn id(self) -> &'static str {
        self.spec().id
    }

    /// Minute-cadence products. Indices are monthly, regions daily, and the
    /// flare list only grows when a flare happens, so age says nothing there.
    pub fn is_realtime(self) -> bool {
        !matches!(self, Feed::SolarIndices | Feed::SolarRegions | Feed::FlareCatalog)
    }
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Looks up a feed by its id. Returns `None` if not found.
pub fn find_feed(id: &str) -> Option<&'static FeedSpec> {
    FEED_REGISTRY.iter().find(|s| s.id == id)
}

/// Feeds belonging to one spacecraft or product family.
pub fn feeds_for_satellite(satellite: &str) -> Vec<Feed> {
    FEED_REGISTRY
        .iter()
        .filter(|s| s.satellite.eq_ignore_ascii_case(satellite))
        .map(|s| s.feed)
        .collect()
}

/// Absolute URL for a feed under `base_url`.
pub fn feed_url(base_url: &str, feed: Feed) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), feed.spec().path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
