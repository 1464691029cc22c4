//! Clients for the external feeds: FIRMS hotspots and Open-Meteo weather.
//!
//! ```text
//!  FIRMS area API ──► FirmsClient ──► FeedOutcome ──► HotspotFetcher ──► spatial_join ──► Vec<HotspotRecord>
//!  Open-Meteo     ──► OpenMeteoClient ──────────────────────────────────────────────────► Option<WeatherRecord>
//! ```
//!
//! Neither path returns transport errors to callers. The hotspot path
//! degrades to an empty list; the weather path degrades to `None` and the
//! prediction service decides how to report it.

pub mod firms;
pub mod weather;

pub use firms::{
    parse_firms_csv, spatial_join, FeedOutcome, FirmsClient, HotspotFeed, HotspotFetcher,
};
pub use weather::{parse_forecast, OpenMeteoClient, WeatherSource};

#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}
