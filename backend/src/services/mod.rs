//! Service layer between the HTTP handlers and the adapters/model.
//!
//! Services own the shared read-only state built at startup and implement the
//! request-level operations: scoring, hotspot listing and historical stats.

pub mod hotspots;
pub mod prediction;
pub mod risk;
pub mod stats;

pub use hotspots::{HotspotListing, HotspotService};
pub use prediction::{local_now, HotspotInput, LocationPrediction, PredictionService};
pub use risk::{RiskAssessment, RiskLevel};
pub use stats::{FireStats, StatsService};

use crate::model::ModelError;
use crate::preprocessing::PreprocessError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("weather data unavailable for ({lat}, {lon})")]
    WeatherUnavailable { lat: f64, lon: f64 },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Preprocess(#[from] PreprocessError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("model returned no prediction")]
    NoPrediction,

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("background task failed: {0}")]
    Task(String),
}
