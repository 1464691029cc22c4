//! Application state for the HTTP server.

use std::path::PathBuf;

use crate::services::{HotspotService, PredictionService, StatsService};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Model, preprocessor, geocoder and weather source
    pub prediction: PredictionService,
    /// FIRMS listing
    pub hotspots: HotspotService,
    /// Historical aggregates
    pub stats: StatsService,
    /// Front-end directory served as the fallback route
    pub static_dir: Option<PathBuf>,
}

impl AppState {
    pub fn new(prediction: PredictionService, hotspots: HotspotService, stats: StatsService) -> Self {
        Self {
            prediction,
            hotspots,
            stats,
            static_dir: None,
        }
    }

    pub fn with_static_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.static_dir = dir;
        self
    }
}
