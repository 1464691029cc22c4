//! Reverse geocoding of coordinates to Vietnamese provinces.
//!
//! The boundary file is read the first time a lookup needs it. A missing or
//! unreadable file is logged once; afterwards every lookup answers
//! [`UNKNOWN_PROVINCE`] and [`Geocoder::is_available`] reports `false`.

pub mod polygon;

use std::path::PathBuf;
use std::sync::OnceLock;

pub use polygon::{BoundingBox, Polygon, Province, ProvinceIndex};

/// Province name used when no polygon contains a point.
pub const UNKNOWN_PROVINCE: &str = "Unknown";

/// GADM level-1 name property.
pub const DEFAULT_NAME_PROPERTY: &str = "NAME_1";

#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    #[error("failed to read boundary file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed boundary file: {0}")]
    Format(#[from] serde_json::Error),

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("boundary file contains no usable province polygons")]
    NoPolygons,
}

/// Point-in-polygon province lookup with a load-once boundary set.
#[derive(Debug)]
pub struct Geocoder {
    source: Option<PathBuf>,
    name_property: String,
    index: OnceLock<Option<ProvinceIndex>>,
}

impl Geocoder {
    /// Geocoder backed by a GeoJSON file, loaded on first use.
    pub fn new(path: impl Into<PathBuf>, name_property: impl Into<String>) -> Self {
        Self {
            source: Some(path.into()),
            name_property: name_property.into(),
            index: OnceLock::new(),
        }
    }

    /// Geocoder over boundaries that are already in memory.
    pub fn from_index(index: ProvinceIndex) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(Some(index));
        Self {
            source: None,
            name_property: DEFAULT_NAME_PROPERTY.to_string(),
            index: cell,
        }
    }

    /// Geocoder without boundaries; every lookup is [`UNKNOWN_PROVINCE`].
    pub fn unavailable() -> Self {
        Self {
            source: None,
            name_property: DEFAULT_NAME_PROPERTY.to_string(),
            index: OnceLock::new(),
        }
    }

    fn index(&self) -> Option<&ProvinceIndex> {
        self.index.get_or_init(|| self.load()).as_ref()
    }

    fn load(&self) -> Option<ProvinceIndex> {
        let path = self.source.as_ref()?;
        match ProvinceIndex::from_file(path, &self.name_property) {
            Ok(index) => {
                log::info!(
                    "Loaded {} province boundaries from {}",
                    index.len(),
                    path.display()
                );
                Some(index)
            }
            Err(e) => {
                log::warn!("Province boundaries unavailable, geocoding disabled: {}", e);
                None
            }
        }
    }

    /// Whether boundaries are loaded. Triggers the load on first call.
    pub fn is_available(&self) -> bool {
        self.index().is_some()
    }

    /// Province containing the point, or [`UNKNOWN_PROVINCE`].
    pub fn province_of(&self, lat: f64, lon: f64) -> String {
        self.locate(lat, lon)
            .unwrap_or(UNKNOWN_PROVINCE)
            .to_string()
    }

    /// Province containing the point, `None` when outside every polygon or
    /// when no boundaries are loaded.
    pub fn locate(&self, lat: f64, lon: f64) -> Option<&str> {
        self.index()?.locate(lat, lon)
    }
}
