//! Application configuration.
//!
//! Settings come from a TOML file (every key optional) and are then
//! overridden by environment variables, so a bare deployment only needs
//! `FIRMS_API_KEY` and the artifact paths.
//!
//! # Environment Variables
//! - `FIRE_RISK_CONFIG`: explicit path to the TOML file
//! - `HOST`, `PORT`: bind address (default `0.0.0.0:8000`)
//! - `FIRMS_API_KEY`: FIRMS map key (no default)
//! - `MODEL_PATH`, `PREPROCESSOR_PATH`: trained artifacts
//! - `PROVINCES_PATH`: province boundary GeoJSON
//! - `STATS_DATA_PATH`: historical fire CSV for `/api/stats`
//! - `STATIC_DIR`: front-end directory served at `/`

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::adapters::firms::{DEFAULT_SOURCES, VIETNAM_AREA};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {name}: {value}")]
    InvalidEnv { name: String, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub artifacts: ArtifactSettings,
    #[serde(default)]
    pub data: DataSettings,
    #[serde(default)]
    pub firms: FirmsSettings,
    #[serde(default)]
    pub weather: WeatherSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Served as the fallback route when the directory exists.
    #[serde(default = "default_static_dir")]
    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactSettings {
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,
    #[serde(default = "default_preprocessor_path")]
    pub preprocessor_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSettings {
    #[serde(default = "default_provinces_path")]
    pub provinces_path: PathBuf,
    #[serde(default = "default_name_property")]
    pub province_name_property: String,
    #[serde(default = "default_stats_path")]
    pub stats_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirmsSettings {
    #[serde(default = "default_firms_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    /// `west,south,east,north` in degrees.
    #[serde(default = "default_area")]
    pub area: String,
    /// Tried in order; the first source with data wins.
    #[serde(default = "default_sources")]
    pub sources: Vec<String>,
    #[serde(default = "default_firms_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_backoff")]
    pub rate_limit_backoff_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSettings {
    #[serde(default = "default_weather_url")]
    pub base_url: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_past_days")]
    pub past_days: u32,
    #[serde(default = "default_weather_timeout")]
    pub timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_static_dir() -> Option<PathBuf> {
    Some(PathBuf::from("static"))
}

fn default_model_path() -> PathBuf {
    PathBuf::from("model/fire_risk_model.json")
}

fn default_preprocessor_path() -> PathBuf {
    PathBuf::from("model/preprocessor.json")
}

fn default_provinces_path() -> PathBuf {
    PathBuf::from("data/vietnam_provinces.geojson")
}

fn default_name_property() -> String {
    crate::geo::DEFAULT_NAME_PROPERTY.to_string()
}

fn default_stats_path() -> PathBuf {
    PathBuf::from("data/fire_history.csv")
}

fn default_firms_url() -> String {
    "https://firms.modaps.eosdis.nasa.gov".to_string()
}

fn default_area() -> String {
    VIETNAM_AREA.to_string()
}

fn default_sources() -> Vec<String> {
    DEFAULT_SOURCES.iter().map(|s| s.to_string()).collect()
}

fn default_firms_timeout() -> u64 {
    30
}

fn default_backoff() -> u64 {
    60
}

fn default_weather_url() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

fn default_timezone() -> String {
    "Asia/Ho_Chi_Minh".to_string()
}

fn default_past_days() -> u32 {
    30
}

fn default_weather_timeout() -> u64 {
    10
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

impl Default for ArtifactSettings {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            preprocessor_path: default_preprocessor_path(),
        }
    }
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            provinces_path: default_provinces_path(),
            province_name_property: default_name_property(),
            stats_path: default_stats_path(),
        }
    }
}

impl Default for FirmsSettings {
    fn default() -> Self {
        Self {
            base_url: default_firms_url(),
            api_key: String::new(),
            area: default_area(),
            sources: default_sources(),
            timeout_secs: default_firms_timeout(),
            rate_limit_backoff_secs: default_backoff(),
        }
    }
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            base_url: default_weather_url(),
            timezone: default_timezone(),
            past_days: default_past_days(),
            timeout_secs: default_weather_timeout(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration from the first file found, or defaults when none exists.
    ///
    /// Searches, in order:
    /// 1. `$FIRE_RISK_CONFIG`
    /// 2. `fire-risk.toml`
    /// 3. `backend/fire-risk.toml`
    /// 4. `../fire-risk.toml`
    pub fn from_default_location() -> Result<Self, ConfigError> {
        let mut search_paths = Vec::new();
        if let Ok(explicit) = env::var("FIRE_RISK_CONFIG") {
            search_paths.push(PathBuf::from(explicit));
        }
        search_paths.push(PathBuf::from("fire-risk.toml"));
        search_paths.push(PathBuf::from("backend/fire-risk.toml"));
        search_paths.push(PathBuf::from("../fire-risk.toml"));

        for path in search_paths {
            if path.exists() {
                log::info!("Loading configuration from {}", path.display());
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// File configuration (or defaults) with environment overrides applied.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_default_location()?;
        config.apply_env()?;
        Ok(config)
    }

    /// Override settings from environment variables that are set.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(host) = env::var("HOST") {
            self.server.host = host;
        }
        if let Ok(port) = env::var("PORT") {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidEnv {
                name: "PORT".to_string(),
                value: port.clone(),
            })?;
        }
        if let Ok(key) = env::var("FIRMS_API_KEY") {
            self.firms.api_key = key;
        }
        if let Ok(path) = env::var("MODEL_PATH") {
            self.artifacts.model_path = PathBuf::from(path);
        }
        if let Ok(path) = env::var("PREPROCESSOR_PATH") {
            self.artifacts.preprocessor_path = PathBuf::from(path);
        }
        if let Ok(path) = env::var("PROVINCES_PATH") {
            self.data.provinces_path = PathBuf::from(path);
        }
        if let Ok(path) = env::var("STATS_DATA_PATH") {
            self.data.stats_path = PathBuf::from(path);
        }
        if let Ok(dir) = env::var("STATIC_DIR") {
            self.server.static_dir = if dir.is_empty() {
                None
            } else {
                Some(PathBuf::from(dir))
            };
        }
        Ok(())
    }
}
