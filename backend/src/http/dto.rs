//! Data Transfer Objects for the HTTP API.
//!
//! Response bodies of the prediction, hotspot and stats endpoints are the
//! service types themselves; only the request side needs dedicated shapes.

use serde::{Deserialize, Serialize};

pub use crate::services::{FireStats, HotspotListing, LocationPrediction, RiskAssessment};

use crate::models::columns::{
    BRIGHT_TI5, DAYNIGHT, FRP, LATITUDE, LONGITUDE, PRECIP_SUM_30D, PRECIP_SUM_7D, PRECIP_SUM_MM,
    PROVINCE, RHMAX_PCT, SCAN, SOLAR_RAD_J_M2, TMAX_C, TRACK, WIND_MAX_KMH,
};
use crate::models::{FieldValue, Record};
use crate::services::HotspotInput;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Whether province boundaries are loaded
    pub polygons: bool,
}

/// Body of `POST /api/predict`: one fully specified feature record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub province: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "Tmax_C")]
    pub tmax_c: f64,
    #[serde(rename = "RHmax_pct")]
    pub rhmax_pct: f64,
    #[serde(rename = "Precip_sum_mm")]
    pub precip_sum_mm: f64,
    /// Only feeds the 7d/30d rain ratio
    #[serde(rename = "Precip_sum_7d", default)]
    pub precip_sum_7d: Option<f64>,
    #[serde(rename = "Precip_sum_30d")]
    pub precip_sum_30d: f64,
    #[serde(rename = "Wind_max_kmh")]
    pub wind_max_kmh: f64,
    #[serde(rename = "Solar_rad_J_m2")]
    pub solar_rad_j_m2: f64,
    pub frp: f64,
    pub bright_ti5: f64,
    /// 1/0 or `"D"`/`"N"`
    pub daynight: FieldValue,
    #[serde(default)]
    pub scan: Option<f64>,
    #[serde(default)]
    pub track: Option<f64>,
}

impl PredictRequest {
    pub fn into_record(self) -> Record {
        let mut record = Record::new();
        let numbers = [
            (LATITUDE, Some(self.latitude)),
            (LONGITUDE, Some(self.longitude)),
            (TMAX_C, Some(self.tmax_c)),
            (RHMAX_PCT, Some(self.rhmax_pct)),
            (PRECIP_SUM_MM, Some(self.precip_sum_mm)),
            (PRECIP_SUM_7D, self.precip_sum_7d),
            (PRECIP_SUM_30D, Some(self.precip_sum_30d)),
            (WIND_MAX_KMH, Some(self.wind_max_kmh)),
            (SOLAR_RAD_J_M2, Some(self.solar_rad_j_m2)),
            (FRP, Some(self.frp)),
            (BRIGHT_TI5, Some(self.bright_ti5)),
            (SCAN, self.scan),
            (TRACK, self.track),
        ];
        for (name, value) in numbers {
            if let Some(v) = value {
                record.insert(name.to_string(), v.into());
            }
        }
        record.insert(PROVINCE.to_string(), self.province.into());
        record.insert(DAYNIGHT.to_string(), self.daynight);
        record
    }
}

/// Body of `POST /api/realtime/predict-click`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickRequest {
    pub lat: f64,
    pub lon: f64,
}

/// Body of `POST /api/realtime/predict-hotspot`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotspotRequest {
    pub lat: f64,
    pub lon: f64,
    pub frp: f64,
    pub bright_ti5: f64,
    /// HHMM
    pub acq_time: u32,
    #[serde(default)]
    pub scan: Option<f64>,
    #[serde(default)]
    pub track: Option<f64>,
}

impl From<HotspotRequest> for HotspotInput {
    fn from(req: HotspotRequest) -> Self {
        HotspotInput {
            lat: req.lat,
            lon: req.lon,
            frp: req.frp,
            bright_ti5: req.bright_ti5,
            acq_time: req.acq_time,
            scan: req.scan,
            track: req.track,
        }
    }
}

/// Query parameters for `GET /api/realtime/hotspots`.
#[derive(Debug, Clone, Deserialize)]
pub struct HotspotsQuery {
    #[serde(default = "default_days")]
    pub days: u32,
}

fn default_days() -> u32 {
    1
}
