//! Scoring a single location.
//!
//! ```text
//! lat/lon ──► WeatherSource ──► Record ──► prepare_serving_frame ──► transform ──► model
//!        └──► Geocoder ─────────┘   ▲
//!                      hotspot or ambient fire inputs
//! ```

use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::Serialize;

use super::risk::RiskAssessment;
use super::ServiceError;
use crate::adapters::WeatherSource;
use crate::features::prepare_serving_frame;
use crate::geo::Geocoder;
use crate::model::RiskModel;
use crate::models::columns::{
    BRIGHT_TI5, DAYNIGHT, FRP, LATITUDE, LONGITUDE, PROVINCE, SCAN, TRACK,
};
use crate::models::{is_daytime, Frame, Record, WeatherRecord};
use crate::preprocessing::PreprocessorState;

/// Fire inputs assumed for a location with no active detection.
pub const AMBIENT_FRP: f64 = 0.0;
pub const AMBIENT_BRIGHT_TI5: f64 = 300.0;
pub const AMBIENT_PIXEL_SIZE: f64 = 0.5;

/// Vietnam is UTC+7 all year.
const LOCAL_UTC_OFFSET_SECS: i32 = 7 * 3600;

/// Current wall-clock time in Vietnam.
pub fn local_now() -> NaiveDateTime {
    match FixedOffset::east_opt(LOCAL_UTC_OFFSET_SECS) {
        Some(offset) => Utc::now().with_timezone(&offset).naive_local(),
        None => Utc::now().naive_utc(),
    }
}

/// A satellite detection submitted for scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct HotspotInput {
    pub lat: f64,
    pub lon: f64,
    pub frp: f64,
    pub bright_ti5: f64,
    /// HHMM
    pub acq_time: u32,
    pub scan: Option<f64>,
    pub track: Option<f64>,
}

/// Observed fire inputs echoed back with a hotspot prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HotspotSummary {
    pub frp: f64,
    pub brightness: f64,
    pub time: u32,
}

/// Score for a location, with the context it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationPrediction {
    #[serde(flatten)]
    pub assessment: RiskAssessment,
    pub province: String,
    pub weather: WeatherRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hotspot_data: Option<HotspotSummary>,
}

/// Read-only scoring pipeline shared by every request.
#[derive(Clone)]
pub struct PredictionService {
    model: Arc<dyn RiskModel>,
    preprocessor: Arc<PreprocessorState>,
    geocoder: Arc<Geocoder>,
    weather: Arc<dyn WeatherSource>,
}

impl PredictionService {
    /// Fails when the model was trained on a different feature order than
    /// the preprocessor produces.
    pub fn new(
        model: Arc<dyn RiskModel>,
        preprocessor: Arc<PreprocessorState>,
        geocoder: Arc<Geocoder>,
        weather: Arc<dyn WeatherSource>,
    ) -> Result<Self, ServiceError> {
        model.check_features(&preprocessor.expected_columns)?;
        Ok(Self {
            model,
            preprocessor,
            geocoder,
            weather,
        })
    }

    pub fn geocoder(&self) -> &Geocoder {
        &self.geocoder
    }

    /// Raw model probability for one record.
    pub fn probability(&self, record: &Record, today: NaiveDate) -> Result<f64, ServiceError> {
        let mut frame = Frame::from_record(record);
        prepare_serving_frame(&mut frame, today);
        let features = self.preprocessor.transform(&mut frame)?;
        let probs = self.model.predict_proba(&features)?;
        probs
            .first()
            .copied()
            .ok_or(ServiceError::NoPrediction)
    }

    /// Score a fully specified record.
    pub fn score_record(&self, record: &Record, today: NaiveDate) -> Result<RiskAssessment, ServiceError> {
        let probability = self.probability(record, today)?;
        Ok(RiskAssessment::from_probability(probability))
    }

    /// Score a clicked map location with ambient fire inputs.
    pub async fn predict_location(
        &self,
        lat: f64,
        lon: f64,
        now: NaiveDateTime,
    ) -> Result<LocationPrediction, ServiceError> {
        let daynight = if is_daytime(now.hour() * 100) { 1.0 } else { 0.0 };
        let fire = [
            (FRP, AMBIENT_FRP),
            (BRIGHT_TI5, AMBIENT_BRIGHT_TI5),
            (SCAN, AMBIENT_PIXEL_SIZE),
            (TRACK, AMBIENT_PIXEL_SIZE),
            (DAYNIGHT, daynight),
        ];
        self.predict_at(lat, lon, &fire, now.date(), None).await
    }

    /// Score a detected hotspot using its observed fire inputs.
    pub async fn predict_hotspot(
        &self,
        input: &HotspotInput,
        today: NaiveDate,
    ) -> Result<LocationPrediction, ServiceError> {
        let daynight = if is_daytime(input.acq_time) { 1.0 } else { 0.0 };
        let mut fire = vec![
            (FRP, input.frp),
            (BRIGHT_TI5, input.bright_ti5),
            (DAYNIGHT, daynight),
        ];
        // Absent pixel sizes are filled during serving preparation.
        if let Some(scan) = input.scan {
            fire.push((SCAN, scan));
        }
        if let Some(track) = input.track {
            fire.push((TRACK, track));
        }
        let summary = HotspotSummary {
            frp: input.frp,
            brightness: input.bright_ti5,
            time: input.acq_time,
        };
        self.predict_at(input.lat, input.lon, &fire, today, Some(summary))
            .await
    }

    async fn predict_at(
        &self,
        lat: f64,
        lon: f64,
        fire: &[(&str, f64)],
        today: NaiveDate,
        hotspot_data: Option<HotspotSummary>,
    ) -> Result<LocationPrediction, ServiceError> {
        let weather = self
            .weather
            .daily(lat, lon)
            .await
            .ok_or(ServiceError::WeatherUnavailable { lat, lon })?;
        let province = self.geocoder.province_of(lat, lon);

        let mut record = Record::new();
        record.insert(PROVINCE.to_string(), province.clone().into());
        record.insert(LATITUDE.to_string(), lat.into());
        record.insert(LONGITUDE.to_string(), lon.into());
        weather.write_into(&mut record);
        for (name, value) in fire {
            record.insert(name.to_string(), (*value).into());
        }

        let assessment = self.score_record(&record, today)?;
        log::info!(
            "Scored ({:.4}, {:.4}) in {}: p = {:.4} ({:?})",
            lat,
            lon,
            province,
            assessment.probability,
            assessment.risk_level
        );

        Ok(LocationPrediction {
            assessment,
            province,
            weather,
            hotspot_data,
        })
    }
}

#[cfg(test)]
#[path = "prediction_tests.rs"]
mod prediction_tests;
