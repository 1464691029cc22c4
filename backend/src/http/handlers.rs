//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the service
//! layer.

use axum::{
    extract::{Query, State},
    Json,
};

use super::dto::{
    ClickRequest, FireStats, HealthResponse, HotspotListing, HotspotRequest, HotspotsQuery,
    LocationPrediction, PredictRequest, RiskAssessment,
};
use super::error::AppError;
use super::state::AppState;
use crate::services::{local_now, HotspotInput};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

fn check_coordinates(lat: f64, lon: f64) -> Result<(), AppError> {
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(AppError::BadRequest(format!(
            "invalid coordinates ({}, {})",
            lat, lon
        )));
    }
    Ok(())
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        polygons: state.prediction.geocoder().is_available(),
    }))
}

// =============================================================================
// Prediction
// =============================================================================

/// POST /api/predict
///
/// Score a fully specified feature record.
pub async fn predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> HandlerResult<RiskAssessment> {
    check_coordinates(request.latitude, request.longitude)?;
    let record = request.into_record();
    let assessment = state
        .prediction
        .score_record(&record, local_now().date())?;
    Ok(Json(assessment))
}

/// POST /api/realtime/predict-click
///
/// Score a map location using live weather and ambient fire inputs.
pub async fn predict_click(
    State(state): State<AppState>,
    Json(request): Json<ClickRequest>,
) -> HandlerResult<LocationPrediction> {
    check_coordinates(request.lat, request.lon)?;
    let prediction = state
        .prediction
        .predict_location(request.lat, request.lon, local_now())
        .await?;
    Ok(Json(prediction))
}

/// POST /api/realtime/predict-hotspot
///
/// Score an observed hotspot using live weather.
pub async fn predict_hotspot(
    State(state): State<AppState>,
    Json(request): Json<HotspotRequest>,
) -> HandlerResult<LocationPrediction> {
    check_coordinates(request.lat, request.lon)?;
    let input = HotspotInput::from(request);
    let prediction = state
        .prediction
        .predict_hotspot(&input, local_now().date())
        .await?;
    Ok(Json(prediction))
}

// =============================================================================
// Hotspots and statistics
// =============================================================================

/// GET /api/realtime/hotspots?days=N
pub async fn list_hotspots(
    State(state): State<AppState>,
    Query(query): Query<HotspotsQuery>,
) -> HandlerResult<HotspotListing> {
    let listing = state.hotspots.list(query.days, local_now().date()).await?;
    Ok(Json(listing))
}

/// GET /api/stats
pub async fn get_stats(State(state): State<AppState>) -> HandlerResult<FireStats> {
    let stats = state.stats.summary().await?;
    Ok(Json(stats))
}
