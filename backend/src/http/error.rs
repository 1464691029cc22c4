//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::preprocessing::PreprocessError;
use crate::services::ServiceError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Invalid request (validation error)
    BadRequest(String),
    /// Error raised by the service layer
    Service(ServiceError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg)),
            AppError::Service(e) => service_error(e),
        };

        (status, Json(error)).into_response()
    }
}

fn service_error(err: ServiceError) -> (StatusCode, ApiError) {
    let msg = err.to_string();
    match err {
        ServiceError::WeatherUnavailable { .. } => (
            StatusCode::BAD_GATEWAY,
            ApiError::new("WEATHER_UNAVAILABLE", "Weather data unavailable")
                .with_details(msg),
        ),
        ServiceError::InvalidInput(_) => (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg)),
        ServiceError::Preprocess(
            PreprocessError::MissingColumn(_) | PreprocessError::NonNumericColumn(_),
        ) => (StatusCode::BAD_REQUEST, ApiError::new("INVALID_FEATURES", msg)),
        ServiceError::Preprocess(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::new("PREPROCESSING_ERROR", msg),
        ),
        ServiceError::Model(_) | ServiceError::NoPrediction => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::new("MODEL_ERROR", msg),
        ),
        ServiceError::Io { .. } | ServiceError::Csv(_) | ServiceError::Task(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::new("INTERNAL_ERROR", msg),
        ),
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        AppError::Service(err)
    }
}
