use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The primary model could not be loaded at startup.
    #[error("Kronos model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Insufficient data: {have} points, need at least {need}")]
    InsufficientData { have: usize, need: usize },

    #[error("Kronos prediction error: {0}")]
    PrimaryForecastError(String),

    #[error("Simple prediction error: {0}")]
    FallbackForecastError(String),

    #[error("Prediction failed")]
    AllForecastersFailed,

    #[error("{0}")]
    RequestMalformed(String),
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        tracing::error!("Mapping EngineError to HTTP response: {:?}", self);
        let body = json!({ "error": self.to_string() });
        (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
    }
}
