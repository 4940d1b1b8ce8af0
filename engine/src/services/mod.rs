// HTTP surface of the engine
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod prediction_service;

use prediction_service::health::handle_health;
use prediction_service::index::handle_index;
use prediction_service::predict::handle_predict;
use prediction_service::PredictionService;

/// Assemble the service router around a shared, read-only prediction service.
pub fn router(service: Arc<PredictionService>) -> Router {
    Router::new()
        .route("/", get(handle_index))
        .route("/health", get(handle_health))
        .route("/predict", post(handle_predict))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(service)
}
