// Handler for GET /
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use super::PredictionService;

pub const SERVICE_NAME: &str = "Kronos Prediction Service";

pub async fn handle_index(State(service): State<Arc<PredictionService>>) -> Json<Value> {
    Json(json!({
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "kronos_available": service.kronos_available(),
        "endpoints": {
            "predict": "POST /predict",
            "health": "GET /health",
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_index_describes_service() {
        let service = Arc::new(PredictionService::new(None, None));
        let Json(body) = handle_index(State(service)).await;
        assert_eq!(body["service"], SERVICE_NAME);
        assert_eq!(body["version"], "1.0.0");
        assert_eq!(body["kronos_available"], false);
        assert_eq!(body["endpoints"]["predict"], "POST /predict");
    }
}
