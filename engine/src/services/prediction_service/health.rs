// Handler for GET /health
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

use super::PredictionService;
use crate::forecast::iso8601;

pub async fn handle_health(State(service): State<Arc<PredictionService>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "kronos_available": service.kronos_available(),
        "timestamp": iso8601(&Utc::now()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn test_health_ok() {
        let service = Arc::new(PredictionService::new(None, None));
        let Json(body) = handle_health(State(service)).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["kronos_available"], false);
        assert!(DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap()).is_ok());
    }
}
