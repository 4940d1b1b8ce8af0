// Handler for POST /predict
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::models::PredictionResult;

use super::helpers::parse_predict_request;
use super::PredictionService;
use crate::error::EngineError;

/// The body is parsed by hand so that malformed JSON is reported in the same
/// `{error}` shape as every other failure.
pub async fn handle_predict(
    State(service): State<Arc<PredictionService>>,
    body: Bytes,
) -> Result<Json<PredictionResult>, EngineError> {
    let request = parse_predict_request(&body, service.max_pred_hours())?;
    tracing::info!(
        symbol = %request.symbol,
        prices = request.series.prices.len(),
        pred_hours = request.pred_hours,
        "Received predict request"
    );

    let mut rng = StdRng::from_entropy();
    let result = service.predict(&request, &mut rng, Utc::now()).await?;
    Ok(Json(result))
}
