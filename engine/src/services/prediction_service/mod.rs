// engine/src/services/prediction_service/mod.rs
// Prediction orchestration: try the Kronos model, fall back to the simple
// forecaster, surface a single error when neither produces a result.
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;
use shared::models::PredictionResult;

use crate::data::frame_builder::FrameBuilder;
use crate::error::EngineError;
use crate::forecast::postprocess;
use crate::forecast::primary::{MAX_LOOKBACK, MIN_HISTORY};
use crate::forecast::{KronosForecaster, Predictor, SimpleForecaster};

pub mod health;
pub mod helpers;
pub mod index;
pub mod predict;

pub use helpers::{parse_predict_request, PredictRequest};

pub struct PredictionService {
    primary: Option<KronosForecaster>,
    fallback: SimpleForecaster,
    max_pred_hours: Option<usize>,
}

impl PredictionService {
    /// `predictor` is the model loaded at startup, `None` when loading failed
    /// or was disabled. It is never replaced afterwards.
    pub fn new(predictor: Option<Arc<dyn Predictor>>, max_pred_hours: Option<usize>) -> Self {
        PredictionService {
            primary: predictor.map(KronosForecaster::new),
            fallback: SimpleForecaster::default(),
            max_pred_hours,
        }
    }

    pub fn kronos_available(&self) -> bool {
        self.primary.is_some()
    }

    pub fn max_pred_hours(&self) -> Option<usize> {
        self.max_pred_hours
    }

    /// Each forecaster is attempted at most once. Only a total failure is
    /// returned as an error.
    pub async fn predict<R: Rng + Send>(
        &self,
        request: &PredictRequest,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<PredictionResult, EngineError> {
        let horizon = request.pred_hours;

        if let Some(result) = self.try_primary(request, horizon).await {
            tracing::info!(symbol = %request.symbol, horizon, confidence = result.confidence, "Kronos prediction succeeded");
            return Ok(result);
        }

        tracing::info!(symbol = %request.symbol, horizon, "Using simple prediction as fallback");
        match self.fallback.forecast(&request.series, horizon, rng, now) {
            Some(result) => Ok(result),
            None => {
                tracing::error!(symbol = %request.symbol, "No forecaster produced a prediction");
                Err(EngineError::AllForecastersFailed)
            }
        }
    }

    async fn try_primary(&self, request: &PredictRequest, horizon: usize) -> Option<PredictionResult> {
        let Some(primary) = &self.primary else {
            tracing::debug!(symbol = %request.symbol, "Kronos model not loaded");
            return None;
        };

        let frame = match FrameBuilder::from_series(&request.series) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(symbol = %request.symbol, error = %e, "Could not build frame for Kronos");
                return None;
            }
        };
        if frame.len() < MIN_HISTORY {
            tracing::info!(symbol = %request.symbol, count = frame.len(), "Insufficient data for Kronos");
            return None;
        }

        tracing::info!(
            symbol = %request.symbol,
            horizon,
            lookback = frame.len().min(MAX_LOOKBACK),
            "Predicting with Kronos"
        );
        let forecast = primary.forecast(&frame, horizon).await?;

        match postprocess::summarize(&forecast.frame, &frame, horizon, &forecast.future_timestamps) {
            Ok(result) => Some(result),
            Err(e) => {
                tracing::warn!(symbol = %request.symbol, error = %e, "Kronos output could not be summarized");
                None
            }
        }
    }
}
