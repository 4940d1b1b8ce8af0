// Best-effort adapter around the pretrained sequence model.
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::model::{Predictor, SamplingParams};
use super::{hours_after, iso8601};
use crate::error::EngineError;
use crate::models::Frame;

/// Minimum history before the model is consulted at all.
pub const MIN_HISTORY: usize = 50;
/// Context window cap, kept below the model's 512-token limit.
pub const MAX_LOOKBACK: usize = 400;

/// Raw model output together with the timestamps it was asked for.
#[derive(Debug, Clone)]
pub struct PrimaryForecast {
    pub frame: Frame,
    pub future_timestamps: Vec<DateTime<Utc>>,
}

/// Hourly timestamps `last + 1h ..= last + horizon h`. Fails when the last
/// one falls outside the representable range.
pub fn future_timestamps(last: DateTime<Utc>, horizon: usize) -> Result<Vec<DateTime<Utc>>, EngineError> {
    if hours_after(last, horizon).is_none() {
        return Err(EngineError::PrimaryForecastError(format!(
            "{} hourly steps after {} are out of range",
            horizon,
            iso8601(&last)
        )));
    }
    (1..=horizon)
        .map(|i| {
            hours_after(last, i).ok_or_else(|| {
                EngineError::PrimaryForecastError(format!("timestamp {}h after {} is out of range", i, iso8601(&last)))
            })
        })
        .collect()
}

#[derive(Clone)]
pub struct KronosForecaster {
    predictor: Arc<dyn Predictor>,
    sampling: SamplingParams,
}

impl KronosForecaster {
    pub fn new(predictor: Arc<dyn Predictor>) -> Self {
        Self {
            predictor,
            sampling: SamplingParams::default(),
        }
    }

    /// Never fails: every error is logged here and reported as `None`.
    pub async fn forecast(&self, frame: &Frame, horizon: usize) -> Option<PrimaryForecast> {
        match self.try_forecast(frame, horizon).await {
            Ok(forecast) => Some(forecast),
            Err(EngineError::InsufficientData { have, need }) => {
                tracing::info!(have, need, "Insufficient data for Kronos, skipping model call");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, horizon, "Kronos prediction failed");
                None
            }
        }
    }

    pub async fn try_forecast(&self, frame: &Frame, horizon: usize) -> Result<PrimaryForecast, EngineError> {
        if frame.len() < MIN_HISTORY {
            return Err(EngineError::InsufficientData { have: frame.len(), need: MIN_HISTORY });
        }
        let last = frame
            .last()
            .ok_or_else(|| EngineError::PrimaryForecastError("empty history".to_string()))?;

        let context = frame.tail(MAX_LOOKBACK);
        let context_timestamps: Vec<DateTime<Utc>> = context.iter().map(|r| r.timestamp).collect();
        let future = future_timestamps(last.timestamp, horizon)?;

        tracing::debug!(lookback = context.len(), horizon, "Calling Kronos predictor");
        let predicted = self
            .predictor
            .predict(context, &context_timestamps, &future, horizon, self.sampling)
            .await?;

        if predicted.len() != horizon {
            return Err(EngineError::PrimaryForecastError(format!(
                "expected {} predicted rows, got {}",
                horizon,
                predicted.len()
            )));
        }
        if predicted.records().iter().any(|r| !r.close.is_finite()) {
            return Err(EngineError::PrimaryForecastError("non-finite close in prediction".to_string()));
        }

        Ok(PrimaryForecast {
            frame: predicted,
            future_timestamps: future,
        })
    }
}
