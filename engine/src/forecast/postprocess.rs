// Turns a raw predicted frame into a `PredictionResult`.
use chrono::{DateTime, Utc};
use shared::models::{ForecastPoint, ModelKind, PredictionResult, Trend};
use shared::utils::{mean, sample_std};

use super::iso8601;
use crate::error::EngineError;
use crate::models::Frame;

pub const MIN_CONFIDENCE: f64 = 0.5;
pub const MAX_CONFIDENCE: f64 = 0.95;

/// `1 - std/mean` of the predicted closes, clamped to
/// `[MIN_CONFIDENCE, MAX_CONFIDENCE]`. A zero mean or any non-finite ratio
/// scores the minimum.
pub fn confidence(predicted_closes: &[f64]) -> f64 {
    let Some(avg) = mean(predicted_closes) else {
        return MIN_CONFIDENCE;
    };
    if avg == 0.0 {
        return MIN_CONFIDENCE;
    }
    let raw = 1.0 - sample_std(predicted_closes) / avg;
    if !raw.is_finite() {
        return MIN_CONFIDENCE;
    }
    raw.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
}

/// Builds the response for a primary-model forecast.
pub fn summarize(
    predicted: &Frame,
    history: &Frame,
    horizon: usize,
    future_timestamps: &[DateTime<Utc>],
) -> Result<PredictionResult, EngineError> {
    if predicted.len() != horizon || future_timestamps.len() != horizon {
        return Err(EngineError::PrimaryForecastError(format!(
            "prediction shape mismatch: {} rows, {} timestamps, horizon {}",
            predicted.len(),
            future_timestamps.len(),
            horizon
        )));
    }
    let last_predicted = predicted
        .last()
        .ok_or_else(|| EngineError::PrimaryForecastError("empty prediction".to_string()))?;
    let last_known = history
        .last()
        .ok_or_else(|| EngineError::PrimaryForecastError("empty history".to_string()))?;

    let predictions = predicted
        .records()
        .iter()
        .zip(future_timestamps)
        .enumerate()
        .map(|(i, (record, ts))| ForecastPoint {
            hour: i as u32 + 1,
            price: record.close,
            high: Some(record.high),
            low: Some(record.low),
            volume: Some(record.volume),
            timestamp: iso8601(ts),
        })
        .collect();

    Ok(PredictionResult {
        price_24h: last_predicted.close,
        confidence: confidence(&predicted.closes()),
        trend: Trend::from_prices(last_predicted.close, last_known.close),
        predictions,
        model: ModelKind::Kronos,
    })
}
