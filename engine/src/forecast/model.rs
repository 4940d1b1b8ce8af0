use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::settings::EngineSettings;
use crate::error::EngineError;
use crate::models::{Frame, FrameRecord};

/// Opaque reference to a tokenizer loaded by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizerHandle {
    pub name: String,
    pub id: String,
}

/// Opaque reference to a model loaded by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelHandle {
    pub name: String,
    pub id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SamplingParams {
    pub temperature: f64,
    pub top_p: f64,
    pub sample_count: u32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            top_p: 0.9,
            sample_count: 1,
        }
    }
}

/// A ready-to-use forecasting model. Implementations are shared read-only
/// across requests.
#[async_trait]
pub trait Predictor: Send + Sync {
    /// Forecasts `horizon` bars following `context`. The returned frame is
    /// expected to carry `future_timestamps`, one record per hour.
    async fn predict(
        &self,
        context: &[FrameRecord],
        context_timestamps: &[DateTime<Utc>],
        future_timestamps: &[DateTime<Utc>],
        horizon: usize,
        sampling: SamplingParams,
    ) -> Result<Frame, EngineError>;
}

/// Source of pretrained tokenizers and models.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn load_tokenizer(&self, name: &str) -> Result<TokenizerHandle, EngineError>;

    async fn load_model(&self, name: &str) -> Result<ModelHandle, EngineError>;

    fn predictor(
        &self,
        model: ModelHandle,
        tokenizer: TokenizerHandle,
        device: &str,
        max_context: usize,
    ) -> Arc<dyn Predictor>;
}

/// Loads tokenizer and model named in `settings` and wires them into a
/// predictor. Any failure is reported as `ModelUnavailable`.
pub async fn load_predictor(
    provider: &dyn ModelProvider,
    settings: &EngineSettings,
) -> Result<Arc<dyn Predictor>, EngineError> {
    tracing::info!(tokenizer = %settings.tokenizer, "Loading tokenizer");
    let tokenizer = provider
        .load_tokenizer(&settings.tokenizer)
        .await
        .map_err(|e| EngineError::ModelUnavailable(format!("tokenizer '{}': {}", settings.tokenizer, e)))?;

    tracing::info!(model = %settings.model, "Loading model");
    let model = provider
        .load_model(&settings.model)
        .await
        .map_err(|e| EngineError::ModelUnavailable(format!("model '{}': {}", settings.model, e)))?;

    tracing::info!(device = %settings.device, max_context = settings.max_context, "Initializing predictor");
    Ok(provider.predictor(model, tokenizer, &settings.device, settings.max_context))
}
