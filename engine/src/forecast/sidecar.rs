use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

use super::iso8601;
use super::model::{ModelHandle, ModelProvider, Predictor, SamplingParams, TokenizerHandle};
use crate::error::EngineError;
use crate::models::{Frame, FrameRecord};

/// Unix-socket JSON-RPC client for the model worker process.
///
/// Protocol: newline-delimited JSON, one request → one response, one
/// connection per call so concurrent requests never share a stream.
#[derive(Debug, Clone)]
pub struct ModelWorkerClient {
    sock_path: PathBuf,
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    id: u64,
    ok: bool,
    result: Option<Value>,
    error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireBar {
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: f64,
    #[serde(default)]
    amount: f64,
}

impl From<&FrameRecord> for WireBar {
    fn from(r: &FrameRecord) -> Self {
        WireBar {
            open: r.open,
            high: r.high,
            low: r.low,
            close: r.close,
            volume: r.volume,
            amount: r.amount,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PredictResult {
    rows: Vec<WireBar>,
}

impl ModelWorkerClient {
    pub fn new(sock_path: PathBuf) -> Self {
        Self { sock_path }
    }

    async fn rpc(&self, method: &str, params: Value) -> Result<Value, String> {
        const REQUEST_ID: u64 = 1;
        let req = RpcRequest { id: REQUEST_ID, method, params };
        let mut line = serde_json::to_string(&req).map_err(|e| e.to_string())?;
        line.push('\n');

        let stream = UnixStream::connect(&self.sock_path)
            .await
            .map_err(|e| format!("model worker connect failed ({}): {e}", self.sock_path.display()))?;
        let (read_half, mut writer) = tokio::io::split(stream);
        let mut reader = BufReader::new(read_half);

        writer
            .write_all(line.as_bytes())
            .await
            .map_err(|e| format!("model worker write failed: {e}"))?;
        writer
            .flush()
            .await
            .map_err(|e| format!("model worker flush failed: {e}"))?;

        let mut resp_line = String::new();
        reader
            .read_line(&mut resp_line)
            .await
            .map_err(|e| format!("model worker read failed: {e}"))?;
        if resp_line.is_empty() {
            return Err("model worker closed connection".to_string());
        }

        let resp: RpcResponse = serde_json::from_str(&resp_line)
            .map_err(|e| format!("model worker response parse failed: {e}"))?;
        if resp.id != REQUEST_ID {
            return Err("model worker response id mismatch".to_string());
        }
        if !resp.ok {
            return Err(resp.error.unwrap_or_else(|| "model worker error".to_string()));
        }
        Ok(resp.result.unwrap_or(Value::Null))
    }

    async fn load_handle(&self, method: &str, name: &str) -> Result<String, EngineError> {
        let result = self
            .rpc(method, json!({ "name": name }))
            .await
            .map_err(EngineError::ModelUnavailable)?;
        result
            .get("handle")
            .and_then(|h| h.as_str())
            .map(str::to_string)
            .ok_or_else(|| EngineError::ModelUnavailable(format!("{method}: response has no handle")))
    }
}

/// `ModelProvider` backed by an out-of-process model worker.
pub struct SidecarModelProvider {
    client: Arc<ModelWorkerClient>,
}

impl SidecarModelProvider {
    pub fn new(sock_path: PathBuf) -> Self {
        Self {
            client: Arc::new(ModelWorkerClient::new(sock_path)),
        }
    }
}

#[async_trait]
impl ModelProvider for SidecarModelProvider {
    async fn load_tokenizer(&self, name: &str) -> Result<TokenizerHandle, EngineError> {
        let id = self.client.load_handle("load_tokenizer", name).await?;
        Ok(TokenizerHandle { name: name.to_string(), id })
    }

    async fn load_model(&self, name: &str) -> Result<ModelHandle, EngineError> {
        let id = self.client.load_handle("load_model", name).await?;
        Ok(ModelHandle { name: name.to_string(), id })
    }

    fn predictor(
        &self,
        model: ModelHandle,
        tokenizer: TokenizerHandle,
        device: &str,
        max_context: usize,
    ) -> Arc<dyn Predictor> {
        Arc::new(SidecarPredictor {
            client: Arc::clone(&self.client),
            model,
            tokenizer,
            device: device.to_string(),
            max_context,
        })
    }
}

pub struct SidecarPredictor {
    client: Arc<ModelWorkerClient>,
    model: ModelHandle,
    tokenizer: TokenizerHandle,
    device: String,
    max_context: usize,
}

#[async_trait]
impl Predictor for SidecarPredictor {
    async fn predict(
        &self,
        context: &[FrameRecord],
        context_timestamps: &[DateTime<Utc>],
        future_timestamps: &[DateTime<Utc>],
        horizon: usize,
        sampling: SamplingParams,
    ) -> Result<Frame, EngineError> {
        tracing::debug!(
            model = %self.model.name,
            tokenizer = %self.tokenizer.name,
            lookback = context.len(),
            horizon,
            "Sending predict request to model worker"
        );
        let params = json!({
            "model": self.model.id,
            "tokenizer": self.tokenizer.id,
            "device": self.device,
            "max_context": self.max_context,
            "context": context.iter().map(WireBar::from).collect::<Vec<_>>(),
            "context_timestamps": context_timestamps.iter().map(iso8601).collect::<Vec<_>>(),
            "future_timestamps": future_timestamps.iter().map(iso8601).collect::<Vec<_>>(),
            "pred_len": horizon,
            "temperature": sampling.temperature,
            "top_p": sampling.top_p,
            "sample_count": sampling.sample_count,
        });

        let result = self
            .client
            .rpc("predict", params)
            .await
            .map_err(|e| EngineError::PrimaryForecastError(format!("{}: {}", self.model.name, e)))?;
        let parsed: PredictResult = serde_json::from_value(result)
            .map_err(|e| EngineError::PrimaryForecastError(format!("malformed predict result: {e}")))?;

        if parsed.rows.len() != future_timestamps.len() {
            return Err(EngineError::PrimaryForecastError(format!(
                "model returned {} rows for {} future timestamps",
                parsed.rows.len(),
                future_timestamps.len()
            )));
        }

        let records = parsed
            .rows
            .into_iter()
            .zip(future_timestamps)
            .map(|(bar, ts)| FrameRecord {
                timestamp: *ts,
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                volume: bar.volume,
                amount: bar.amount,
            })
            .collect();
        Ok(Frame::new(records))
    }
}
