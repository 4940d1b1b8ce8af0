use serde::{Deserialize, Serialize};

/// One `[timestamp_ms, value]` pair as sent by price feeds.
///
/// Timestamps arrive as JSON numbers that may carry a fractional part; they are
/// truncated to whole milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(i64, f64)")]
pub struct Sample {
    pub timestamp_ms: i64,
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp_ms: i64, value: f64) -> Self {
        Self { timestamp_ms, value }
    }
}

impl From<(f64, f64)> for Sample {
    fn from((timestamp_ms, value): (f64, f64)) -> Self {
        Self {
            timestamp_ms: timestamp_ms as i64,
            value,
        }
    }
}

impl From<Sample> for (i64, f64) {
    fn from(sample: Sample) -> Self {
        (sample.timestamp_ms, sample.value)
    }
}

/// Price history with an optional volume series.
///
/// `volumes[i]` belongs to `prices[i]`; the two arrays are matched by index,
/// not by timestamp.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoricalSeries {
    #[serde(default)]
    pub prices: Vec<Sample>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volumes: Option<Vec<Sample>>,
}

impl HistoricalSeries {
    pub fn price_values(&self) -> Vec<f64> {
        self.prices.iter().map(|s| s.value).collect()
    }

    /// Volume paired with the price at `index`, 0 when absent.
    pub fn volume_at(&self, index: usize) -> f64 {
        self.volumes
            .as_ref()
            .and_then(|v| v.get(index))
            .map_or(0.0, |s| s.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Bullish,
    Bearish,
}

impl Trend {
    /// Ties resolve to `Bearish`.
    pub fn from_prices(predicted: f64, reference: f64) -> Self {
        if predicted > reference {
            Trend::Bullish
        } else {
            Trend::Bearish
        }
    }
}

/// Which forecaster produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Kronos,
    Simple,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub hour: u32,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub price_24h: f64,
    pub confidence: f64,
    pub trend: Trend,
    pub predictions: Vec<ForecastPoint>,
    pub model: ModelKind,
}
