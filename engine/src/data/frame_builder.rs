use chrono::{DateTime, Utc};
use shared::models::HistoricalSeries;

use crate::error::EngineError;
use crate::models::{Frame, FrameRecord};

/// Spread applied around the close to fake an intrabar range; price feeds only
/// carry one value per sample.
pub const HIGH_FACTOR: f64 = 1.01;
pub const LOW_FACTOR: f64 = 0.99;

/// Converts epoch milliseconds into a seconds-resolution UTC datetime.
pub fn millis_to_datetime(ts_millis: i64) -> Result<DateTime<Utc>, EngineError> {
    DateTime::from_timestamp(ts_millis.div_euclid(1000), 0)
        .ok_or_else(|| EngineError::RequestMalformed(format!("Invalid timestamp: {}", ts_millis)))
}

pub struct FrameBuilder;

impl FrameBuilder {
    /// One record per price sample, in input order.
    pub fn from_series(series: &HistoricalSeries) -> Result<Frame, EngineError> {
        let mut records = Vec::with_capacity(series.prices.len());

        for (idx, sample) in series.prices.iter().enumerate() {
            let timestamp = millis_to_datetime(sample.timestamp_ms)?;
            records.push(Self::synthetic_record(timestamp, sample.value, series.volume_at(idx)));
        }
        Ok(Frame::new(records))
    }

    fn synthetic_record(timestamp: DateTime<Utc>, price: f64, volume: f64) -> FrameRecord {
        FrameRecord {
            timestamp,
            open: price,
            high: price * HIGH_FACTOR,
            low: price * LOW_FACTOR,
            close: price,
            volume,
            amount: if volume > 0.0 { price * volume } else { 0.0 },
        }
    }
}
