// Moving-average trend extrapolation used when the model cannot answer.
use chrono::{DateTime, Utc};
use rand::Rng;
use shared::models::{ForecastPoint, HistoricalSeries, ModelKind, PredictionResult, Trend};

use super::{hours_after, iso8601};
use crate::error::EngineError;
use crate::indicators::Sma;

pub const FALLBACK_CONFIDENCE: f64 = 0.6;
/// Peak-to-peak width of the per-hour noise term (±1%).
pub const NOISE_SPAN: f64 = 0.02;

pub struct SimpleForecaster {
    short: Sma,
    long: Sma,
}

impl Default for SimpleForecaster {
    fn default() -> Self {
        Self {
            short: Sma::new(7),
            long: Sma::new(30),
        }
    }
}

impl SimpleForecaster {
    /// Returns `None` when the series has no prices or the horizon runs past
    /// the representable time range.
    pub fn forecast<R: Rng>(
        &self,
        series: &HistoricalSeries,
        horizon: usize,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Option<PredictionResult> {
        match self.try_forecast(series, horizon, rng, now) {
            Ok(result) => Some(result),
            Err(e) => {
                tracing::warn!(error = %e, "Simple prediction failed");
                None
            }
        }
    }

    /// Hour `i` is `current * (1 + trend / 24 * i + noise_i)`, stamped at
    /// `now + i` hours. `noise_i` is drawn uniformly from `rng`.
    pub fn try_forecast<R: Rng>(
        &self,
        series: &HistoricalSeries,
        horizon: usize,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<PredictionResult, EngineError> {
        let prices = series.price_values();
        let current_price = *prices
            .last()
            .ok_or_else(|| EngineError::FallbackForecastError("no price history".to_string()))?;

        let out_of_range = |hour: usize| {
            EngineError::FallbackForecastError(format!("{}h after {} is out of range", hour, iso8601(&now)))
        };
        if hours_after(now, horizon).is_none() {
            return Err(out_of_range(horizon));
        }

        let trend = self.trend(&prices);
        let hourly_change = trend / 24.0;

        let predictions = (1..=horizon)
            .map(|hour| -> Result<ForecastPoint, EngineError> {
                let timestamp = hours_after(now, hour).ok_or_else(|| out_of_range(hour))?;
                let noise = (rng.gen::<f64>() - 0.5) * NOISE_SPAN;
                Ok(ForecastPoint {
                    hour: hour as u32,
                    price: current_price * (1.0 + hourly_change * hour as f64 + noise),
                    high: None,
                    low: None,
                    volume: None,
                    timestamp: iso8601(&timestamp),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let price_24h = predictions.last().map_or(current_price, |p| p.price);
        tracing::debug!(trend, current_price, price_24h, "Simple forecast computed");

        Ok(PredictionResult {
            price_24h,
            confidence: FALLBACK_CONFIDENCE,
            trend: Trend::from_prices(price_24h, current_price),
            predictions,
            model: ModelKind::Simple,
        })
    }

    /// Relative gap between the short and long moving averages.
    fn trend(&self, prices: &[f64]) -> f64 {
        match (self.short.latest(prices), self.long.latest(prices)) {
            (Some(short), Some(long)) if long > 0.0 => (short - long) / long,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use shared::models::Sample;

    /// Every `gen::<f64>()` from this generator is exactly 0.5, so the noise
    /// term vanishes.
    pub(crate) fn zero_noise() -> StepRng {
        StepRng::new(1 << 63, 0)
    }

    fn series(prices: &[f64]) -> HistoricalSeries {
        HistoricalSeries {
            prices: prices
                .iter()
                .enumerate()
                .map(|(i, &p)| Sample::new(1_700_000_000_000 + i as i64 * 3_600_000, p))
                .collect(),
            volumes: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_750_000_000, 0).unwrap()
    }

    #[test]
    fn test_zero_noise_generator() {
        let mut rng = zero_noise();
        assert_eq!(rng.gen::<f64>(), 0.5);
    }

    #[test]
    fn test_empty_series_is_none() {
        let forecaster = SimpleForecaster::default();
        assert!(forecaster.forecast(&series(&[]), 24, &mut zero_noise(), now()).is_none());
        let err = forecaster.try_forecast(&series(&[]), 24, &mut zero_noise(), now()).unwrap_err();
        assert!(matches!(err, EngineError::FallbackForecastError(_)));
    }

    #[test]
    fn test_rising_series_is_bullish() {
        // 60 points rising linearly from 100 to 130.
        let prices: Vec<f64> = (0..60).map(|i| 100.0 + 30.0 * i as f64 / 59.0).collect();
        let result = SimpleForecaster::default()
            .forecast(&series(&prices), 24, &mut zero_noise(), now())
            .unwrap();
        assert_eq!(result.model, ModelKind::Simple);
        assert_eq!(result.trend, Trend::Bullish);
        assert_eq!(result.predictions.len(), 24);
        assert_eq!(result.confidence, FALLBACK_CONFIDENCE);
        assert!(result.price_24h > 130.0);
    }

    #[test]
    fn test_flat_series_single_hour_is_bearish() {
        let result = SimpleForecaster::default()
            .forecast(&series(&[100.0; 60]), 1, &mut zero_noise(), now())
            .unwrap();
        assert_eq!(result.price_24h, 100.0);
        assert_eq!(result.trend, Trend::Bearish);
        assert_eq!(result.predictions.len(), 1);
    }

    #[test]
    fn test_extrapolation_formula() {
        // ma7 = 20, ma30 = mean(10 x 23, 20 x 7) = 12.333..
        let mut prices = vec![10.0; 23];
        prices.extend([20.0; 7]);
        let ma30 = (10.0 * 23.0 + 20.0 * 7.0) / 30.0;
        let trend = (20.0 - ma30) / ma30;

        let result = SimpleForecaster::default()
            .forecast(&series(&prices), 3, &mut zero_noise(), now())
            .unwrap();
        for (i, point) in result.predictions.iter().enumerate() {
            let hour = (i + 1) as f64;
            let expected = 20.0 * (1.0 + trend / 24.0 * hour);
            assert!((point.price - expected).abs() < 1e-9, "hour {}: {} vs {}", hour, point.price, expected);
        }
    }

    #[test]
    fn test_timestamps_from_wall_clock() {
        let result = SimpleForecaster::default()
            .forecast(&series(&[5.0, 6.0]), 2, &mut zero_noise(), now())
            .unwrap();
        assert_eq!(result.predictions[0].timestamp, iso8601(&(now() + Duration::hours(1))));
        assert_eq!(result.predictions[1].timestamp, iso8601(&(now() + Duration::hours(2))));
        assert_eq!(result.predictions[0].hour, 1);
        assert!(result.predictions[0].high.is_none());
        assert!(result.predictions[0].volume.is_none());
    }

    #[test]
    fn test_noise_bounded_to_one_percent() {
        let mut rng = StdRng::seed_from_u64(7);
        let result = SimpleForecaster::default()
            .forecast(&series(&[100.0; 40]), 200, &mut rng, now())
            .unwrap();
        for point in &result.predictions {
            assert!(point.price >= 99.0 && point.price <= 101.0, "{}", point.price);
        }
        assert_eq!(result.confidence, FALLBACK_CONFIDENCE);
    }

    #[test]
    fn test_non_positive_long_average_means_no_trend() {
        let result = SimpleForecaster::default()
            .forecast(&series(&[-10.0, -5.0, 0.0]), 2, &mut zero_noise(), now())
            .unwrap();
        // current price is 0, so every prediction is 0 and the tie is bearish.
        assert!(result.predictions.iter().all(|p| p.price == 0.0));
        assert_eq!(result.trend, Trend::Bearish);
    }

    #[test]
    fn test_zero_horizon_keeps_current_price() {
        let result = SimpleForecaster::default()
            .forecast(&series(&[42.0]), 0, &mut zero_noise(), now())
            .unwrap();
        assert!(result.predictions.is_empty());
        assert_eq!(result.price_24h, 42.0);
        assert_eq!(result.trend, Trend::Bearish);
    }

    #[test]
    fn test_horizon_past_range_end_is_none() {
        let near_end = DateTime::<Utc>::MAX_UTC - Duration::hours(1);
        let forecaster = SimpleForecaster::default();
        assert!(forecaster.forecast(&series(&[1.0, 2.0]), 2, &mut zero_noise(), near_end).is_none());
        let err = forecaster
            .try_forecast(&series(&[1.0, 2.0]), usize::MAX, &mut zero_noise(), now())
            .unwrap_err();
        assert!(matches!(err, EngineError::FallbackForecastError(_)));
        let last_hour = forecaster
            .forecast(&series(&[1.0, 2.0]), 1, &mut zero_noise(), near_end)
            .unwrap();
        assert_eq!(last_hour.predictions.len(), 1);
    }
}
