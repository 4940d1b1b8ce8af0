// Forecasters and the model boundary they sit on.
//
// `primary` wraps a pretrained sequence model reached through `model`;
// `fallback` is the moving-average extrapolation used whenever the primary
// cannot produce a forecast; `postprocess` turns a raw predicted frame into
// the response schema.
pub mod fallback;
pub mod model;
pub mod postprocess;
pub mod primary;
pub mod sidecar;

use chrono::{DateTime, Duration, SecondsFormat, Utc};

pub use fallback::SimpleForecaster;
pub use model::{load_predictor, ModelProvider, Predictor, SamplingParams};
pub use primary::{KronosForecaster, PrimaryForecast};

/// ISO-8601 rendering used for every timestamp in a prediction response.
pub fn iso8601(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// `base + hours`, or `None` when the result leaves chrono's range.
pub fn hours_after(base: DateTime<Utc>, hours: usize) -> Option<DateTime<Utc>> {
    let hours = i64::try_from(hours).ok()?;
    base.checked_add_signed(Duration::try_hours(hours)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_hours_after() {
        let base = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        assert_eq!(hours_after(base, 2), Some(base + Duration::hours(2)));
        assert_eq!(hours_after(base, 0), Some(base));
        assert!(hours_after(DateTime::<Utc>::MAX_UTC, 1).is_none());
        assert!(hours_after(base, usize::MAX).is_none());
    }

    #[test]
    fn test_iso8601_whole_seconds() {
        let ts = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        assert_eq!(iso8601(&ts), "2023-11-14T22:13:20Z");
    }
}
