// Request parsing for the predict endpoint
use serde::Deserialize;
use shared::models::HistoricalSeries;

use crate::error::EngineError;

pub const DEFAULT_SYMBOL: &str = "BTC";
pub const DEFAULT_PRED_HOURS: usize = 24;

#[derive(Debug, Deserialize)]
struct PredictBody {
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    data: Option<HistoricalSeries>,
    #[serde(default)]
    pred_hours: Option<HoursField>,
}

/// `pred_hours` as clients send it: an integer, a float, or a numeric string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HoursField {
    Int(i64),
    Float(f64),
    Text(String),
}

impl HoursField {
    fn to_i64(&self) -> Result<i64, EngineError> {
        match self {
            HoursField::Int(n) => Ok(*n),
            // `as` saturates, which the horizon checks downstream reject.
            HoursField::Float(f) if f.is_finite() => Ok(f.trunc() as i64),
            HoursField::Float(f) => Err(EngineError::RequestMalformed(format!("Invalid pred_hours: {}", f))),
            HoursField::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| EngineError::RequestMalformed(format!("Invalid pred_hours: {:?}", s))),
        }
    }
}

/// A validated predict request with defaults applied.
#[derive(Debug, Clone)]
pub struct PredictRequest {
    pub symbol: String,
    pub series: HistoricalSeries,
    /// Forecast horizon in hours; zero or negative input becomes 0.
    pub pred_hours: usize,
}

pub fn parse_predict_request(body: &[u8], max_pred_hours: Option<usize>) -> Result<PredictRequest, EngineError> {
    let parsed: PredictBody = serde_json::from_slice(body)
        .map_err(|e| EngineError::RequestMalformed(format!("Invalid request body: {}", e)))?;

    let pred_hours = match &parsed.pred_hours {
        Some(field) => usize::try_from(field.to_i64()?.max(0)).unwrap_or(usize::MAX),
        None => DEFAULT_PRED_HOURS,
    };
    if let Some(max) = max_pred_hours {
        if pred_hours > max {
            return Err(EngineError::RequestMalformed(format!(
                "pred_hours must be at most {}, got {}",
                max, pred_hours
            )));
        }
    }

    Ok(PredictRequest {
        symbol: parsed.symbol.unwrap_or_else(|| DEFAULT_SYMBOL.to_string()),
        series: parsed.data.unwrap_or_default(),
        pred_hours,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hours(body: &str) -> usize {
        parse_predict_request(body.as_bytes(), None).unwrap().pred_hours
    }

    #[test]
    fn test_defaults_applied() {
        let req = parse_predict_request(br#"{"data": {"prices": [[1700000000000, 1.5]]}}"#, None).unwrap();
        assert_eq!(req.symbol, "BTC");
        assert_eq!(req.pred_hours, 24);
        assert_eq!(req.series.prices.len(), 1);
        assert_eq!(hours(r#"{"pred_hours": null}"#), 24);
    }

    #[test]
    fn test_explicit_fields() {
        let req = parse_predict_request(
            br#"{"symbol": "DOT", "pred_hours": 6, "data": {"prices": [], "volumes": [[1, 2]]}}"#,
            None,
        )
        .unwrap();
        assert_eq!(req.symbol, "DOT");
        assert_eq!(req.pred_hours, 6);
        assert!(req.series.prices.is_empty());
        assert_eq!(req.series.volumes.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_missing_data_is_empty_series() {
        let req = parse_predict_request(br#"{"data": {}}"#, None).unwrap();
        assert!(req.series.prices.is_empty());
        let req = parse_predict_request(b"{}", None).unwrap();
        assert!(req.series.prices.is_empty());
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let err = parse_predict_request(b"not json", None).unwrap_err();
        assert!(matches!(err, EngineError::RequestMalformed(ref m) if m.starts_with("Invalid request body")));
    }

    #[test]
    fn test_wrong_sample_shape_is_malformed() {
        let err = parse_predict_request(br#"{"data": {"prices": [[1, "x"]]}}"#, None).unwrap_err();
        assert!(matches!(err, EngineError::RequestMalformed(_)));
    }

    #[test]
    fn test_non_positive_pred_hours_is_empty_horizon() {
        assert_eq!(hours(r#"{"pred_hours": 0}"#), 0);
        assert_eq!(hours(r#"{"pred_hours": -3}"#), 0);
        assert_eq!(hours(r#"{"pred_hours": "-1"}"#), 0);
    }

    #[test]
    fn test_no_ceiling_by_default() {
        assert_eq!(hours(r#"{"pred_hours": 1000}"#), 1000);
    }

    #[test]
    fn test_configured_ceiling() {
        assert!(parse_predict_request(br#"{"pred_hours": 721}"#, Some(720)).is_err());
        assert_eq!(parse_predict_request(br#"{"pred_hours": 720}"#, Some(720)).unwrap().pred_hours, 720);
        assert_eq!(parse_predict_request(br#"{"pred_hours": 0}"#, Some(720)).unwrap().pred_hours, 0);
    }

    #[test]
    fn test_lenient_pred_hours() {
        assert_eq!(hours(r#"{"pred_hours": "6"}"#), 6);
        assert_eq!(hours(r#"{"pred_hours": " 12 "}"#), 12);
        assert_eq!(hours(r#"{"pred_hours": 6.0}"#), 6);
        assert_eq!(hours(r#"{"pred_hours": 6.9}"#), 6);
    }

    #[test]
    fn test_unparseable_pred_hours_is_malformed() {
        let err = parse_predict_request(br#"{"pred_hours": "six"}"#, None).unwrap_err();
        assert!(matches!(err, EngineError::RequestMalformed(ref m) if m.contains("pred_hours")));
        assert!(parse_predict_request(br#"{"pred_hours": true}"#, None).is_err());
    }
}
