// Simple Moving Average (SMA) over the tail of a price series
use shared::utils::mean;

#[derive(Debug, Clone, Copy)]
pub struct Sma {
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        if period == 0 {
            panic!("SMA period must be greater than 0");
        }
        Self { period }
    }

    /// Mean of the last `period` values. A series shorter than the period is
    /// averaged over whatever is there; `None` only for an empty series.
    pub fn latest(&self, values: &[f64]) -> Option<f64> {
        let start = values.len().saturating_sub(self.period);
        mean(&values[start..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma_latest_window() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        // (3+4+5)/3
        assert_eq!(Sma::new(3).latest(&values), Some(4.0));
    }

    #[test]
    fn test_sma_short_series_uses_all_values() {
        let values = [2.0, 4.0];
        assert_eq!(Sma::new(30).latest(&values), Some(3.0));
    }

    #[test]
    fn test_sma_period_one() {
        assert_eq!(Sma::new(1).latest(&[1.0, 2.0, 3.0]), Some(3.0));
    }

    #[test]
    fn test_sma_empty_data() {
        assert_eq!(Sma::new(7).latest(&[]), None);
    }

    #[test]
    #[should_panic(expected = "SMA period must be greater than 0")]
    fn test_sma_period_zero_panic() {
        Sma::new(0);
    }
}
