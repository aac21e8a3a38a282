//! Close slope — ordinary least-squares slope of the last `period` closes,
//! in price units per candle.
//!
//! Lookback: period - 1.

use crate::domain::Candle;
use crate::indicators::Indicator;

#[derive(Debug, Clone)]
pub struct CloseSlope {
    period: usize,
    name: String,
}

impl CloseSlope {
    pub fn new(period: usize) -> Self {
        assert!(period >= 2, "slope period must be >= 2");
        Self {
            period,
            name: format!("close_slope_{period}"),
        }
    }
}

/// OLS slope of `values` against their index.
pub(crate) fn ols_slope(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    if values.len() < 2 {
        return 0.0;
    }
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = values.iter().sum::<f64>() / n;
    let mut num = 0.0;
    let mut den = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        num += dx * (y - y_mean);
        den += dx * dx;
    }
    num / den
}

impl Indicator for CloseSlope {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let n = candles.len();
        let mut result = vec![f64::NAN; n];
        if n < self.period {
            return result;
        }

        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        for i in (self.period - 1)..n {
            result[i] = ols_slope(&closes[i + 1 - self.period..=i]);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_candles, DEFAULT_EPSILON};

    #[test]
    fn linear_rise_has_unit_slope() {
        let candles = make_candles(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let result = CloseSlope::new(3).compute(&candles);
        assert!(result[1].is_nan());
        assert_approx(result[2], 1.0, DEFAULT_EPSILON);
        assert_approx(result[4], 1.0, DEFAULT_EPSILON);
    }

    #[test]
    fn flat_closes_have_zero_slope() {
        let candles = make_candles(&[50.0; 4]);
        let result = CloseSlope::new(4).compute(&candles);
        assert_approx(result[3], 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn falling_closes_have_negative_slope() {
        let candles = make_candles(&[20.0, 18.0, 16.0]);
        let result = CloseSlope::new(3).compute(&candles);
        assert_approx(result[2], -2.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ols_of_single_value_is_zero() {
        assert_eq!(ols_slope(&[5.0]), 0.0);
    }
}
