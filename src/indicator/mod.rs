pub mod fibonacci;
pub mod sma;

pub use fibonacci::FibonacciLevels;
pub use sma::trailing_sma;

use crate::error::SignalError;
use crate::model::PriceSeries;

/// Lookback lengths for the two moving averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmaPeriods {
    pub fast: usize,
    pub slow: usize,
}

impl Default for SmaPeriods {
    fn default() -> Self {
        Self {
            fast: 50,
            slow: 200,
        }
    }
}

impl SmaPeriods {
    /// Minimum series length for both averages to be defined.
    pub fn required_history(&self) -> usize {
        self.fast.max(self.slow)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Indicators {
    pub sma_fast: f64,
    pub sma_slow: f64,
    pub fibonacci: FibonacciLevels,
}

impl Indicators {
    /// Fails with `InsufficientHistory` instead of averaging a truncated window.
    pub fn compute(series: &PriceSeries, periods: SmaPeriods) -> Result<Self, SignalError> {
        let closes = series.closes();
        let insufficient = || SignalError::InsufficientHistory {
            required: periods.required_history(),
            available: closes.len(),
        };
        if closes.len() < periods.required_history() {
            return Err(insufficient());
        }

        let sma_fast = trailing_sma(closes, periods.fast).ok_or_else(insufficient)?;
        let sma_slow = trailing_sma(closes, periods.slow).ok_or_else(insufficient)?;
        let fibonacci = FibonacciLevels::from_series(series).ok_or_else(insufficient)?;

        Ok(Self {
            sma_fast,
            sma_slow,
            fibonacci,
        })
    }
}
