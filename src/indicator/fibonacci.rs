use serde::Serialize;

use crate::model::PriceSeries;

/// Retracement ratios, lowest first.
pub const FIB_RATIOS: [f64; 7] = [0.0, 0.236, 0.382, 0.5, 0.618, 0.764, 1.0];

/// Retracement levels over a series' low/high range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FibonacciLevels {
    pub level_0: f64,
    #[serde(rename = "level_23.6")]
    pub level_236: f64,
    #[serde(rename = "level_38.2")]
    pub level_382: f64,
    #[serde(rename = "level_50")]
    pub level_500: f64,
    #[serde(rename = "level_61.8")]
    pub level_618: f64,
    #[serde(rename = "level_76.4")]
    pub level_764: f64,
    #[serde(rename = "level_100")]
    pub level_100: f64,
}

impl FibonacciLevels {
    pub fn from_range(low: f64, high: f64) -> Self {
        let diff = high - low;
        let level = |ratio: f64| low + diff * ratio;
        Self {
            level_0: low,
            level_236: level(FIB_RATIOS[1]),
            level_382: level(FIB_RATIOS[2]),
            level_500: level(FIB_RATIOS[3]),
            level_618: level(FIB_RATIOS[4]),
            level_764: level(FIB_RATIOS[5]),
            level_100: high,
        }
    }

    /// Levels over the series extrema. `None` for an empty series.
    pub fn from_series(series: &PriceSeries) -> Option<Self> {
        let (low, high) = series.range()?;
        Some(Self::from_range(low, high))
    }

    pub fn all(&self) -> [f64; 7] {
        [
            self.level_0,
            self.level_236,
            self.level_382,
            self.level_500,
            self.level_618,
            self.level_764,
            self.level_100,
        ]
    }

    /// 23.6% through 76.4%; the 0% and 100% extremes are excluded.
    pub fn interior(&self) -> [f64; 5] {
        [
            self.level_236,
            self.level_382,
            self.level_500,
            self.level_618,
            self.level_764,
        ]
    }
}
