use crate::config::StrategyConfig;
use crate::indicator::{FibonacciLevels, Indicators};
use crate::model::Action;

const MINUTES_PER_DAY: f64 = 24.0 * 60.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FibTrendParams {
    /// Relative distance to a level that still counts as "near".
    pub near_level_threshold: f64,
    /// Projection horizon, as minutes of a trading day.
    pub prediction_minutes: f64,
    pub profit_target_pct: f64,
    pub stop_loss_pct: f64,
}

impl Default for FibTrendParams {
    fn default() -> Self {
        Self {
            near_level_threshold: 0.01,
            prediction_minutes: 5.0,
            profit_target_pct: 0.05,
            stop_loss_pct: 0.05,
        }
    }
}

impl From<&StrategyConfig> for FibTrendParams {
    fn from(cfg: &StrategyConfig) -> Self {
        Self {
            near_level_threshold: cfg.near_level_threshold,
            prediction_minutes: cfg.prediction_minutes,
            profit_target_pct: cfg.profit_target_pct,
            stop_loss_pct: cfg.stop_loss_pct,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub action: Action,
    pub target: f64,
}

/// SMA trend projection gated by proximity to an interior Fibonacci level.
///
/// The fast SMA stands in for the current price. Its projection is nudged up
/// when the fast SMA is above the slow one and down when below; the strategy
/// only acts when the fast SMA sits near a retracement level.
#[derive(Debug, Clone, Copy, Default)]
pub struct FibTrendStrategy {
    params: FibTrendParams,
}

impl FibTrendStrategy {
    pub fn new(params: FibTrendParams) -> Self {
        Self { params }
    }

    pub fn prediction_factor(&self) -> f64 {
        self.params.prediction_minutes / MINUTES_PER_DAY
    }

    pub fn decide(&self, sma_fast: f64, sma_slow: f64, levels: &FibonacciLevels) -> Decision {
        let current = sma_fast;
        let near_level = is_near_level(current, levels, self.params.near_level_threshold);

        let factor = self.prediction_factor();
        let predicted = if sma_fast > sma_slow {
            current * (1.0 + factor)
        } else if sma_fast < sma_slow {
            current * (1.0 - factor)
        } else {
            current
        };

        if near_level && predicted > current {
            Decision {
                action: Action::Buy,
                target: predicted * (1.0 + self.params.profit_target_pct),
            }
        } else if near_level && predicted < current {
            Decision {
                action: Action::Sell,
                target: predicted * (1.0 - self.params.stop_loss_pct),
            }
        } else {
            Decision {
                action: Action::Hold,
                target: current,
            }
        }
    }

    pub fn decide_on(&self, indicators: &Indicators) -> Decision {
        self.decide(
            indicators.sma_fast,
            indicators.sma_slow,
            &indicators.fibonacci,
        )
    }
}

/// Whether `price` is within `threshold` relative distance of any interior
/// level. A level of exactly zero never counts as near.
pub fn is_near_level(price: f64, levels: &FibonacciLevels, threshold: f64) -> bool {
    levels
        .interior()
        .iter()
        .filter(|&&level| level != 0.0)
        .any(|&level| ((price - level) / level).abs() <= threshold)
}
