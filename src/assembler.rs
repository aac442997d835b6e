use crate::config::StrategyConfig;
use crate::error::SignalError;
use crate::indicator::{Indicators, SmaPeriods};
use crate::market_data::PriceSource;
use crate::model::Signal;
use crate::strategy::{FibTrendParams, FibTrendStrategy};

/// Fetch, compute indicators, decide: one signal per call.
pub struct SignalAssembler<S> {
    source: S,
    periods: SmaPeriods,
    strategy: FibTrendStrategy,
}

impl<S: PriceSource> SignalAssembler<S> {
    pub fn new(source: S, periods: SmaPeriods, strategy: FibTrendStrategy) -> Self {
        Self {
            source,
            periods,
            strategy,
        }
    }

    pub fn from_config(source: S, cfg: &StrategyConfig) -> Self {
        Self::new(
            source,
            SmaPeriods {
                fast: cfg.fast_period,
                slow: cfg.slow_period,
            },
            FibTrendStrategy::new(FibTrendParams::from(cfg)),
        )
    }

    pub async fn build_signal(&self, symbol: &str) -> Result<Signal, SignalError> {
        let series = self.source.fetch(symbol).await?;
        let indicators = Indicators::compute(&series, self.periods)?;
        let decision = self.strategy.decide_on(&indicators);
        // Reported price is the literal last close, not the strategy's SMA basis.
        let current_price = series
            .last_close()
            .ok_or_else(|| SignalError::unavailable(symbol, "empty price series"))?;

        tracing::debug!(
            symbol,
            sma_fast = indicators.sma_fast,
            sma_slow = indicators.sma_slow,
            action = %decision.action,
            target = decision.target,
            "Signal computed"
        );

        Ok(Signal {
            symbol: symbol.to_string(),
            action: decision.action,
            target: decision.target,
            current_price,
        })
    }
}
