use proptest::prelude::*;

use stock_signal_stream::indicator::{FibonacciLevels, Indicators, SmaPeriods};
use stock_signal_stream::model::{Action, PriceSeries};
use stock_signal_stream::strategy::{is_near_level, FibTrendStrategy};

const FACTOR: f64 = 5.0 / (24.0 * 60.0);

fn compute(closes: Vec<f64>) -> Indicators {
    Indicators::compute(&PriceSeries::new(closes), SmaPeriods::default())
        .expect("series has enough history")
}

/// Two outliers pin low=50 and high=150, then `body` fills the middle and
/// `tail` the last 50 closes.
fn pinned_series(body: f64, tail: f64) -> Vec<f64> {
    let mut closes = vec![50.0, 150.0];
    closes.extend(std::iter::repeat(body).take(148));
    closes.extend(std::iter::repeat(tail).take(50));
    closes
}

#[test]
/// Verifies the flat-series edge:
/// 200 identical closes give equal averages and collapsed levels, so the
/// strategy holds at the series price.
fn flat_series_holds_at_price() {
    let ind = compute(vec![100.0; 200]);
    assert!((ind.sma_fast - 100.0).abs() < 1e-9);
    assert!((ind.sma_slow - 100.0).abs() < 1e-9);
    assert!(ind.fibonacci.all().iter().all(|&l| (l - 100.0).abs() < 1e-9));

    let d = FibTrendStrategy::default().decide_on(&ind);
    assert_eq!(d.action, Action::Hold);
    assert!((d.target - 100.0).abs() < 1e-9);
}

#[test]
/// Verifies the linear uptrend:
/// recent closes dominate so the fast SMA leads, but its value sits between
/// the 76.4% and 100% levels, so there is no trade.
fn linear_uptrend_without_nearby_level_holds() {
    let closes: Vec<f64> = (0..200).map(|i| 50.0 + 100.0 * i as f64 / 199.0).collect();
    let ind = compute(closes);
    assert!(ind.sma_fast > ind.sma_slow);
    assert!(!is_near_level(ind.sma_fast, &ind.fibonacci, 0.01));

    let d = FibTrendStrategy::default().decide_on(&ind);
    assert_eq!(d.action, Action::Hold);
    assert!((d.target - ind.sma_fast).abs() < 1e-12);
}

#[test]
/// Verifies the buy path:
/// fast SMA above slow SMA and resting on the 61.8% level gives a buy with a
/// 5% profit target over the projected price.
fn uptrend_on_618_level_buys() {
    let ind = compute(pinned_series(100.0, 111.8));
    assert!(ind.sma_fast > ind.sma_slow);
    assert!((ind.fibonacci.level_618 - 111.8).abs() < 1e-9);

    let d = FibTrendStrategy::default().decide_on(&ind);
    assert_eq!(d.action, Action::Buy);
    let predicted = ind.sma_fast * (1.0 + FACTOR);
    assert!((d.target - predicted * 1.05).abs() < 1e-9);
}

#[test]
/// Verifies the sell path:
/// fast SMA below slow SMA and resting on the 38.2% level gives a sell with a
/// 5% stop under the projected price.
fn downtrend_on_382_level_sells() {
    let ind = compute(pinned_series(120.0, 88.2));
    assert!(ind.sma_fast < ind.sma_slow);

    let d = FibTrendStrategy::default().decide_on(&ind);
    assert_eq!(d.action, Action::Sell);
    let predicted = ind.sma_fast * (1.0 - FACTOR);
    assert!((d.target - predicted * 0.95).abs() < 1e-9);
}

fn series_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.01f64..10_000.0, 200..400)
}

proptest! {
    #[test]
    fn moving_averages_stay_within_series_range(closes in series_strategy()) {
        let series = PriceSeries::new(closes);
        let (low, high) = series.range().unwrap();
        let ind = Indicators::compute(&series, SmaPeriods::default()).unwrap();
        let eps = 1e-9 * high.max(1.0);
        prop_assert!(ind.sma_fast >= low - eps && ind.sma_fast <= high + eps);
        prop_assert!(ind.sma_slow >= low - eps && ind.sma_slow <= high + eps);
    }

    #[test]
    fn fibonacci_levels_are_ordered(closes in series_strategy()) {
        let levels = FibonacciLevels::from_series(&PriceSeries::new(closes)).unwrap();
        let all = levels.all();
        for pair in all.windows(2) {
            prop_assert!(pair[0] <= pair[1], "levels out of order: {:?}", all);
        }
    }

    #[test]
    fn decide_is_deterministic(
        fast in 0.0f64..1_000.0,
        slow in 0.0f64..1_000.0,
        low in 0.0f64..1_000.0,
        span in 0.0f64..500.0,
    ) {
        let strat = FibTrendStrategy::default();
        let levels = FibonacciLevels::from_range(low, low + span);
        prop_assert_eq!(strat.decide(fast, slow, &levels), strat.decide(fast, slow, &levels));
    }

    #[test]
    fn never_trades_away_from_levels(
        fast in 0.0f64..1_000.0,
        slow in 0.0f64..1_000.0,
        low in 0.0f64..1_000.0,
        span in 0.0f64..500.0,
    ) {
        let levels = FibonacciLevels::from_range(low, low + span);
        let d = FibTrendStrategy::default().decide(fast, slow, &levels);
        if !is_near_level(fast, &levels, 0.01) {
            prop_assert_eq!(d.action, Action::Hold);
            prop_assert_eq!(d.target, fast);
        }
    }
}
