pub mod yahoo;

pub use yahoo::YahooChartClient;

use std::future::Future;

use crate::error::SignalError;
use crate::model::PriceSeries;

/// A source of daily closing prices for one symbol.
///
/// Every call is a fresh fetch: implementations do not retry or cache.
pub trait PriceSource: Send + Sync {
    fn fetch(&self, symbol: &str) -> impl Future<Output = Result<PriceSeries, SignalError>> + Send;
}
