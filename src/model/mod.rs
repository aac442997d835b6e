pub mod price_series;
pub mod signal;

pub use price_series::PriceSeries;
pub use signal::{Action, Signal};
