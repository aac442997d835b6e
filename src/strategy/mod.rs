pub mod fib_trend;

pub use fib_trend::{is_near_level, Decision, FibTrendParams, FibTrendStrategy};
