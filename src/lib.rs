pub mod assembler;
pub mod config;
pub mod error;
pub mod indicator;
pub mod market_data;
pub mod model;
pub mod server;
pub mod session;
pub mod strategy;
