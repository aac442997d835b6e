use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub market_data: MarketDataConfig,
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub stream_path: String,
    /// Origins allowed to open a stream. Empty accepts every origin.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            stream_path: "/stock".to_string(),
            allowed_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarketDataConfig {
    pub base_url: String,
    pub range: String,
    pub interval: String,
    pub user_agent: String,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            range: "2y".to_string(),
            interval: "1d".to_string(),
            user_agent: concat!("stock-signal-stream/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub fast_period: usize,
    pub slow_period: usize,
    pub near_level_threshold: f64,
    pub prediction_minutes: f64,
    pub profit_target_pct: f64,
    pub stop_loss_pct: f64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            fast_period: 50,
            slow_period: 200,
            near_level_threshold: 0.01,
            prediction_minutes: 5.0,
            profit_target_pct: 0.05,
            stop_loss_pct: 0.05,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl StrategyConfig {
    pub fn validate(&self) -> Result<()> {
        if self.fast_period == 0 {
            bail!("strategy.fast_period must be > 0");
        }
        if self.fast_period >= self.slow_period {
            bail!(
                "strategy.fast_period ({}) must be less than strategy.slow_period ({})",
                self.fast_period,
                self.slow_period
            );
        }
        for (name, value) in [
            ("near_level_threshold", self.near_level_threshold),
            ("prediction_minutes", self.prediction_minutes),
            ("profit_target_pct", self.profit_target_pct),
            ("stop_loss_pct", self.stop_loss_pct),
        ] {
            if !value.is_finite() || value < 0.0 {
                bail!("strategy.{} must be a finite, non-negative number", name);
            }
        }
        Ok(())
    }
}

impl Config {
    /// Load `.env`, then the TOML file named by `SIGNAL_STREAM_CONFIG`
    /// (default `config/default.toml`). `SIGNAL_STREAM_BIND` overrides the
    /// listen address.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let path = std::env::var("SIGNAL_STREAM_CONFIG")
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::load_from_path(Path::new(&path))?;

        if let Ok(bind) = std::env::var("SIGNAL_STREAM_BIND") {
            config.server.bind_addr = bind;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.strategy.validate().context("strategy section is invalid")?;
        if !self.server.stream_path.starts_with('/') {
            bail!(
                "server.stream_path '{}' must start with '/'",
                self.server.stream_path
            );
        }
        if self.market_data.range.trim().is_empty() || self.market_data.interval.trim().is_empty()
        {
            bail!("market_data.range and market_data.interval must be set");
        }
        url::Url::parse(&self.market_data.base_url).with_context(|| {
            format!(
                "market_data.base_url '{}' is not a valid URL",
                self.market_data.base_url
            )
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_default_toml() {
        let toml_str = r#"
[server]
bind_addr = "127.0.0.1:9000"
stream_path = "/stock"
allowed_origins = ["http://localhost:3000"]

[market_data]
base_url = "https://query1.finance.yahoo.com"
range = "2y"
interval = "1d"
user_agent = "test-agent"

[strategy]
fast_period = 50
slow_period = 200
near_level_threshold = 0.01
prediction_minutes = 5.0
profit_target_pct = 0.05
stop_loss_pct = 0.05

[logging]
level = "debug"
json = true
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.server.allowed_origins.len(), 1);
        assert_eq!(config.market_data.range, "2y");
        assert_eq!(config.strategy.fast_period, 50);
        assert_eq!(config.strategy.slow_period, 200);
        assert!((config.strategy.near_level_threshold - 0.01).abs() < f64::EPSILON);
        assert!(config.logging.json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config: Config = toml::from_str("[logging]\nlevel = \"warn\"\n").unwrap();
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.server.stream_path, "/stock");
        assert!(config.server.allowed_origins.is_empty());
        assert_eq!(config.market_data.interval, "1d");
        assert_eq!(config.strategy.slow_period, 200);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_inverted_periods() {
        let strategy = StrategyConfig {
            fast_period: 200,
            slow_period: 50,
            ..StrategyConfig::default()
        };
        assert!(strategy.validate().is_err());

        let strategy = StrategyConfig {
            fast_period: 0,
            ..StrategyConfig::default()
        };
        assert!(strategy.validate().is_err());
    }

    #[test]
    fn rejects_negative_threshold_and_bad_paths() {
        let strategy = StrategyConfig {
            near_level_threshold: -0.01,
            ..StrategyConfig::default()
        };
        assert!(strategy.validate().is_err());

        let mut config: Config = toml::from_str("").unwrap();
        config.server.stream_path = "stock".to_string();
        assert!(config.validate().is_err());

        let mut config: Config = toml::from_str("").unwrap();
        config.market_data.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }
}
