use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use url::Url;

use super::PriceSource;
use crate::config::MarketDataConfig;
use crate::error::SignalError;
use crate::model::PriceSeries;

#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
pub struct ChartEnvelope {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
pub struct ChartError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    #[serde(default)]
    pub indicators: Option<ChartIndicators>,
}

#[derive(Debug, Deserialize)]
pub struct ChartIndicators {
    #[serde(default)]
    pub quote: Vec<QuoteColumns>,
}

#[derive(Debug, Deserialize)]
pub struct QuoteColumns {
    #[serde(default)]
    pub close: Option<Vec<Option<f64>>>,
}

/// Daily-history client for the Yahoo Finance v8 chart endpoint.
pub struct YahooChartClient {
    http: reqwest::Client,
    base_url: Url,
    range: String,
    interval: String,
}

impl YahooChartClient {
    pub fn new(cfg: &MarketDataConfig) -> anyhow::Result<Self> {
        use anyhow::Context;

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&cfg.user_agent).context("invalid market_data.user_agent")?,
        );
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("failed to build market data HTTP client")?;
        let base_url = Url::parse(&cfg.base_url)
            .with_context(|| format!("invalid market_data.base_url '{}'", cfg.base_url))?;
        Ok(Self {
            http,
            base_url,
            range: cfg.range.clone(),
            interval: cfg.interval.clone(),
        })
    }

    pub fn chart_url(&self, symbol: &str) -> Result<Url, SignalError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SignalError::unavailable(symbol, "base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        url.query_pairs_mut()
            .append_pair("interval", &self.interval)
            .append_pair("range", &self.range);
        Ok(url)
    }

    async fn fetch_series(&self, symbol: &str) -> Result<PriceSeries, SignalError> {
        let url = self.chart_url(symbol)?;
        tracing::debug!(symbol, url = %url, "Fetching daily history");

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| SignalError::unavailable(symbol, format!("request failed: {}", e)))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| SignalError::unavailable(symbol, format!("body read failed: {}", e)))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ChartResponse>(&body)
                .ok()
                .and_then(|r| r.chart.error)
                .map(|e| format!("{}: {}", e.code, e.description))
                .unwrap_or_else(|| compact_error_body(&body));
            return Err(SignalError::unavailable(
                symbol,
                format!("HTTP {}: {}", status.as_u16(), detail),
            ));
        }

        parse_chart_body(symbol, &body)
    }
}

impl PriceSource for YahooChartClient {
    async fn fetch(&self, symbol: &str) -> Result<PriceSeries, SignalError> {
        self.fetch_series(symbol).await
    }
}

/// Decode a chart response body into a close-price series.
pub fn parse_chart_body(symbol: &str, body: &str) -> Result<PriceSeries, SignalError> {
    let resp: ChartResponse = serde_json::from_str(body)
        .map_err(|e| SignalError::unavailable(symbol, format!("unexpected response shape: {}", e)))?;
    closes_from_chart(symbol, resp)
}

pub fn closes_from_chart(symbol: &str, resp: ChartResponse) -> Result<PriceSeries, SignalError> {
    let ChartEnvelope { result, error } = resp.chart;
    let first = result.and_then(|r| r.into_iter().next()).ok_or_else(|| {
        let reason = error
            .map(|e| format!("provider error {}: {}", e.code, e.description))
            .unwrap_or_else(|| "no result for symbol".to_string());
        SignalError::unavailable(symbol, reason)
    })?;

    let raw = first
        .indicators
        .and_then(|ind| ind.quote.into_iter().next())
        .and_then(|q| q.close)
        .ok_or_else(|| SignalError::unavailable(symbol, "response has no close prices"))?;

    let series = PriceSeries::from_raw_closes(raw);
    if series.is_empty() {
        return Err(SignalError::unavailable(symbol, "close prices are all missing"));
    }
    Ok(series)
}

fn compact_error_body(body: &str) -> String {
    let normalized = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.chars().count() > 180 {
        format!("{}...", normalized.chars().take(180).collect::<String>())
    } else {
        normalized
    }
}
