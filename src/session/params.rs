use std::time::Duration;

use crate::error::ParamError;

/// Raw query string of a stream request.
#[derive(Debug, Clone, Default)]
pub struct StreamQuery {
    pub symbols: Option<String>,
    pub ticker: Option<String>,
}

impl StreamQuery {
    /// Build from decoded query pairs. A repeated key keeps its first value.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "symbols" => &mut query.symbols,
                "ticker" => &mut query.ticker,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }
}

/// Validated stream request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamParams {
    /// Client order, duplicates preserved.
    pub symbols: Vec<String>,
    pub tick: Duration,
}

impl StreamParams {
    /// Symbols are checked before the ticker, so a request missing both
    /// reports `MissingSymbols`.
    pub fn parse(query: &StreamQuery) -> Result<Self, ParamError> {
        let symbols = parse_symbols(query.symbols.as_deref().unwrap_or(""));
        if symbols.is_empty() {
            return Err(ParamError::MissingSymbols);
        }

        let raw_ticker = match query.ticker.as_deref() {
            None | Some("") => return Err(ParamError::MissingTicker),
            Some(raw) => raw,
        };
        let secs: i64 = raw_ticker.parse().map_err(|_| ParamError::InvalidTicker)?;
        if secs <= 0 {
            return Err(ParamError::InvalidTicker);
        }

        Ok(Self {
            symbols,
            tick: Duration::from_secs(secs as u64),
        })
    }
}

fn parse_symbols(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
