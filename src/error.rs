use thiserror::Error;

/// Invalid stream request parameters. The `Display` text is sent verbatim to
/// the client before the connection is closed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParamError {
    #[error("Error: Stock symbol required.")]
    MissingSymbols,

    #[error("Error: missing ticker parameter.")]
    MissingTicker,

    #[error("Error: Invalid ticker parameter value.")]
    InvalidTicker,
}

/// Failure to produce a signal for one symbol. Recovered per symbol: the
/// symbol is skipped for the current tick and the session continues.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignalError {
    #[error("market data unavailable for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error("insufficient history: need {required} closes, got {available}")]
    InsufficientHistory { required: usize, available: usize },
}

impl SignalError {
    pub fn unavailable(symbol: &str, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }
}

/// Fatal session errors.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("failed to send to client: {0}")]
    SendFailure(#[from] axum::Error),
}
