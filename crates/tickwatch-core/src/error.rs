use thiserror::Error;

/// Validation and contract errors exposed by `tickwatch-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("ticker symbol cannot be empty")]
    EmptySymbol,
    #[error("ticker symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("ticker symbol contains invalid character {ch:?} at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("search query cannot be empty")]
    EmptyQuery,
    #[error("price request must include at least one ticker symbol")]
    EmptySymbolList,

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },

    #[error("lookback window must span at least one day")]
    EmptyWindow,

    #[error("local name table entry {index} is missing '{field}'")]
    IncompleteTableEntry { index: usize, field: &'static str },
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("http client setup failed: {0}")]
    HttpSetup(String),
}
