//! Source traits and the structured error they report.
//!
//! | Trait | Operation | Implementations |
//! |-------|-----------|-----------------|
//! | [`PriceSource`] | latest daily close inside a [`PriceWindow`] | `YahooChartAdapter`, `YahooHistoryAdapter` |
//! | [`SearchSource`] | free-text instrument lookup | `YahooSearchAdapter` |
//!
//! Sources never panic on upstream garbage: every failure comes back as a
//! [`SourceError`] so the fetcher and resolver can fall back.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{PriceWindow, ProviderId, SearchCandidate, TickerSymbol};

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// Transport failure, timeout or non-2xx status.
    Unavailable,
    /// The upstream answered with a body we could not decode.
    Malformed,
    /// The upstream answered but carried no usable close.
    NoUsableData,
    InvalidRequest,
}

/// Structured source error used by fallback decisions and log fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Unavailable, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Malformed, message)
    }

    pub fn no_usable_data(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::NoUsableData, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::InvalidRequest, message)
    }

    fn new(kind: SourceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn is_no_usable_data(&self) -> bool {
        matches!(self.kind, SourceErrorKind::NoUsableData)
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::Malformed => "source.malformed",
            SourceErrorKind::NoUsableData => "source.no_usable_data",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// A provider of daily closes.
pub trait PriceSource: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Most recent finite close for `symbol` inside `window`.
    fn latest_close<'a>(
        &'a self,
        symbol: &'a TickerSymbol,
        window: PriceWindow,
    ) -> Pin<Box<dyn Future<Output = Result<f64, SourceError>> + Send + 'a>>;
}

/// A provider of instrument search results.
pub trait SearchSource: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Candidates for `term`, already filtered to watchlist-eligible kinds.
    fn search<'a>(
        &'a self,
        term: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<SearchCandidate>, SourceError>> + Send + 'a>>;
}
