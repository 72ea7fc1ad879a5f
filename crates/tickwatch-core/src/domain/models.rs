use serde::{Deserialize, Serialize};
use time::Date;

use crate::{ProviderId, TickerSymbol, UtcDateTime, ValidationError};

/// Coarse instrument class exposed to the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateKind {
    Stock,
    Etf,
    Index,
    #[default]
    Unknown,
}

impl CandidateKind {
    /// Classify an upstream quote-type tag.
    ///
    /// Returns `None` for instrument types that are not watchlist material
    /// (currencies, rates, futures, options, ...).
    pub fn from_quote_type(tag: &str) -> Option<Self> {
        let tag = tag.trim().to_ascii_uppercase();
        if tag == "STOCK" || tag.contains("EQUITY") {
            Some(Self::Stock)
        } else if tag.contains("ETF") || tag.contains("FUND") {
            Some(Self::Etf)
        } else {
            None
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stock => "stock",
            Self::Etf => "etf",
            Self::Index => "index",
            Self::Unknown => "unknown",
        }
    }
}

/// Exchange marker used when the upstream does not name one.
pub const UNKNOWN_EXCHANGE: &str = "UNKNOWN";

/// One ticker proposed for a search query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCandidate {
    pub ticker: TickerSymbol,
    pub display_name: String,
    pub exchange: String,
    pub kind: CandidateKind,
}

impl SearchCandidate {
    pub fn new(
        ticker: TickerSymbol,
        display_name: impl Into<String>,
        exchange: Option<&str>,
        kind: CandidateKind,
    ) -> Self {
        let exchange = exchange
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(UNKNOWN_EXCHANGE);

        Self {
            ticker,
            display_name: display_name.into(),
            exchange: exchange.to_owned(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationStatus {
    Ok,
    Unavailable,
}

/// Why an observation carries no price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    /// Every source answered but none carried a usable close.
    NoUsableData,
    /// At least one source failed outright (transport, status, payload).
    FetchFailed,
}

impl UnavailableReason {
    pub const fn message(self) -> &'static str {
        match self {
            Self::NoUsableData => "no price data available",
            Self::FetchFailed => "failed to fetch price",
        }
    }
}

/// Latest close for one requested ticker, produced once per fetch call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub ticker: TickerSymbol,
    close_price: Option<f64>,
    pub observed_at: UtcDateTime,
    status: ObservationStatus,
    source: Option<ProviderId>,
    reason: Option<UnavailableReason>,
}

impl PriceObservation {
    pub fn ok(
        ticker: TickerSymbol,
        close_price: f64,
        source: ProviderId,
        observed_at: UtcDateTime,
    ) -> Result<Self, ValidationError> {
        if !close_price.is_finite() {
            return Err(ValidationError::NonFiniteValue {
                field: "close_price",
            });
        }

        Ok(Self {
            ticker,
            close_price: Some(close_price),
            observed_at,
            status: ObservationStatus::Ok,
            source: Some(source),
            reason: None,
        })
    }

    pub fn unavailable(
        ticker: TickerSymbol,
        reason: UnavailableReason,
        observed_at: UtcDateTime,
    ) -> Self {
        Self {
            ticker,
            close_price: None,
            observed_at,
            status: ObservationStatus::Unavailable,
            source: None,
            reason: Some(reason),
        }
    }

    pub fn close_price(&self) -> Option<f64> {
        self.close_price
    }

    pub fn status(&self) -> ObservationStatus {
        self.status
    }

    pub fn is_ok(&self) -> bool {
        self.status == ObservationStatus::Ok
    }

    pub fn source(&self) -> Option<ProviderId> {
        self.source
    }

    pub fn reason(&self) -> Option<UnavailableReason> {
        self.reason
    }
}

/// Trailing lookup window for daily closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceWindow {
    pub start: UtcDateTime,
    pub end: UtcDateTime,
}

impl PriceWindow {
    /// Window ending at `end` and reaching back `lookback_days`.
    pub fn trailing(end: UtcDateTime, lookback_days: u16) -> Result<Self, ValidationError> {
        if lookback_days == 0 {
            return Err(ValidationError::EmptyWindow);
        }

        Ok(Self {
            start: end.saturating_sub_days(lookback_days),
            end,
        })
    }

    /// `(period1, period2)` epoch seconds for the chart endpoint.
    pub fn epoch_seconds(&self) -> (i64, i64) {
        (self.start.unix_timestamp(), self.end.unix_timestamp())
    }

    /// Calendar date range used by the history source.
    pub fn iso_dates(&self) -> (Date, Date) {
        (self.start.date(), self.end.date())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceDirection {
    Up,
    Down,
    Unchanged,
}

/// Delta between two consecutive closes of the same ticker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceChange {
    pub change: f64,
    pub change_percent: f64,
    pub direction: PriceDirection,
}

impl PriceChange {
    /// Compare a fresh close to the previous snapshot's close.
    ///
    /// A previous close of zero reports a percentage of zero.
    pub fn between(current: f64, previous: f64) -> Self {
        let change = current - previous;
        let change_percent = if previous == 0.0 {
            0.0
        } else {
            change / previous * 100.0
        };
        let direction = if change > 0.0 {
            PriceDirection::Up
        } else if change < 0.0 {
            PriceDirection::Down
        } else {
            PriceDirection::Unchanged
        };

        Self {
            change,
            change_percent,
            direction,
        }
    }
}
