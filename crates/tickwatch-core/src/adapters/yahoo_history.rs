use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use time::{Date, OffsetDateTime, Time};
use yahoo_finance_api as yahoo;

use crate::data_source::{PriceSource, SourceError};
use crate::http_client::DEFAULT_TIMEOUT_MS;
use crate::{CoreError, PriceWindow, ProviderId, TickerSymbol};

/// Secondary close source backed by the `yahoo_finance_api` quote history.
///
/// The window is widened to whole UTC days so the library sees the same
/// calendar range as an ISO `YYYY-MM-DD` query would.
#[derive(Clone)]
pub struct YahooHistoryAdapter {
    connector: Arc<yahoo::YahooConnector>,
    timeout: Duration,
}

impl YahooHistoryAdapter {
    pub fn new() -> Result<Self, CoreError> {
        let connector = yahoo::YahooConnector::new()
            .map_err(|e| CoreError::HttpSetup(format!("yahoo history connector: {e}")))?;

        Ok(Self {
            connector: Arc::new(connector),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        })
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout = Duration::from_millis(timeout_ms);
        self
    }

    async fn fetch_close(
        &self,
        symbol: &TickerSymbol,
        window: PriceWindow,
    ) -> Result<f64, SourceError> {
        let (start_date, end_date) = window.iso_dates();
        let (start, end) = day_bounds(start_date, end_date);
        tracing::debug!(
            symbol = %symbol,
            start = %start_date,
            end = %end_date,
            "requesting yahoo quote history"
        );

        let response = tokio::time::timeout(
            self.timeout,
            self.connector.get_quote_history(symbol.as_str(), start, end),
        )
        .await
        .map_err(|_| {
            SourceError::unavailable(format!(
                "yahoo history timed out after {}ms",
                self.timeout.as_millis()
            ))
        })?
        .map_err(map_yahoo_error)?;

        let quotes = response.quotes().map_err(map_yahoo_error)?;

        quotes
            .last()
            .map(|quote| quote.close)
            .filter(|close| close.is_finite())
            .ok_or_else(|| SourceError::no_usable_data("yahoo history has no usable close"))
    }
}

impl PriceSource for YahooHistoryAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::YahooHistory
    }

    fn latest_close<'a>(
        &'a self,
        symbol: &'a TickerSymbol,
        window: PriceWindow,
    ) -> Pin<Box<dyn Future<Output = Result<f64, SourceError>> + Send + 'a>> {
        Box::pin(self.fetch_close(symbol, window))
    }
}

/// Midnight UTC of `start` through midnight UTC of the day after `end`.
fn day_bounds(start: Date, end: Date) -> (OffsetDateTime, OffsetDateTime) {
    let start = start.with_time(Time::MIDNIGHT).assume_utc();
    let end = end
        .next_day()
        .unwrap_or(end)
        .with_time(Time::MIDNIGHT)
        .assume_utc();
    (start, end)
}

fn map_yahoo_error(error: yahoo::YahooError) -> SourceError {
    match error {
        yahoo::YahooError::NoQuotes | yahoo::YahooError::NoResult => {
            SourceError::no_usable_data(format!("yahoo history: {error}"))
        }
        yahoo::YahooError::FetchFailed(message) => {
            SourceError::unavailable(format!("yahoo history fetch failed: {message}"))
        }
        other => SourceError::malformed(format!("yahoo history: {other}")),
    }
}
