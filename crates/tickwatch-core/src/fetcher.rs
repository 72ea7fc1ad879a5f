//! Batch close-price retrieval.
//!
//! Every ticker is resolved independently: the primary source first, then
//! exactly one attempt against the fallback source. A ticker that neither
//! source can price becomes an `unavailable` observation; the batch itself
//! never fails once its input is valid.
//!
//! Each ticker also runs under its own deadline covering both sources, so a
//! stalled upstream costs one `unavailable` entry and never the batch.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};

use crate::config::{DEFAULT_LOOKBACK_DAYS, DEFAULT_MAX_IN_FLIGHT};
use crate::data_source::{PriceSource, SourceError};
use crate::http_client::DEFAULT_TIMEOUT_MS;
use crate::{
    PriceObservation, PriceWindow, TickerSymbol, UnavailableReason, UtcDateTime, ValidationError,
};

/// Resolves the latest close for batches of tickers.
#[derive(Clone)]
pub struct PriceFetcher {
    primary: Arc<dyn PriceSource>,
    fallback: Arc<dyn PriceSource>,
    lookback_days: u16,
    max_in_flight: usize,
    ticker_deadline: Duration,
}

impl PriceFetcher {
    pub fn new(primary: Arc<dyn PriceSource>, fallback: Arc<dyn PriceSource>) -> Self {
        Self {
            primary,
            fallback,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            ticker_deadline: Duration::from_millis(2 * DEFAULT_TIMEOUT_MS),
        }
    }

    pub fn with_lookback_days(mut self, lookback_days: u16) -> Self {
        self.lookback_days = lookback_days.max(1);
        self
    }

    /// `1` resolves tickers strictly one after another.
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    /// Budget for one ticker across primary and fallback.
    pub fn with_ticker_deadline_ms(mut self, deadline_ms: u64) -> Self {
        self.ticker_deadline = Duration::from_millis(deadline_ms.max(1));
        self
    }

    /// One observation per input ticker, in input order.
    pub async fn fetch_close_prices(
        &self,
        tickers: &[TickerSymbol],
    ) -> Result<Vec<PriceObservation>, ValidationError> {
        if tickers.is_empty() {
            return Err(ValidationError::EmptySymbolList);
        }

        let window = PriceWindow::trailing(UtcDateTime::now(), self.lookback_days)?;
        let started = Instant::now();

        let observations = stream::iter(tickers.iter().cloned())
            .map(|symbol| self.observe_within_deadline(symbol, window))
            .buffered(self.max_in_flight)
            .collect::<Vec<_>>()
            .await;

        let ok = observations.iter().filter(|o| o.is_ok()).count();
        tracing::info!(
            requested = tickers.len(),
            ok,
            unavailable = observations.len() - ok,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "price batch resolved"
        );

        Ok(observations)
    }

    async fn observe_within_deadline(
        &self,
        symbol: TickerSymbol,
        window: PriceWindow,
    ) -> PriceObservation {
        match tokio::time::timeout(self.ticker_deadline, self.observe(symbol.clone(), window))
            .await
        {
            Ok(observation) => observation,
            Err(_) => {
                tracing::warn!(
                    symbol = %symbol,
                    deadline_ms = self.ticker_deadline.as_millis() as u64,
                    "ticker deadline elapsed, marking unavailable"
                );
                PriceObservation::unavailable(
                    symbol,
                    UnavailableReason::FetchFailed,
                    UtcDateTime::now(),
                )
            }
        }
    }

    async fn observe(&self, symbol: TickerSymbol, window: PriceWindow) -> PriceObservation {
        let primary_error = match self.try_source(self.primary.as_ref(), &symbol, window).await {
            Ok(observation) => return observation,
            Err(error) => error,
        };
        tracing::warn!(
            symbol = %symbol,
            source = %self.primary.id(),
            code = primary_error.code(),
            error = primary_error.message(),
            "primary price source failed, trying fallback"
        );

        let fallback_error = match self.try_source(self.fallback.as_ref(), &symbol, window).await {
            Ok(observation) => return observation,
            Err(error) => error,
        };
        tracing::warn!(
            symbol = %symbol,
            source = %self.fallback.id(),
            code = fallback_error.code(),
            error = fallback_error.message(),
            "fallback price source failed, marking unavailable"
        );

        let reason = if primary_error.is_no_usable_data() && fallback_error.is_no_usable_data() {
            UnavailableReason::NoUsableData
        } else {
            UnavailableReason::FetchFailed
        };

        PriceObservation::unavailable(symbol, reason, UtcDateTime::now())
    }

    async fn try_source(
        &self,
        source: &dyn PriceSource,
        symbol: &TickerSymbol,
        window: PriceWindow,
    ) -> Result<PriceObservation, SourceError> {
        let close = source.latest_close(symbol, window).await?;
        PriceObservation::ok(symbol.clone(), close, source.id(), UtcDateTime::now())
            .map_err(|e| SourceError::no_usable_data(e.to_string()))
    }
}
