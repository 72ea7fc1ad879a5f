//! Request boundary shared by the HTTP and command-line adapters.
//!
//! `GET /api/stocks?action=search&q=..` and `?action=prices&symbols=a,b`
//! both land in [`StocksGateway::handle`]; the binaries only translate the
//! [`GatewayError`] variants into status codes or exit codes.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::adapters::{YahooChartAdapter, YahooHistoryAdapter, YahooSearchAdapter};
use crate::config::CoreConfig;
use crate::fetcher::PriceFetcher;
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::name_table::LocalNameTable;
use crate::resolver::SearchResolver;
use crate::{
    CandidateKind, CoreError, PriceObservation, SearchCandidate, TickerSymbol, UtcDateTime,
    ValidationError,
};

/// Raw query string of the stocks endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StocksQuery {
    pub action: Option<String>,
    pub q: Option<String>,
    pub symbols: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("{0}")]
    InvalidInput(String),
    /// Detail is for logs only; clients see a generic message.
    #[error("server fault: {0}")]
    ServerFault(String),
}

impl GatewayError {
    pub fn public_message(&self) -> &str {
        match self {
            Self::InvalidInput(message) => message,
            Self::ServerFault(_) => "server error",
        }
    }
}

/// One search result on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchEntry {
    pub ticker: String,
    pub name: String,
    pub exchange: String,
    #[serde(rename = "type")]
    pub kind: CandidateKind,
}

impl From<SearchCandidate> for SearchEntry {
    fn from(candidate: SearchCandidate) -> Self {
        Self {
            ticker: candidate.ticker.as_str().to_owned(),
            name: candidate.display_name,
            exchange: candidate.exchange,
            kind: candidate.kind,
        }
    }
}

/// One price result on the wire; exactly one of `close_price` and `error`
/// is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceEntry {
    pub ticker: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: UtcDateTime,
}

impl From<PriceObservation> for PriceEntry {
    fn from(observation: PriceObservation) -> Self {
        let error = observation.close_price().is_none().then(|| {
            observation
                .reason()
                .map(|reason| reason.message())
                .unwrap_or("price unavailable")
                .to_owned()
        });

        Self {
            ticker: observation.ticker.as_str().to_owned(),
            close_price: observation.close_price(),
            error,
            timestamp: observation.observed_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StocksResponse {
    Search(Vec<SearchEntry>),
    Prices(Vec<PriceEntry>),
}

/// Dispatches stocks requests to the resolver and the fetcher.
#[derive(Clone)]
pub struct StocksGateway {
    fetcher: PriceFetcher,
    resolver: SearchResolver,
}

impl StocksGateway {
    pub fn new(fetcher: PriceFetcher, resolver: SearchResolver) -> Self {
        Self { fetcher, resolver }
    }

    /// Wire the Yahoo adapters and the local table from configuration.
    pub fn from_config(config: &CoreConfig) -> Result<Self, CoreError> {
        let http_client: Arc<dyn HttpClient> =
            Arc::new(ReqwestHttpClient::with_user_agent(&config.user_agent));
        Self::from_config_with_client(config, http_client)
    }

    pub fn from_config_with_client(
        config: &CoreConfig,
        http_client: Arc<dyn HttpClient>,
    ) -> Result<Self, CoreError> {
        let table = LocalNameTable::load(config.names_path.as_deref())?;
        tracing::info!(
            entries = table.len(),
            override_path = ?config.names_path,
            "local name table loaded"
        );

        let chart = YahooChartAdapter::new(http_client.clone())
            .with_base_url(config.chart_base_url.clone())
            .with_timeout_ms(config.request_timeout_ms);
        let history = YahooHistoryAdapter::new()?.with_timeout_ms(config.request_timeout_ms);
        let search = YahooSearchAdapter::new(http_client)
            .with_base_url(config.search_base_url.clone())
            .with_timeout_ms(config.request_timeout_ms)
            .with_quotes_count(config.search_quotes_count);

        let fetcher = PriceFetcher::new(Arc::new(chart), Arc::new(history))
            .with_lookback_days(config.lookback_days)
            .with_max_in_flight(config.max_in_flight)
            .with_ticker_deadline_ms(config.request_timeout_ms.saturating_mul(2));
        let resolver = SearchResolver::new(Arc::new(search), Arc::new(table));

        Ok(Self::new(fetcher, resolver))
    }

    pub async fn handle(&self, query: &StocksQuery) -> Result<StocksResponse, GatewayError> {
        match query.action.as_deref().map(str::trim) {
            Some("search") => {
                let q = query.q.as_deref().unwrap_or_default();
                self.search(q).await.map(StocksResponse::Search)
            }
            Some("prices") => {
                let symbols = query.symbols.as_deref().unwrap_or_default();
                self.prices(symbols).await.map(StocksResponse::Prices)
            }
            _ => Err(GatewayError::InvalidInput(String::from("invalid action"))),
        }
    }

    pub async fn search(&self, q: &str) -> Result<Vec<SearchEntry>, GatewayError> {
        let candidates = self.resolver.search(q).await.map_err(|error| match error {
            ValidationError::EmptyQuery => {
                GatewayError::InvalidInput(String::from("missing search query parameter 'q'"))
            }
            other => GatewayError::InvalidInput(other.to_string()),
        })?;

        Ok(candidates.into_iter().map(SearchEntry::from).collect())
    }

    /// Comma-separated symbol list, as sent by the dashboard.
    pub async fn prices(&self, raw_symbols: &str) -> Result<Vec<PriceEntry>, GatewayError> {
        let tokens = raw_symbols.split(',').collect::<Vec<_>>();
        self.prices_for(&tokens).await
    }

    /// One entry per non-blank token, in order. Tokens that are not valid
    /// tickers get an error entry without touching the network.
    pub async fn prices_for<S>(&self, tokens: &[S]) -> Result<Vec<PriceEntry>, GatewayError>
    where
        S: AsRef<str>,
    {
        let parsed = tokens
            .iter()
            .map(|token| token.as_ref().trim())
            .filter(|token| !token.is_empty())
            .map(|token| (token, TickerSymbol::parse(token)))
            .collect::<Vec<_>>();

        if parsed.is_empty() {
            return Err(GatewayError::InvalidInput(String::from(
                "missing ticker symbols parameter 'symbols'",
            )));
        }

        let valid = parsed
            .iter()
            .filter_map(|(_, result)| result.as_ref().ok().cloned())
            .collect::<Vec<_>>();

        let observations = if valid.is_empty() {
            Vec::new()
        } else {
            self.fetcher
                .fetch_close_prices(&valid)
                .await
                .map_err(|error| GatewayError::ServerFault(error.to_string()))?
        };
        let mut observations = observations.into_iter();

        let mut entries = Vec::with_capacity(parsed.len());
        for (token, result) in parsed {
            let entry = match result {
                Ok(_) => observations.next().map(PriceEntry::from).ok_or_else(|| {
                    GatewayError::ServerFault(String::from(
                        "price batch returned fewer observations than requested",
                    ))
                })?,
                Err(error) => {
                    tracing::debug!(token, %error, "rejecting invalid ticker");
                    PriceEntry {
                        ticker: token.to_owned(),
                        close_price: None,
                        error: Some(format!("invalid ticker symbol: {error}")),
                        timestamp: UtcDateTime::now(),
                    }
                }
            };
            entries.push(entry);
        }

        Ok(entries)
    }

    pub fn resolver(&self) -> &SearchResolver {
        &self.resolver
    }

    pub fn fetcher(&self) -> &PriceFetcher {
        &self.fetcher
    }
}
