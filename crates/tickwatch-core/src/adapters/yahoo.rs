use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::data_source::{PriceSource, SearchSource, SourceError};
use crate::http_client::{HttpClient, HttpRequest, HttpResponse, DEFAULT_TIMEOUT_MS};
use crate::{CandidateKind, PriceWindow, ProviderId, SearchCandidate, TickerSymbol};

pub const DEFAULT_CHART_BASE_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_SEARCH_BASE_URL: &str = "https://query2.finance.yahoo.com";
pub const DEFAULT_QUOTES_COUNT: u16 = 20;

// ============================================================================
// Chart adapter
// ============================================================================

/// Daily closes from the `v8/finance/chart` endpoint.
#[derive(Clone)]
pub struct YahooChartAdapter {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    timeout_ms: u64,
}

impl YahooChartAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            base_url: DEFAULT_CHART_BASE_URL.to_owned(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = trim_base(base_url.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn chart_url(&self, symbol: &TickerSymbol, window: PriceWindow) -> String {
        let (period1, period2) = window.epoch_seconds();
        format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d&includePrePost=true&events=div%2Csplit",
            self.base_url,
            urlencoding::encode(symbol.as_str()),
            period1,
            period2
        )
    }

    async fn fetch_close(
        &self,
        symbol: &TickerSymbol,
        window: PriceWindow,
    ) -> Result<f64, SourceError> {
        let url = self.chart_url(symbol, window);
        tracing::debug!(symbol = %symbol, url = %url, "requesting yahoo chart");

        let request = HttpRequest::get(url)
            .with_header("accept", "application/json")
            .with_timeout_ms(self.timeout_ms);
        let response = send(self.http_client.as_ref(), request, "yahoo chart").await?;

        parse_chart_close(&response.body)
    }
}

impl PriceSource for YahooChartAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::YahooChart
    }

    fn latest_close<'a>(
        &'a self,
        symbol: &'a TickerSymbol,
        window: PriceWindow,
    ) -> Pin<Box<dyn Future<Output = Result<f64, SourceError>> + Send + 'a>> {
        Box::pin(self.fetch_close(symbol, window))
    }
}

/// Decode a chart payload and return its most recent usable close.
pub fn parse_chart_close(body: &str) -> Result<f64, SourceError> {
    let chart_response: YahooChartResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::malformed(format!("failed to parse yahoo chart: {e}")))?;

    if let Some(error) = chart_response.chart.error.filter(|error| !error.is_null()) {
        return Err(SourceError::unavailable(format!(
            "yahoo chart API error: {}",
            describe_chart_error(&error)
        )));
    }

    let closes = chart_response
        .chart
        .result
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|result| result.indicators)
        .and_then(|indicators| indicators.quote.into_iter().next())
        .map(|quote| quote.close)
        .unwrap_or_default();

    last_finite_close(&closes)
        .ok_or_else(|| SourceError::no_usable_data("yahoo chart has no usable close"))
}

/// Scan a close series from the end and return the first finite number.
///
/// Anything that is not a JSON number (null, strings, booleans) is a gap.
pub fn last_finite_close(series: &[Value]) -> Option<f64> {
    series
        .iter()
        .rev()
        .find_map(|value| value.as_f64().filter(|close| close.is_finite()))
}

fn describe_chart_error(error: &Value) -> String {
    match error {
        Value::String(message) => message.clone(),
        Value::Object(fields) => fields
            .get("description")
            .or_else(|| fields.get("code"))
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_else(|| error.to_string()),
        other => other.to_string(),
    }
}

// ============================================================================
// Search adapter
// ============================================================================

/// Full-text lookup against the `v1/finance/search` endpoint.
#[derive(Clone)]
pub struct YahooSearchAdapter {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    timeout_ms: u64,
    quotes_count: u16,
}

impl YahooSearchAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            base_url: DEFAULT_SEARCH_BASE_URL.to_owned(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            quotes_count: DEFAULT_QUOTES_COUNT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = trim_base(base_url.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_quotes_count(mut self, quotes_count: u16) -> Self {
        self.quotes_count = quotes_count.max(1);
        self
    }

    fn search_url(&self, term: &str) -> String {
        format!(
            "{}/v1/finance/search?q={}&quotesCount={}&newsCount=0",
            self.base_url,
            urlencoding::encode(term),
            self.quotes_count
        )
    }

    async fn execute_search(&self, term: &str) -> Result<Vec<SearchCandidate>, SourceError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(SourceError::invalid_request(
                "yahoo search query must not be empty",
            ));
        }

        let url = self.search_url(term);
        tracing::debug!(term, url = %url, "requesting yahoo search");

        let request = HttpRequest::get(url)
            .with_header("accept", "application/json")
            .with_timeout_ms(self.timeout_ms);
        let response = send(self.http_client.as_ref(), request, "yahoo search").await?;

        parse_search_candidates(&response.body)
    }
}

impl SearchSource for YahooSearchAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::YahooSearch
    }

    fn search<'a>(
        &'a self,
        term: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<SearchCandidate>, SourceError>> + Send + 'a>> {
        Box::pin(self.execute_search(term))
    }
}

/// Decode a search payload, keeping only equity and fund hits.
pub fn parse_search_candidates(body: &str) -> Result<Vec<SearchCandidate>, SourceError> {
    let search_response: YahooSearchResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::malformed(format!("failed to parse yahoo search: {e}")))?;

    Ok(search_response
        .quotes
        .into_iter()
        .filter_map(YahooSearchQuote::into_candidate)
        .collect())
}

async fn send(
    http_client: &dyn HttpClient,
    request: HttpRequest,
    label: &str,
) -> Result<HttpResponse, SourceError> {
    let response = http_client.execute(request).await.map_err(|e| {
        if e.timed_out() {
            SourceError::unavailable(format!("{label} timed out: {}", e.message()))
        } else {
            SourceError::unavailable(format!("{label} transport error: {}", e.message()))
        }
    })?;

    if !response.is_success() {
        return Err(SourceError::unavailable(format!(
            "{label} returned status {}",
            response.status
        )));
    }

    Ok(response)
}

fn trim_base(base_url: String) -> String {
    base_url.trim_end_matches('/').to_owned()
}

// Yahoo Finance API response structures
#[derive(Debug, Clone, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartData {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    /// Either a bare string or `{code, description}` depending on the edge.
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResult {
    #[serde(default)]
    indicators: Option<YahooChartIndicators>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartIndicators {
    #[serde(default)]
    quote: Vec<YahooChartQuote>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    close: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooSearchResponse {
    #[serde(default)]
    quotes: Vec<YahooSearchQuote>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooSearchQuote {
    #[serde(default)]
    symbol: Option<String>,
    #[serde(rename = "shortname", default)]
    short_name: Option<String>,
    #[serde(rename = "longname", default)]
    long_name: Option<String>,
    #[serde(default)]
    exchange: Option<String>,
    #[serde(rename = "exchDisp", default)]
    exchange_display: Option<String>,
    #[serde(rename = "quoteType", default)]
    quote_type: Option<String>,
}

impl YahooSearchQuote {
    fn into_candidate(self) -> Option<SearchCandidate> {
        let kind = CandidateKind::from_quote_type(self.quote_type.as_deref()?)?;
        let ticker = TickerSymbol::parse(self.symbol.as_deref()?).ok()?;
        let name = non_blank(self.short_name).or_else(|| non_blank(self.long_name))?;
        let exchange = non_blank(self.exchange_display).or_else(|| non_blank(self.exchange));

        Some(SearchCandidate::new(
            ticker,
            name,
            exchange.as_deref(),
            kind,
        ))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}
