//! Upstream adapters.
//!
//! Both Yahoo HTTP adapters go through [`crate::HttpClient`] so tests can
//! script responses; the history adapter wraps the `yahoo_finance_api`
//! connector and is only ever used as the price fallback.

mod yahoo;
mod yahoo_history;

pub use yahoo::{
    last_finite_close, parse_chart_close, parse_search_candidates, YahooChartAdapter,
    YahooSearchAdapter, DEFAULT_CHART_BASE_URL, DEFAULT_QUOTES_COUNT, DEFAULT_SEARCH_BASE_URL,
};
pub use yahoo_history::YahooHistoryAdapter;
