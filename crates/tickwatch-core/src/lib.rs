//! # Tickwatch Core
//!
//! Close-price retrieval and ticker search normalization for a personal
//! stock watchlist.
//!
//! ## Overview
//!
//! - **Price fetching**: one observation per requested ticker, from the
//!   Yahoo chart endpoint with a single fallback to Yahoo quote history
//! - **Ticker search**: Yahoo full-text search, widened by curated
//!   transliterations, with a local name table as last resort
//! - **Request boundary** shared by the web and command-line adapters
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Yahoo chart, search and history adapters |
//! | [`config`] | Runtime configuration from the environment |
//! | [`data_source`] | Source traits and structured source errors |
//! | [`domain`] | Domain models (TickerSymbol, PriceObservation, SearchCandidate) |
//! | [`error`] | Core error types |
//! | [`fetcher`] | Batch close-price fetcher |
//! | [`gateway`] | `action=search` / `action=prices` dispatch and wire types |
//! | [`http_client`] | HTTP client abstraction |
//! | [`name_table`] | Curated local ticker table |
//! | [`resolver`] | Search resolver |
//! | [`source`] | Provider identifiers |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tickwatch_core::{CoreConfig, StocksGateway};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let gateway = StocksGateway::from_config(&CoreConfig::from_env())?;
//!
//!     for entry in gateway.prices("AAPL,2330.TW").await? {
//!         println!("{}: {:?}", entry.ticker, entry.close_price);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │  tickwatch-web / cli │
//! └──────────┬───────────┘
//!            │
//!            ▼
//! ┌──────────────────────┐
//! │    StocksGateway     │
//! └─────┬──────────┬─────┘
//!       │          │
//!       ▼          ▼
//! ┌───────────┐ ┌──────────────┐     ┌────────────────┐
//! │  Price    │ │   Search     │────▶│ LocalNameTable │
//! │  Fetcher  │ │   Resolver   │     └────────────────┘
//! └─────┬─────┘ └──────┬───────┘
//!       │              │
//!       ▼              ▼
//! ┌──────────────────────────────┐
//! │ PriceSource / SearchSource   │
//! │ (Yahoo chart, history, search)│
//! └──────────────────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Upstream failures are contained per ticker or per query; only invalid
//! input reaches the caller:
//!
//! ```rust
//! use tickwatch_core::{SourceError, SourceErrorKind};
//!
//! fn describe(error: &SourceError) -> &'static str {
//!     match error.kind() {
//!         SourceErrorKind::NoUsableData => "answered without a close",
//!         SourceErrorKind::Unavailable => "transport, timeout or status",
//!         SourceErrorKind::Malformed => "undecodable body",
//!         _ => "other",
//!     }
//! }
//! ```

pub mod adapters;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod fetcher;
pub mod gateway;
pub mod http_client;
pub mod name_table;
pub mod resolver;
pub mod source;

pub use adapters::{
    last_finite_close, YahooChartAdapter, YahooHistoryAdapter, YahooSearchAdapter,
};
pub use config::CoreConfig;
pub use data_source::{PriceSource, SearchSource, SourceError, SourceErrorKind};
pub use domain::*;
pub use error::{CoreError, ValidationError};
pub use fetcher::PriceFetcher;
pub use gateway::{
    GatewayError, PriceEntry, SearchEntry, StocksGateway, StocksQuery, StocksResponse,
};
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};
pub use name_table::{LocalNameTable, MatchRule, NameEntry};
pub use resolver::SearchResolver;
pub use source::ProviderId;
