//! CLI argument definitions for tickwatch.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `search` | Resolve a free-form name or code to tickers |
//! | `prices` | Fetch the latest close for one or more tickers |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, ndjson, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--strict` | `false` | Exit non-zero when any ticker is unavailable |
//! | `--timeout-ms` | env or `10000` | Per-request timeout in ms |
//! | `--max-in-flight` | env or `4` | Concurrent ticker lookups per batch |
//! | `--names-file` | embedded | Local name table override |
//!
//! # Examples
//!
//! ```bash
//! tickwatch search 台積電
//! tickwatch prices AAPL 2330.TW --pretty
//! tickwatch prices AAPL MSFT --format table --strict
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Watchlist close prices and ticker search from the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "tickwatch",
    author,
    version,
    about = "Watchlist close prices and ticker search",
    long_about = "tickwatch resolves company names (including Chinese names of Taiwan \
listings) to ticker symbols and fetches the most recent daily close for a list of \
tickers.\n\
\n\
Configuration is read from TICKWATCH_* environment variables; flags override them."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Exit with code 3 when any requested ticker has no price.
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// Per-request timeout in milliseconds.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Ticker lookups allowed in flight within one batch.
    #[arg(long, global = true)]
    pub max_in_flight: Option<usize>,

    /// JSON file replacing the embedded local name table.
    #[arg(long, global = true)]
    pub names_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns for terminal display.
    Table,
    /// The same JSON array the HTTP endpoint returns.
    Json,
    /// One JSON object per line.
    Ndjson,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search for tickers by symbol, listing code or company name.
    ///
    /// # Examples
    ///
    ///   tickwatch search apple
    ///   tickwatch search 2330
    ///   tickwatch search 聯發科
    Search(SearchArgs),

    /// Fetch the latest daily close for each ticker.
    ///
    /// Output holds one entry per ticker in the order given; tickers
    /// without a price carry an error message instead.
    ///
    /// # Examples
    ///
    ///   tickwatch prices AAPL
    ///   tickwatch prices AAPL,MSFT 2330.TW
    Prices(PricesArgs),
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Free-form search query.
    pub query: String,
}

#[derive(Debug, Args)]
pub struct PricesArgs {
    /// Ticker symbols; comma-separated lists are accepted too.
    #[arg(required = true, num_args = 1..)]
    pub symbols: Vec<String>,
}

impl PricesArgs {
    /// Flatten `AAPL,MSFT 2330.TW` into individual tokens.
    pub fn tokens(&self) -> Vec<&str> {
        self.symbols
            .iter()
            .flat_map(|raw| raw.split(','))
            .collect()
    }
}
