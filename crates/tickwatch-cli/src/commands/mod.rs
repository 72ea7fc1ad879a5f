mod prices;
mod search;

use serde_json::Value;
use tickwatch_core::{CoreConfig, StocksGateway};

use crate::cli::{Cli, Command};
use crate::error::CliError;

/// Rendered payload plus the per-ticker failure count for `--strict`.
pub struct CommandResult {
    pub entries: Vec<Value>,
    pub unavailable: usize,
}

impl CommandResult {
    pub fn ok(entries: Vec<Value>) -> Self {
        Self {
            entries,
            unavailable: 0,
        }
    }

    pub fn with_unavailable(mut self, unavailable: usize) -> Self {
        self.unavailable = unavailable;
        self
    }
}

pub async fn run(cli: &Cli) -> Result<CommandResult, CliError> {
    let config = resolve_config(cli, CoreConfig::from_env());
    tracing::debug!(?config, "resolved configuration");
    let gateway = StocksGateway::from_config(&config)?;

    match &cli.command {
        Command::Search(args) => search::run(args, &gateway).await,
        Command::Prices(args) => prices::run(args, &gateway).await,
    }
}

/// Flags win over `TICKWATCH_*` variables.
fn resolve_config(cli: &Cli, mut config: CoreConfig) -> CoreConfig {
    if let Some(timeout_ms) = cli.timeout_ms.filter(|value| *value > 0) {
        config.request_timeout_ms = timeout_ms;
    }
    if let Some(max_in_flight) = cli.max_in_flight.filter(|value| *value > 0) {
        config.max_in_flight = max_in_flight;
    }
    if let Some(path) = &cli.names_file {
        config.names_path = Some(path.clone());
    }
    config
}
