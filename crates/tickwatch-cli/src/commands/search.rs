use tickwatch_core::StocksGateway;

use crate::cli::SearchArgs;
use crate::error::CliError;

use super::CommandResult;

pub async fn run(args: &SearchArgs, gateway: &StocksGateway) -> Result<CommandResult, CliError> {
    let entries = gateway.search(&args.query).await?;
    tracing::debug!(query = %args.query, results = entries.len(), "search finished");

    let entries = entries
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CommandResult::ok(entries))
}
