use tickwatch_core::StocksGateway;

use crate::cli::PricesArgs;
use crate::error::CliError;

use super::CommandResult;

pub async fn run(args: &PricesArgs, gateway: &StocksGateway) -> Result<CommandResult, CliError> {
    let entries = gateway.prices_for(&args.tokens()).await?;
    let unavailable = entries
        .iter()
        .filter(|entry| entry.close_price.is_none())
        .count();

    let entries = entries
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CommandResult::ok(entries).with_unavailable(unavailable))
}
