//! Token balance and escrow allowance.

use serde::Serialize;

use super::{context, output, ConfigArgs};
use crate::domain::TokenAmount;
use crate::error::Result;

#[derive(Serialize)]
struct BalanceJson {
    account: String,
    balance: TokenAmount,
    allowance: TokenAmount,
}

pub async fn execute(args: &ConfigArgs) -> Result<()> {
    let config = context::load_config(args)?;
    let orchestrator = context::connect(&config).await?;

    let (balance, allowance) = tokio::try_join!(orchestrator.balance(), orchestrator.allowance())?;
    let account = orchestrator
        .session()
        .account()
        .map(|a| a.to_checksum(None))
        .unwrap_or_default();

    if output::is_json() {
        output::json(&BalanceJson {
            account,
            balance,
            allowance,
        })?;
        return Ok(());
    }

    output::section("Balance");
    output::key_value("Account", account);
    output::key_value("Balance", balance);
    output::key_value("Allowance", allowance);
    Ok(())
}
