//! Escrow-wide statistics.

use serde::Serialize;

use super::{context, output, ConfigArgs};
use crate::domain::TokenAmount;
use crate::error::Result;

#[derive(Serialize)]
struct StatsJson {
    volume: TokenAmount,
    active_bets: String,
}

pub async fn execute(args: &ConfigArgs) -> Result<()> {
    let config = context::load_config(args)?;
    let orchestrator = context::connect(&config).await?;

    let (volume, active_bets) =
        tokio::try_join!(orchestrator.volume(), orchestrator.active_bet_count())?;

    if output::is_json() {
        output::json(&StatsJson {
            volume,
            active_bets: active_bets.to_string(),
        })?;
        return Ok(());
    }

    output::section("Escrow Statistics");
    output::key_value("Volume", volume);
    output::key_value("Active bets", active_bets);
    Ok(())
}
