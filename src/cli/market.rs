//! Single market lookup.

use super::{context, output, MarketArgs};
use crate::error::Result;

pub async fn execute(args: &MarketArgs) -> Result<()> {
    let config = context::load_config(&args.config)?;
    let orchestrator = context::connect(&config).await?;
    let info = orchestrator.market_info(&args.market_id).await?;

    if output::is_json() {
        output::json(&info)?;
        return Ok(());
    }

    output::section(&format!("Market {}", info.market_id));
    output::key_value("Escrowed", &info.total_escrow);
    output::key_value(
        "Participated",
        if info.participated { "yes" } else { "no" },
    );
    Ok(())
}
