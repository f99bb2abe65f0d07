//! Wager placement.

use serde::Serialize;

use super::{context, output, WagerArgs};
use crate::domain::{sanitize_amount, sanitize_market_id, BetRecord, WagerRequest, WagerResult};
use crate::error::Result;

#[derive(Serialize)]
struct WagerJson<'a> {
    result: &'a WagerResult,
    explorer_url: String,
    record: BetRecord,
}

/// Place a wager, confirming first unless `--yes`.
pub async fn execute(args: &WagerArgs) -> Result<()> {
    // Reject bad input before touching the wallet.
    sanitize_market_id(&args.market_id)?;
    sanitize_amount(&args.amount)?;
    context::require_noninteractive_consent(args.yes)?;

    let config = context::load_config(&args.config)?;
    let orchestrator = context::connect(&config).await?;
    let Some(account) = orchestrator.session().account() else {
        output::warn("Session is not ready");
        return Ok(());
    };

    output::section("Wager");
    output::key_value("Market", &args.market_id);
    output::key_value("Amount", &args.amount);
    output::key_value("Side", args.side);
    output::key_value("Account", account);

    if !args.yes && !output::confirm("Place this wager?") {
        output::warn("Wager cancelled by user");
        return Ok(());
    }

    let request = WagerRequest::new(args.market_id.clone(), args.amount.clone());
    output::progress("Submitting wager");
    let placed = orchestrator.place_wager(&request).await;
    output::progress_done(placed.is_ok());
    let result = placed?;

    let network = config.target_network()?;
    let explorer_url = network.transaction_url(&result.transaction_hash);
    let record = BetRecord::new(&result, args.side, account);

    if output::is_json() {
        output::json(&WagerJson {
            result: &result,
            explorer_url,
            record,
        })?;
        return Ok(());
    }

    output::ok("Wager placed");
    if let Some(approval) = result.approval_hash {
        output::key_value("Approval", network.transaction_url(&approval));
    }
    output::key_value("Transaction", explorer_url);
    output::key_value("Gas used", result.gas_used);
    if let Some(block) = result.block_number {
        output::key_value("Block", block);
    }
    output::note(&format!(
        "Record for bookkeeping: {}",
        serde_json::to_string(&record)?
    ));
    Ok(())
}
