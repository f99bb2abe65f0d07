//! Explicit escrow approval.

use serde::Serialize;

use super::{context, output, ApproveArgs};
use crate::domain::{sanitize_amount, ApprovalOutcome, TokenAmount};
use crate::error::Result;

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum ApproveJson {
    Approved {
        transaction_hash: String,
        amount: TokenAmount,
        explorer_url: String,
    },
    AlreadyApproved {
        current_allowance: TokenAmount,
    },
}

/// Approve the escrow to spend `args.amount`, confirming first unless `--yes`.
pub async fn execute(args: &ApproveArgs) -> Result<()> {
    // Reject bad input before touching the wallet.
    let amount = sanitize_amount(&args.amount)?;
    context::require_noninteractive_consent(args.yes)?;
    let config = context::load_config(&args.config)?;
    let orchestrator = context::connect(&config).await?;

    let current = orchestrator.allowance().await?;
    output::section("Escrow Approval");
    output::key_value("Allowance", &current);
    output::key_value("Requested", &amount);

    if !args.yes && !output::confirm("Proceed with approval?") {
        output::warn("Approval cancelled by user");
        return Ok(());
    }

    output::progress("Submitting approval");
    let outcome = orchestrator.approve(&amount).await;
    output::progress_done(outcome.is_ok());
    let network = config.target_network()?;

    match outcome? {
        ApprovalOutcome::Approved { tx_hash, amount } => {
            let explorer_url = network.transaction_url(&tx_hash);
            if output::is_json() {
                output::json(&ApproveJson::Approved {
                    transaction_hash: tx_hash.to_string(),
                    amount,
                    explorer_url,
                })?;
            } else {
                output::ok("Approval confirmed");
                output::key_value("Amount", amount);
                output::key_value("Transaction", explorer_url);
            }
        }
        ApprovalOutcome::AlreadyApproved { current_allowance } => {
            if output::is_json() {
                output::json(&ApproveJson::AlreadyApproved { current_allowance })?;
            } else {
                output::ok(&format!(
                    "Allowance already sufficient (current {current_allowance})"
                ));
            }
        }
    }

    Ok(())
}
