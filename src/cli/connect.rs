//! Connect the wallet and report the validated session.

use serde::Serialize;

use super::{context, output, ConfigArgs};
use crate::error::Result;

#[derive(Serialize)]
struct ConnectJson {
    account: String,
    network: String,
    chain_id: u64,
    escrow_address: String,
    token_address: String,
    decimals: u8,
    state: String,
}

pub async fn execute(args: &ConfigArgs) -> Result<()> {
    let config = context::load_config(args)?;
    let orchestrator = context::connect(&config).await?;
    let session = orchestrator.session();
    let Some(active) = session.active() else {
        output::warn("Session is not ready");
        return Ok(());
    };

    let network = active.network();
    let contracts = active.contracts();

    if output::is_json() {
        output::json(&ConnectJson {
            account: active.account().to_checksum(None),
            network: network.name.clone(),
            chain_id: network.chain_id.get(),
            escrow_address: contracts.escrow_address().to_checksum(None),
            token_address: contracts.token_address().to_checksum(None),
            decimals: contracts.decimals(),
            state: session.state().to_string(),
        })?;
        return Ok(());
    }

    output::section("Wallet Session");
    output::key_value("State", session.state());
    output::key_value("Account", active.account());
    output::key_value("Network", format!("{} ({})", network.name, network.chain_id));
    output::key_value("Escrow", contracts.escrow_address());
    output::key_value("Token", contracts.token_address());
    output::key_value("Decimals", contracts.decimals());
    output::key_value("Explorer", network.address_url(&active.account()));
    output::ok("Contracts validated");
    Ok(())
}
