//! Network table listing.

use serde::Serialize;
use tabled::{Table, Tabled};

use super::{context, output, ConfigArgs};
use crate::domain::{ChainId, NetworkConfig};
use crate::error::Result;

#[derive(Tabled)]
struct NetworkRow {
    #[tabled(rename = "")]
    marker: &'static str,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Chain")]
    chain_id: ChainId,
    #[tabled(rename = "Hex")]
    hex: String,
    #[tabled(rename = "Escrow")]
    escrow: String,
    #[tabled(rename = "Sandbox")]
    sandbox: &'static str,
}

#[derive(Serialize)]
struct NetworkJson<'a> {
    name: &'a str,
    chain_id: ChainId,
    hex_chain_id: &'a str,
    escrow_address: String,
    token_address: String,
    explorer_url: &'a str,
    sandbox: bool,
    target: bool,
}

impl<'a> NetworkJson<'a> {
    fn new(network: &'a NetworkConfig, target: bool) -> Self {
        Self {
            name: &network.name,
            chain_id: network.chain_id,
            hex_chain_id: &network.hex_chain_id,
            escrow_address: network.escrow_address.to_checksum(None),
            token_address: network.token_address.to_checksum(None),
            explorer_url: &network.explorer_url,
            sandbox: network.sandbox,
            target,
        }
    }
}

/// List every network in the registry, marking the target.
pub fn execute(args: &ConfigArgs) -> Result<()> {
    let config = context::load_config(args)?;
    let target = config.target_chain_id();

    if output::is_json() {
        let networks: Vec<_> = config
            .registry()
            .iter()
            .map(|n| NetworkJson::new(n, n.chain_id == target))
            .collect();
        output::json(&networks)?;
        return Ok(());
    }

    output::section("Networks");
    let rows: Vec<NetworkRow> = config
        .registry()
        .iter()
        .map(|n| NetworkRow {
            marker: if n.chain_id == target { "*" } else { "" },
            name: n.name.clone(),
            chain_id: n.chain_id,
            hex: n.hex_chain_id.clone(),
            escrow: n.escrow_address.to_checksum(None),
            sandbox: if n.sandbox { "yes" } else { "no" },
        })
        .collect();

    let table = Table::new(rows).to_string();
    for line in table.lines() {
        println!("  {line}");
    }
    println!();
    output::note("* target network");
    Ok(())
}
