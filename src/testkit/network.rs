//! Canonical network entries for tests.

use alloy_primitives::Address;

use crate::domain::{ChainId, NetworkConfig};

/// Sepolia, the built-in sandbox network.
#[must_use]
pub fn sandbox() -> NetworkConfig {
    NetworkConfig::sepolia()
}

/// A production-style network: no mint, no RPC endpoint.
#[must_use]
pub fn mainnet_like() -> NetworkConfig {
    NetworkConfig {
        name: "Ethereum Mainnet".into(),
        chain_id: ChainId::MAINNET,
        hex_chain_id: ChainId::MAINNET.to_hex(),
        escrow_address: Address::repeat_byte(0xe5),
        token_address: Address::repeat_byte(0x70),
        explorer_url: "https://etherscan.io".into(),
        sandbox: false,
        rpc_url: None,
    }
}
