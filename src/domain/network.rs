//! Chain identifiers and the static network table.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use alloy_primitives::{address, Address, TxHash};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Numeric EIP-155 chain identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(u64);

impl ChainId {
    pub const MAINNET: Self = Self(1);
    pub const SEPOLIA: Self = Self(11_155_111);

    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// `0x`-prefixed lowercase hex form used by wallet chain-switch requests.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("{:#x}", self.0)
    }

    /// Parse a `0x`-prefixed hex chain id.
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex
            .strip_prefix("0x")
            .or_else(|| hex.strip_prefix("0X"))?;
        u64::from_str_radix(digits, 16).ok().map(Self)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Everything needed to talk to one deployment of the escrow and its token.
///
/// Built once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub name: String,
    pub chain_id: ChainId,
    pub hex_chain_id: String,
    pub escrow_address: Address,
    pub token_address: Address,
    pub explorer_url: String,
    /// Test network where the token exposes a public `mint`.
    pub sandbox: bool,
    /// JSON-RPC endpoint, used only by the RPC wallet adapter.
    pub rpc_url: Option<String>,
}

impl NetworkConfig {
    /// Sepolia deployment of the escrow and its mintable test token.
    #[must_use]
    pub fn sepolia() -> Self {
        Self {
            name: "Sepolia Testnet".into(),
            chain_id: ChainId::SEPOLIA,
            hex_chain_id: ChainId::SEPOLIA.to_hex(),
            escrow_address: address!("1839611f77279106AC4b2B522AD90B1903651f55"),
            token_address: address!("92A1c620751ba38e885461c3e356D41a226962f3"),
            explorer_url: "https://sepolia.etherscan.io".into(),
            sandbox: true,
            rpc_url: Some("https://ethereum-sepolia-rpc.publicnode.com".into()),
        }
    }

    /// Block explorer link for a transaction.
    #[must_use]
    pub fn transaction_url(&self, hash: &TxHash) -> String {
        format!("{}/tx/{hash}", self.explorer_url.trim_end_matches('/'))
    }

    /// Block explorer link for an address.
    #[must_use]
    pub fn address_url(&self, address: &Address) -> String {
        format!("{}/address/{address}", self.explorer_url.trim_end_matches('/'))
    }
}

/// Read-only table from chain id to network metadata.
///
/// Lookups hand out shared references, so repeated lookups of one chain
/// return the same instance.
#[derive(Debug, Clone, Default)]
pub struct NetworkRegistry {
    networks: BTreeMap<ChainId, Arc<NetworkConfig>>,
}

impl NetworkRegistry {
    /// Registry holding only the built-in deployments.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::default();
        registry.insert(NetworkConfig::sepolia());
        registry
    }

    /// Add a network, replacing any entry for the same chain.
    pub fn insert(&mut self, network: NetworkConfig) {
        self.networks.insert(network.chain_id, Arc::new(network));
    }

    /// Resolve the configuration for `chain_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownChain`] when the chain is not in the table.
    pub fn lookup(&self, chain_id: ChainId) -> Result<Arc<NetworkConfig>, ConfigError> {
        self.networks
            .get(&chain_id)
            .cloned()
            .ok_or(ConfigError::UnknownChain {
                chain_id: chain_id.get(),
            })
    }

    #[must_use]
    pub fn contains(&self, chain_id: ChainId) -> bool {
        self.networks.contains_key(&chain_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<NetworkConfig>> {
        self.networks.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.networks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}

impl FromIterator<NetworkConfig> for NetworkRegistry {
    fn from_iter<I: IntoIterator<Item = NetworkConfig>>(iter: I) -> Self {
        let mut registry = Self::default();
        for network in iter {
            registry.insert(network);
        }
        registry
    }
}
