//! `[[networks]]` entries layered over the built-in network table.

use serde::Deserialize;

use crate::domain::{parse_address, ChainId, NetworkConfig};
use crate::error::{ConfigError, Result};

/// One network as written in the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkEntry {
    pub name: String,
    pub chain_id: u64,
    /// Defaults to the hex form of `chain_id`; must agree with it if given.
    #[serde(default)]
    pub hex_chain_id: Option<String>,
    pub escrow_address: String,
    pub token_address: String,
    pub explorer_url: String,
    #[serde(default)]
    pub sandbox: bool,
    #[serde(default)]
    pub rpc_url: Option<String>,
}

impl NetworkEntry {
    /// Validate the entry and convert it into a registry record.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a malformed address, a
    /// `hex_chain_id` that disagrees with `chain_id`, or an empty name.
    pub fn into_network(self) -> Result<NetworkConfig> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "networks.name",
            }
            .into());
        }

        let chain_id = ChainId::new(self.chain_id);
        let hex_chain_id = match self.hex_chain_id {
            Some(hex) => {
                if ChainId::from_hex(&hex) != Some(chain_id) {
                    return Err(ConfigError::InvalidValue {
                        field: "networks.hex_chain_id",
                        reason: format!("{hex} does not match chain id {chain_id}"),
                    }
                    .into());
                }
                hex.to_lowercase()
            }
            None => chain_id.to_hex(),
        };

        let escrow_address =
            parse_address(&self.escrow_address).map_err(|e| ConfigError::InvalidValue {
                field: "networks.escrow_address",
                reason: e.to_string(),
            })?;
        let token_address =
            parse_address(&self.token_address).map_err(|e| ConfigError::InvalidValue {
                field: "networks.token_address",
                reason: e.to_string(),
            })?;

        Ok(NetworkConfig {
            name: self.name,
            chain_id,
            hex_chain_id,
            escrow_address,
            token_address,
            explorer_url: self.explorer_url,
            sandbox: self.sandbox,
            rpc_url: self.rpc_url.filter(|url| !url.trim().is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn entry() -> NetworkEntry {
        NetworkEntry {
            name: "Anvil".into(),
            chain_id: 31337,
            hex_chain_id: None,
            escrow_address: "0x5FbDB2315678afecb367f032d93F642f64180aa3".into(),
            token_address: "0xe7f1725e7734ce288f8367e1bb143e90bb3f0512".into(),
            explorer_url: "http://localhost:8545".into(),
            sandbox: true,
            rpc_url: Some("http://localhost:8545".into()),
        }
    }

    #[test]
    fn hex_chain_id_defaults_from_chain_id() {
        let network = entry().into_network().unwrap();
        assert_eq!(network.hex_chain_id, "0x7a69");
        assert_eq!(network.chain_id, ChainId::new(31337));
    }

    #[test]
    fn mismatched_hex_chain_id_rejected() {
        let mut entry = entry();
        entry.hex_chain_id = Some("0x1".into());
        assert!(matches!(
            entry.into_network(),
            Err(Error::Config(ConfigError::InvalidValue {
                field: "networks.hex_chain_id",
                ..
            }))
        ));
    }

    #[test]
    fn uppercase_hex_chain_id_is_normalised() {
        let mut entry = entry();
        entry.hex_chain_id = Some("0x7A69".into());
        assert_eq!(entry.into_network().unwrap().hex_chain_id, "0x7a69");
    }

    #[test]
    fn bad_checksum_rejected() {
        let mut entry = entry();
        entry.escrow_address = "0x5fbDB2315678afecb367f032d93F642f64180aa3".into();
        assert!(matches!(
            entry.into_network(),
            Err(Error::Config(ConfigError::InvalidValue {
                field: "networks.escrow_address",
                ..
            }))
        ));
    }

    #[test]
    fn blank_rpc_url_dropped() {
        let mut entry = entry();
        entry.rpc_url = Some("  ".into());
        assert_eq!(entry.into_network().unwrap().rpc_url, None);
    }
}
