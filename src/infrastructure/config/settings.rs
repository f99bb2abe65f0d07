//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all settings.
//! Configuration is loaded from a TOML file with environment variable
//! overrides for `WALLET_PRIVATE_KEY` and `BETLINE_SANDBOX_MINT`.
//!
//! # Example
//!
//! ```no_run
//! use betline::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use super::gas::GasConfig;
use super::logging::LoggingConfig;
use super::network::NetworkEntry;
use super::wallet::WalletConfig;
use crate::application::OrchestratorConfig;
use crate::domain::{ChainId, NetworkConfig, NetworkRegistry};
use crate::error::{ConfigError, Result};

/// Environment variable that turns the sandbox mint on or off.
pub const SANDBOX_MINT_ENV: &str = "BETLINE_SANDBOX_MINT";

const PRIVATE_KEY_ENV: &str = "WALLET_PRIVATE_KEY";

fn default_target_chain() -> u64 {
    ChainId::SEPOLIA.get()
}

/// `1`, `true` and `yes` enable a flag; anything else disables it.
fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name).ok().map(|value| {
        matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes"
        )
    })
}

/// Main application configuration.
///
/// Load from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`].
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Chain the wallet session targets.
    #[serde(default = "default_target_chain")]
    pub target_chain: u64,

    /// Mint test tokens when a wager exceeds the balance.
    ///
    /// Only valid when the target network is a sandbox.
    #[serde(default)]
    pub sandbox_mint: bool,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub gas: GasConfig,

    /// Private key is loaded from the `WALLET_PRIVATE_KEY` environment variable.
    #[serde(default)]
    pub wallet: WalletConfig,

    /// Extra networks, or overrides of built-in ones by chain id.
    #[serde(default)]
    pub networks: Vec<NetworkEntry>,

    #[serde(skip)]
    registry: NetworkRegistry,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_chain: default_target_chain(),
            sandbox_mint: false,
            logging: LoggingConfig::default(),
            gas: GasConfig::default(),
            wallet: WalletConfig::default(),
            networks: Vec::new(),
            registry: NetworkRegistry::builtin(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The TOML content is malformed
    /// - A `[[networks]]` entry is invalid
    /// - Validation fails (unknown target chain, mint on a non-sandbox network)
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;

        // Never read from the config file.
        config.wallet.private_key = std::env::var(PRIVATE_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty());
        if let Some(enabled) = env_flag(SANDBOX_MINT_ENV) {
            config.sandbox_mint = enabled;
        }

        let mut registry = NetworkRegistry::builtin();
        for entry in config.networks.clone() {
            registry.insert(entry.into_network()?);
        }
        config.registry = registry;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or [`Config::parse_toml`]
    /// rejects it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    fn validate(&self) -> Result<()> {
        let target = self.target_network()?;

        if self.sandbox_mint && !target.sandbox {
            return Err(ConfigError::InvalidValue {
                field: "sandbox_mint",
                reason: format!("{} is not a sandbox network", target.name),
            }
            .into());
        }
        if self.wallet.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "poll_interval_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.gas.limit_buffer_percent > 100 {
            return Err(ConfigError::InvalidValue {
                field: "limit_buffer_percent",
                reason: "must be at most 100".to_string(),
            }
            .into());
        }
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "logging.level",
            }
            .into());
        }
        Ok(())
    }

    /// Point the session at another chain, re-checking dependent settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the chain is not registered or the sandbox mint
    /// is enabled and the new network is not a sandbox.
    pub fn set_target_chain(&mut self, chain_id: u64) -> Result<()> {
        let previous = std::mem::replace(&mut self.target_chain, chain_id);
        if let Err(err) = self.validate() {
            self.target_chain = previous;
            return Err(err);
        }
        Ok(())
    }

    /// Built-in networks merged with `[[networks]]` entries.
    #[must_use]
    pub fn registry(&self) -> &NetworkRegistry {
        &self.registry
    }

    #[must_use]
    pub fn target_chain_id(&self) -> ChainId {
        ChainId::new(self.target_chain)
    }

    /// Registry record for [`Config::target_chain`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownChain`] if the chain is not registered.
    pub fn target_network(&self) -> Result<Arc<NetworkConfig>> {
        Ok(self.registry.lookup(self.target_chain_id())?)
    }

    #[must_use]
    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            gas: self.gas.policy(),
            sandbox_mint: self.sandbox_mint,
        }
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
