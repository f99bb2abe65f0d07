//! Config loading and session wiring shared by the subcommands.

use std::path::Path;

use super::{output, ConfigArgs};
use crate::error::{ConfigError, Result};
use crate::infrastructure::config::Config;

/// Config path used when `--config` is not given.
pub const DEFAULT_CONFIG: &str = "config.toml";

/// Load the config named by `args` and apply `--chain-id`.
///
/// A missing file at the default path falls back to built-in defaults, so
/// the Sepolia deployment works without any config file.
///
/// # Errors
///
/// Returns config errors from loading, parsing or validation.
pub fn load_config(args: &ConfigArgs) -> Result<Config> {
    let mut config = if args.config.as_path() == Path::new(DEFAULT_CONFIG) && !args.config.exists() {
        Config::parse_toml("")?
    } else {
        Config::load(&args.config)?
    };

    if let Some(chain_id) = args.chain_id {
        config.set_target_chain(chain_id)?;
    }
    config.init_logging();
    Ok(config)
}

/// JSON mode never prompts, so state-changing commands need `--yes`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] in JSON mode without `--yes`.
pub fn require_noninteractive_consent(yes: bool) -> Result<()> {
    if output::is_json() && !yes {
        return Err(ConfigError::InvalidValue {
            field: "--yes",
            reason: "--json requires --yes for state-changing commands".to_string(),
        }
        .into());
    }
    Ok(())
}

#[cfg(feature = "rpc")]
pub use rpc::connect;

#[cfg(feature = "rpc")]
mod rpc {
    use std::sync::Arc;

    use crate::adapter::RpcWallet;
    use crate::application::{BettingOrchestrator, WalletSession};
    use crate::cli::output;
    use crate::error::{ConfigError, Result};
    use crate::infrastructure::config::Config;
    use crate::port::{ChainReader, WalletProvider};

    /// Build the RPC wallet, connect a session on the target chain, and
    /// wrap it in an orchestrator.
    ///
    /// # Errors
    ///
    /// Returns a config error when `WALLET_PRIVATE_KEY` is unset, or any
    /// connection error from [`WalletSession::connect`].
    pub async fn connect(config: &Config) -> Result<BettingOrchestrator> {
        let private_key = config
            .wallet
            .private_key
            .as_deref()
            .ok_or(ConfigError::MissingField {
                field: "WALLET_PRIVATE_KEY",
            })?;
        let target = config.target_network()?;

        let wallet = Arc::new(RpcWallet::new(
            private_key,
            config.registry(),
            target.chain_id,
            config.wallet.poll_interval(),
        )?);
        let provider: Arc<dyn WalletProvider> = wallet.clone();
        let reader: Arc<dyn ChainReader> = wallet;
        let session = Arc::new(WalletSession::new(provider, reader, target));

        output::progress(&format!("Connecting to {}", session.target().name));
        let connected = session.connect().await;
        output::progress_done(connected.is_ok());
        connected?;

        Ok(BettingOrchestrator::new(session, config.orchestrator_config()))
    }
}
