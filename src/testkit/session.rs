//! Builders that wire a [`SimulatedChain`] into the application layer.

use std::sync::Arc;

use crate::application::{BettingOrchestrator, OrchestratorConfig, WalletSession};
use crate::domain::NetworkConfig;
use crate::port::{ChainReader, WalletProvider};

use super::chain::SimulatedChain;

/// A simulated chain for `network`, shared so tests can keep poking it.
#[must_use]
pub fn chain(network: &NetworkConfig) -> Arc<SimulatedChain> {
    Arc::new(SimulatedChain::new(network))
}

/// A disconnected session targeting `network`, with `chain` as both the
/// wallet and the node.
#[must_use]
pub fn session(chain: &Arc<SimulatedChain>, network: NetworkConfig) -> Arc<WalletSession> {
    let wallet: Arc<dyn WalletProvider> = chain.clone();
    let reader: Arc<dyn ChainReader> = chain.clone();
    Arc::new(WalletSession::new(wallet, reader, Arc::new(network)))
}

/// An orchestrator over a fresh, disconnected session.
#[must_use]
pub fn orchestrator(
    chain: &Arc<SimulatedChain>,
    network: NetworkConfig,
    config: OrchestratorConfig,
) -> BettingOrchestrator {
    BettingOrchestrator::new(session(chain, network), config)
}
