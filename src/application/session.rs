//! Wallet session lifecycle.
//!
//! ```text
//! Disconnected ─connect─▶ Connecting ─▶ NetworkValidating ─▶ ContractLoading ─▶ Ready
//!       ▲                      │                │                   │              │
//!       └──────── any failure: full cleanup ◀───┴───────────────────┘   disconnect ┘
//! ```
//!
//! The signer, the provider, the network and the contract binding are
//! published together as one [`ActiveSession`] or not at all.

use std::fmt;
use std::sync::Arc;

use alloy_primitives::{Address, TxHash};
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::contracts::{ChainAccess, ContractBinding, EscrowContract, GasPolicy, TokenContract};
use crate::domain::{ChainId, NetworkConfig, NetworkRegistry};
use crate::error::{Result, Web3Error};
use crate::port::{
    ChainReader, TransactionReceipt, TransactionRequest, WalletProvider, WalletResult,
};

/// Observable connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    NetworkValidating,
    ContractLoading,
    Ready,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::NetworkValidating => "validating network",
            Self::ContractLoading => "loading contracts",
            Self::Ready => "ready",
        };
        f.write_str(name)
    }
}

/// An account the wallet will sign for.
#[derive(Clone)]
pub struct Signer {
    address: Address,
    wallet: Arc<dyn WalletProvider>,
}

impl Signer {
    fn new(address: Address, wallet: Arc<dyn WalletProvider>) -> Self {
        Self { address, wallet }
    }

    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    pub(crate) async fn send(&self, tx: &TransactionRequest) -> WalletResult<TxHash> {
        self.wallet.send_transaction(self.address, tx).await
    }

    pub(crate) async fn wait(&self, hash: TxHash) -> WalletResult<TransactionReceipt> {
        self.wallet.wait_for_receipt(hash).await
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer").field("address", &self.address).finish()
    }
}

/// Everything a connected session holds.
pub struct ActiveSession {
    provider: Arc<dyn ChainReader>,
    signer: Signer,
    network: Arc<NetworkConfig>,
    contracts: ContractBinding,
}

impl ActiveSession {
    #[must_use]
    pub fn account(&self) -> Address {
        self.signer.address()
    }

    #[must_use]
    pub fn network(&self) -> &Arc<NetworkConfig> {
        &self.network
    }

    #[must_use]
    pub fn contracts(&self) -> &ContractBinding {
        &self.contracts
    }

    #[must_use]
    pub fn access<'a>(&'a self, gas: &'a GasPolicy) -> ChainAccess<'a> {
        ChainAccess {
            reader: self.provider.as_ref(),
            signer: &self.signer,
            gas,
        }
    }

    #[must_use]
    pub fn token<'a>(&'a self, gas: &'a GasPolicy) -> TokenContract<'a> {
        self.contracts.token(self.access(gas))
    }

    #[must_use]
    pub fn escrow<'a>(&'a self, gas: &'a GasPolicy) -> EscrowContract<'a> {
        self.contracts.escrow(self.access(gas))
    }
}

struct SessionSlot {
    state: SessionState,
    active: Option<Arc<ActiveSession>>,
}

/// Connection to an external wallet, pinned to one target network.
///
/// The only component allowed to request accounts or switch chains.
pub struct WalletSession {
    wallet: Arc<dyn WalletProvider>,
    reader: Arc<dyn ChainReader>,
    target: Arc<NetworkConfig>,
    slot: RwLock<SessionSlot>,
    connect_lock: Mutex<()>,
}

impl WalletSession {
    pub fn new(
        wallet: Arc<dyn WalletProvider>,
        reader: Arc<dyn ChainReader>,
        target: Arc<NetworkConfig>,
    ) -> Self {
        Self {
            wallet,
            reader,
            target,
            slot: RwLock::new(SessionSlot {
                state: SessionState::Disconnected,
                active: None,
            }),
            connect_lock: Mutex::new(()),
        }
    }

    /// Build a session targeting `chain_id` from the network table.
    ///
    /// # Errors
    ///
    /// Returns a config error if the chain is not registered.
    pub fn for_chain(
        wallet: Arc<dyn WalletProvider>,
        reader: Arc<dyn ChainReader>,
        registry: &NetworkRegistry,
        chain_id: ChainId,
    ) -> Result<Self> {
        let target = registry.lookup(chain_id)?;
        Ok(Self::new(wallet, reader, target))
    }

    /// Connect and return the signing account.
    ///
    /// Idempotent: once `Ready`, further calls return the current account
    /// without touching the wallet. Concurrent callers wait for the first
    /// handshake to finish.
    ///
    /// # Errors
    ///
    /// - [`Web3Error::NoAccounts`] / [`Web3Error::UserRejected`] from account discovery
    /// - [`Web3Error::NetworkSwitchFailed`] if the wallet will not move chains
    /// - contract validation errors from [`ContractBinding::load_and_validate`]
    ///
    /// On any error the session is fully cleared before returning.
    pub async fn connect(&self) -> Result<Address> {
        let _guard = self.connect_lock.lock().await;

        if let Some(active) = self.active() {
            return Ok(active.account());
        }

        match self.handshake().await {
            Ok(active) => {
                let account = active.account();
                let mut slot = self.slot.write();
                slot.state = SessionState::Ready;
                slot.active = Some(active);
                info!(
                    account = %account,
                    network = %self.target.name,
                    "Wallet session ready"
                );
                Ok(account)
            }
            Err(err) => {
                warn!(
                    error = %err,
                    failed_during = %self.state(),
                    "Wallet connection failed, clearing session"
                );
                self.clear();
                Err(err)
            }
        }
    }

    async fn handshake(&self) -> Result<Arc<ActiveSession>> {
        self.set_state(SessionState::Connecting);
        let accounts = self
            .wallet
            .request_accounts()
            .await
            .map_err(|e| Web3Error::from_read("request accounts", e))?;
        let account = *accounts.first().ok_or(Web3Error::NoAccounts)?;
        let signer = Signer::new(account, Arc::clone(&self.wallet));

        self.set_state(SessionState::NetworkValidating);
        let network = self.validate_network().await?;

        self.set_state(SessionState::ContractLoading);
        let contracts = ContractBinding::load_and_validate(self.reader.as_ref(), &network).await?;

        Ok(Arc::new(ActiveSession {
            provider: Arc::clone(&self.reader),
            signer,
            network,
            contracts,
        }))
    }

    /// Make sure the wallet is on the target chain, asking it to switch if not.
    async fn validate_network(&self) -> Result<Arc<NetworkConfig>> {
        let target = &self.target;
        let current = self
            .wallet
            .chain_id()
            .await
            .map_err(|e| Web3Error::from_read("eth_chainId", e))?;

        if current != target.chain_id.get() {
            info!(
                current,
                target = %target.chain_id,
                hex = %target.hex_chain_id,
                "Requesting wallet chain switch"
            );
            let switch_failed = |reason: String| Web3Error::NetworkSwitchFailed {
                target: target.name.clone(),
                reason,
            };

            self.wallet
                .switch_chain(&target.hex_chain_id)
                .await
                .map_err(|e| switch_failed(e.to_string()))?;

            let switched = self
                .wallet
                .chain_id()
                .await
                .map_err(|e| switch_failed(e.to_string()))?;
            if switched != target.chain_id.get() {
                return Err(switch_failed(format!("wallet still on chain {switched}")).into());
            }
        }

        Ok(Arc::clone(target))
    }

    /// Drop every handle. Always succeeds.
    pub fn disconnect(&self) {
        if self.is_connected() {
            info!(network = %self.target.name, "Wallet session disconnected");
        }
        self.clear();
    }

    fn clear(&self) {
        let mut slot = self.slot.write();
        slot.active = None;
        slot.state = SessionState::Disconnected;
    }

    fn set_state(&self, state: SessionState) {
        self.slot.write().state = state;
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.slot.read().state
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.slot.read().active.is_some()
    }

    /// Snapshot of the connected session, if `Ready`.
    #[must_use]
    pub fn active(&self) -> Option<Arc<ActiveSession>> {
        self.slot.read().active.clone()
    }

    #[must_use]
    pub fn account(&self) -> Option<Address> {
        self.slot.read().active.as_ref().map(|a| a.account())
    }

    /// Network of the connected session; `None` unless `Ready`.
    #[must_use]
    pub fn network(&self) -> Option<Arc<NetworkConfig>> {
        self.slot.read().active.as_ref().map(|a| Arc::clone(&a.network))
    }

    #[must_use]
    pub fn target(&self) -> &Arc<NetworkConfig> {
        &self.target
    }
}
