//! Wallet and chain-read ports.
//!
//! The external wallet (a browser extension, a hardware signer, or a local
//! key behind JSON-RPC) is reached through [`WalletProvider`]. Point-in-time
//! reads against the chain node go through [`ChainReader`]. Neither boundary
//! offers consistency across calls: a balance read and a later allowance read
//! may observe different blocks.

use alloy_primitives::{Address, Bytes, TxHash, U256};
use async_trait::async_trait;
use thiserror::Error;

/// EIP-1193 code for a request the user declined.
pub const USER_REJECTED_CODE: i64 = 4001;

/// EIP-1193 code for a chain the wallet does not know about.
pub const UNRECOGNIZED_CHAIN_CODE: i64 = 4902;

/// JSON-RPC code nodes use for reverted calls.
pub const EXECUTION_REVERTED_CODE: i64 = 3;

const REVERT_PREFIX: &str = "execution reverted";

/// Raw failure reported by a wallet or node.
///
/// This never leaves the application layer; it is translated into
/// [`Web3Error`](crate::error::Web3Error) first.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("user rejected the request")]
    UserRejected,

    #[error("execution reverted{}", reason.as_deref().map(|r| format!(": {r}")).unwrap_or_default())]
    Reverted { reason: Option<String> },

    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("transport error: {0}")]
    Transport(String),
}

impl WalletError {
    /// Classify a JSON-RPC error response by code and message.
    pub fn from_rpc(code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        if code == USER_REJECTED_CODE || message.contains("ACTION_REJECTED") {
            return Self::UserRejected;
        }
        if code == EXECUTION_REVERTED_CODE || message.starts_with(REVERT_PREFIX) {
            return Self::Reverted {
                reason: revert_reason(&message),
            };
        }
        Self::Rpc { code, message }
    }
}

/// Extract the reason from a node message like `execution reverted: Closed`.
fn revert_reason(message: &str) -> Option<String> {
    let rest = message.strip_prefix(REVERT_PREFIX)?;
    let reason = rest.trim_start_matches(':').trim();
    (!reason.is_empty()).then(|| reason.to_string())
}

/// A contract call to be signed and sent by the wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
    pub gas_limit: Option<u64>,
    pub gas_price: Option<u128>,
}

impl TransactionRequest {
    #[must_use]
    pub fn call(to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            to,
            data: data.into(),
            value: U256::ZERO,
            gas_limit: None,
            gas_price: None,
        }
    }
}

/// Outcome of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub transaction_hash: TxHash,
    /// `false` when the transaction was mined but reverted.
    pub status: bool,
    pub gas_used: u64,
    pub block_number: Option<u64>,
}

pub type WalletResult<T> = std::result::Result<T, WalletError>;

/// Port for the external wallet.
///
/// Only [`WalletSession`](crate::application::WalletSession) requests
/// accounts or switches chains; contract writes go through a session's
/// signer.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the wallet to expose its accounts. May prompt the user.
    async fn request_accounts(&self) -> WalletResult<Vec<Address>>;

    /// Chain id the wallet is currently pointed at.
    async fn chain_id(&self) -> WalletResult<u64>;

    /// Ask the wallet to move to another chain (`0x`-prefixed hex id).
    async fn switch_chain(&self, hex_chain_id: &str) -> WalletResult<()>;

    /// Sign and broadcast a transaction from `from`.
    async fn send_transaction(
        &self,
        from: Address,
        tx: &TransactionRequest,
    ) -> WalletResult<TxHash>;

    /// Block until the transaction is mined. No timeout is applied.
    async fn wait_for_receipt(&self, hash: TxHash) -> WalletResult<TransactionReceipt>;
}

/// Port for read-only chain access.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Deployed bytecode at `address`; empty when nothing is deployed.
    async fn get_code(&self, address: Address) -> WalletResult<Bytes>;

    /// Execute a read-only call and return the ABI-encoded output.
    async fn call(&self, to: Address, data: Bytes) -> WalletResult<Bytes>;

    /// Current gas price in wei.
    async fn gas_price(&self) -> WalletResult<u128>;

    async fn estimate_gas(&self, from: Address, tx: &TransactionRequest) -> WalletResult<u64>;
}
