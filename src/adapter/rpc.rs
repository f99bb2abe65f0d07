//! JSON-RPC wallet backed by a local private key.
//!
//! Stands in for a browser wallet when running headless: the signer holds
//! one account, and "switching chains" means selecting another configured
//! RPC endpoint. Chains without an endpoint are refused with EIP-1193 4902,
//! just as an extension refuses a chain it has never been told about.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use alloy_primitives::{Address, Bytes, TxHash};
use alloy_provider::network::{EthereumWallet, ReceiptResponse};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_types::TransactionRequest as RpcTransactionRequest;
use alloy_signer_local::PrivateKeySigner;
use alloy_transport::TransportError;
use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::domain::{ChainId, NetworkRegistry};
use crate::error::{ConfigError, Result};
use crate::port::{
    ChainReader, TransactionReceipt, TransactionRequest, WalletError, WalletProvider,
    WalletResult, UNRECOGNIZED_CHAIN_CODE,
};

/// EIP-1193 code for an account the wallet has not authorised.
const UNAUTHORIZED_CODE: i64 = 4100;

/// Map a transport failure onto the wallet error taxonomy.
fn classify(err: TransportError) -> WalletError {
    match err.as_error_resp() {
        Some(payload) => WalletError::from_rpc(payload.code, payload.message.to_string()),
        None => WalletError::Transport(err.to_string()),
    }
}

fn to_rpc_request(from: Option<Address>, tx: &TransactionRequest) -> RpcTransactionRequest {
    let mut request = RpcTransactionRequest::default()
        .to(tx.to)
        .input(tx.data.clone().into())
        .value(tx.value);
    request.from = from;
    request.gas = tx.gas_limit;
    request.gas_price = tx.gas_price;
    request
}

/// Local-key wallet with one provider per configured network.
pub struct RpcWallet {
    address: Address,
    providers: HashMap<u64, DynProvider>,
    active: RwLock<u64>,
    poll_interval: Duration,
}

impl RpcWallet {
    /// Build providers for every network with an `rpc_url`, starting on `initial`.
    ///
    /// # Errors
    ///
    /// Returns a config error if the private key is missing or invalid, an
    /// endpoint URL does not parse, or `initial` has no endpoint.
    pub fn new(
        private_key: &str,
        registry: &NetworkRegistry,
        initial: ChainId,
        poll_interval: Duration,
    ) -> Result<Self> {
        if private_key.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "WALLET_PRIVATE_KEY",
            }
            .into());
        }

        let signer = PrivateKeySigner::from_str(private_key.trim()).map_err(|e| {
            ConfigError::InvalidValue {
                field: "WALLET_PRIVATE_KEY",
                reason: e.to_string(),
            }
        })?;
        let address = signer.address();
        let wallet = EthereumWallet::from(signer);

        let mut providers = HashMap::new();
        for network in registry.iter() {
            let Some(rpc_url) = network.rpc_url.as_deref() else {
                continue;
            };
            let url: url::Url = rpc_url.parse().map_err(|e: url::ParseError| {
                ConfigError::InvalidValue {
                    field: "rpc_url",
                    reason: format!("{}: {e}", network.name),
                }
            })?;
            let provider = ProviderBuilder::new()
                .wallet(wallet.clone())
                .connect_http(url)
                .erased();
            providers.insert(network.chain_id.get(), provider);
        }

        if !providers.contains_key(&initial.get()) {
            return Err(ConfigError::InvalidValue {
                field: "rpc_url",
                reason: format!("no RPC endpoint configured for chain {initial}"),
            }
            .into());
        }

        info!(
            address = %address,
            chains = providers.len(),
            initial = %initial,
            "RPC wallet ready"
        );

        Ok(Self {
            address,
            providers,
            active: RwLock::new(initial.get()),
            poll_interval,
        })
    }

    /// Account the local key signs for.
    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    /// Chain whose endpoint is currently selected.
    #[must_use]
    pub fn active_chain(&self) -> ChainId {
        ChainId::new(*self.active.read())
    }

    fn provider(&self) -> WalletResult<&DynProvider> {
        let chain = *self.active.read();
        self.providers
            .get(&chain)
            .ok_or_else(|| WalletError::Transport(format!("no provider for chain {chain}")))
    }
}

#[async_trait]
impl WalletProvider for RpcWallet {
    async fn request_accounts(&self) -> WalletResult<Vec<Address>> {
        Ok(vec![self.address])
    }

    async fn chain_id(&self) -> WalletResult<u64> {
        self.provider()?.get_chain_id().await.map_err(classify)
    }

    async fn switch_chain(&self, hex_chain_id: &str) -> WalletResult<()> {
        let unrecognized = || WalletError::Rpc {
            code: UNRECOGNIZED_CHAIN_CODE,
            message: format!("Unrecognized chain ID \"{hex_chain_id}\""),
        };
        let chain = ChainId::from_hex(hex_chain_id).ok_or_else(unrecognized)?;
        if !self.providers.contains_key(&chain.get()) {
            return Err(unrecognized());
        }

        *self.active.write() = chain.get();
        debug!(chain = %chain, "Switched RPC endpoint");
        Ok(())
    }

    async fn send_transaction(&self, from: Address, tx: &TransactionRequest) -> WalletResult<TxHash> {
        if from != self.address {
            return Err(WalletError::Rpc {
                code: UNAUTHORIZED_CODE,
                message: format!("account {from} is not held by this wallet"),
            });
        }

        let pending = self
            .provider()?
            .send_transaction(to_rpc_request(Some(from), tx))
            .await
            .map_err(classify)?;
        let hash = *pending.tx_hash();
        debug!(tx_hash = %hash, to = %tx.to, "Transaction broadcast");
        Ok(hash)
    }

    async fn wait_for_receipt(&self, hash: TxHash) -> WalletResult<TransactionReceipt> {
        let provider = self.provider()?;
        loop {
            match provider.get_transaction_receipt(hash).await.map_err(classify)? {
                Some(receipt) => {
                    return Ok(TransactionReceipt {
                        transaction_hash: ReceiptResponse::transaction_hash(&receipt),
                        status: ReceiptResponse::status(&receipt),
                        gas_used: ReceiptResponse::gas_used(&receipt),
                        block_number: ReceiptResponse::block_number(&receipt),
                    });
                }
                None => tokio::time::sleep(self.poll_interval).await,
            }
        }
    }
}

#[async_trait]
impl ChainReader for RpcWallet {
    async fn get_code(&self, address: Address) -> WalletResult<Bytes> {
        self.provider()?.get_code_at(address).await.map_err(classify)
    }

    async fn call(&self, to: Address, data: Bytes) -> WalletResult<Bytes> {
        let request = to_rpc_request(None, &TransactionRequest::call(to, data));
        self.provider()?.call(request).await.map_err(classify)
    }

    async fn gas_price(&self) -> WalletResult<u128> {
        self.provider()?.get_gas_price().await.map_err(classify)
    }

    async fn estimate_gas(&self, from: Address, tx: &TransactionRequest) -> WalletResult<u64> {
        self.provider()?
            .estimate_gas(to_rpc_request(Some(from), tx))
            .await
            .map_err(classify)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NetworkConfig;
    use crate::testkit::chain::ACCOUNT;

    /// First well-known development key; its address is [`ACCOUNT`].
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn wallet() -> RpcWallet {
        RpcWallet::new(
            DEV_KEY,
            &NetworkRegistry::builtin(),
            ChainId::SEPOLIA,
            Duration::from_millis(10),
        )
        .unwrap()
    }

    // ---- Construction Tests ----

    #[test]
    fn empty_key_is_missing_field() {
        let result = RpcWallet::new(
            "  ",
            &NetworkRegistry::builtin(),
            ChainId::SEPOLIA,
            Duration::from_secs(1),
        );
        assert!(matches!(
            result,
            Err(crate::error::Error::Config(ConfigError::MissingField {
                field: "WALLET_PRIVATE_KEY"
            }))
        ));
    }

    #[test]
    fn malformed_key_is_invalid_value() {
        let result = RpcWallet::new(
            "0xnothex",
            &NetworkRegistry::builtin(),
            ChainId::SEPOLIA,
            Duration::from_secs(1),
        );
        assert!(matches!(
            result,
            Err(crate::error::Error::Config(ConfigError::InvalidValue {
                field: "WALLET_PRIVATE_KEY",
                ..
            }))
        ));
    }

    #[test]
    fn initial_chain_needs_an_endpoint() {
        let mut registry = NetworkRegistry::builtin();
        let mut sepolia = NetworkConfig::sepolia();
        sepolia.rpc_url = None;
        registry.insert(sepolia);

        let result = RpcWallet::new(DEV_KEY, &registry, ChainId::SEPOLIA, Duration::from_secs(1));
        assert!(matches!(
            result,
            Err(crate::error::Error::Config(ConfigError::InvalidValue {
                field: "rpc_url",
                ..
            }))
        ));
    }

    // ---- Wallet Tests ----

    #[tokio::test]
    async fn exposes_the_key_address() {
        let wallet = wallet();
        assert_eq!(wallet.address(), ACCOUNT);
        assert_eq!(wallet.request_accounts().await.unwrap(), vec![ACCOUNT]);
    }

    #[tokio::test]
    async fn unknown_chain_switch_is_4902() {
        let wallet = wallet();
        let err = wallet.switch_chain("0x1").await.unwrap_err();
        assert!(matches!(
            err,
            WalletError::Rpc {
                code: UNRECOGNIZED_CHAIN_CODE,
                ..
            }
        ));
        assert_eq!(wallet.active_chain(), ChainId::SEPOLIA);
    }

    #[tokio::test]
    async fn switch_to_configured_chain_selects_it() {
        let wallet = wallet();
        wallet.switch_chain("0xaa36a7").await.unwrap();
        assert_eq!(wallet.active_chain(), ChainId::SEPOLIA);
    }

    #[tokio::test]
    async fn foreign_sender_is_unauthorized() {
        let wallet = wallet();
        let tx = TransactionRequest::call(Address::ZERO, Bytes::new());
        let err = wallet
            .send_transaction(Address::repeat_byte(1), &tx)
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::Rpc { code: 4100, .. }));
    }

    #[test]
    fn rpc_request_carries_gas_fields() {
        let mut tx = TransactionRequest::call(ACCOUNT, vec![1u8, 2, 3]);
        tx.gas_limit = Some(60_000);
        tx.gas_price = Some(2);
        let request = to_rpc_request(Some(ACCOUNT), &tx);
        assert_eq!(request.from, Some(ACCOUNT));
        assert_eq!(request.gas, Some(60_000));
        assert_eq!(request.gas_price, Some(2));
    }
}
