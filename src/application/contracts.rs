//! Escrow and token contract bindings.
//!
//! A [`ContractBinding`] is produced only after both deployments have been
//! checked: code exists at each address and the escrow agrees with the
//! configuration about which token it holds. Reads and writes go through
//! short-lived views that borrow the session's reader and signer.

use alloy_primitives::{Address, U256};
use alloy_sol_types::{sol, SolCall};
use tracing::{debug, info};

use super::session::Signer;
use crate::domain::{MarketId, NetworkConfig};
use crate::error::{Result, Web3Error};
use crate::port::{ChainReader, TransactionReceipt, TransactionRequest};

sol! {
    interface IBettingEscrow {
        function placeBet(uint256 marketId, uint256 amount) external;
        function usdtToken() external view returns (address);
        function containsParticipant(uint256 marketId, address participant) external view returns (bool);
        function marketEscrow(uint256 marketId) external view returns (uint256);
        function volume() external view returns (uint256);
        function activeBetCount() external view returns (uint256);
    }

    interface IWagerToken {
        function approve(address spender, uint256 amount) external returns (bool);
        function allowance(address owner, address spender) external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
        function mint(address to, uint256 amount) external;
        function decimals() external view returns (uint8);
    }
}

const GWEI: u128 = 1_000_000_000;

/// Limits applied to every transaction before it is handed to the wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasPolicy {
    /// Refuse to send above this gas price (wei). `None` disables the cap.
    pub max_gas_price: Option<u128>,
    /// Headroom added on top of the node's gas estimate.
    pub limit_buffer_percent: u64,
}

impl GasPolicy {
    #[must_use]
    pub fn from_gwei(max_gas_price_gwei: u64, limit_buffer_percent: u64) -> Self {
        Self {
            max_gas_price: (max_gas_price_gwei > 0).then(|| u128::from(max_gas_price_gwei) * GWEI),
            limit_buffer_percent,
        }
    }

    fn check_price(&self, gas_price: u128) -> std::result::Result<(), Web3Error> {
        match self.max_gas_price {
            Some(max) if gas_price > max => Err(Web3Error::GasPriceTooHigh {
                current_gwei: gas_price / GWEI,
                max_gwei: max / GWEI,
            }),
            _ => Ok(()),
        }
    }

    fn buffered_limit(&self, estimate: u64) -> u64 {
        let limit = u128::from(estimate) * u128::from(100 + self.limit_buffer_percent) / 100;
        u64::try_from(limit).unwrap_or(u64::MAX)
    }
}

impl Default for GasPolicy {
    fn default() -> Self {
        Self::from_gwei(1000, 20)
    }
}

/// Execute a read-only contract call and decode its return value.
async fn read<C: SolCall + Send>(
    reader: &dyn ChainReader,
    context: &'static str,
    to: Address,
    call: C,
) -> Result<C::Return> {
    let output = reader
        .call(to, call.abi_encode().into())
        .await
        .map_err(|e| Web3Error::from_read(context, e))?;

    C::abi_decode_returns(&output).map_err(|e| {
        Web3Error::Provider {
            context,
            message: format!("undecodable return data: {e}"),
        }
        .into()
    })
}

/// Validated addresses and cached token precision for one network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractBinding {
    escrow: Address,
    token: Address,
    decimals: u8,
}

impl ContractBinding {
    /// Verify both deployments for `network` and cache the token decimals.
    ///
    /// # Errors
    ///
    /// - [`Web3Error::ContractNotFound`] when either address has no code
    /// - [`Web3Error::ContractMismatch`] when the escrow holds another token
    /// - [`Web3Error::Provider`] when a read fails
    pub async fn load_and_validate(
        reader: &dyn ChainReader,
        network: &NetworkConfig,
    ) -> Result<Self> {
        let escrow = network.escrow_address;
        let token = network.token_address;

        let (escrow_code, token_code) = tokio::join!(reader.get_code(escrow), reader.get_code(token));
        for (address, code) in [(escrow, escrow_code), (token, token_code)] {
            let code = code.map_err(|e| Web3Error::from_read("eth_getCode", e))?;
            if code.is_empty() {
                return Err(Web3Error::ContractNotFound {
                    address: address.to_string(),
                }
                .into());
            }
        }

        let escrow_token = read(reader, "usdtToken", escrow, IBettingEscrow::usdtTokenCall {}).await?;
        // Address equality is byte-wise, so checksum casing never matters here.
        if escrow_token != token {
            return Err(Web3Error::ContractMismatch {
                expected: token.to_string(),
                actual: escrow_token.to_string(),
            }
            .into());
        }

        let decimals = read(reader, "decimals", token, IWagerToken::decimalsCall {}).await?;

        info!(
            network = %network.name,
            escrow = %escrow,
            token = %token,
            decimals,
            "Contracts validated"
        );

        Ok(Self {
            escrow,
            token,
            decimals,
        })
    }

    #[must_use]
    pub fn escrow_address(&self) -> Address {
        self.escrow
    }

    #[must_use]
    pub fn token_address(&self) -> Address {
        self.token
    }

    #[must_use]
    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    #[must_use]
    pub fn escrow<'a>(&self, access: ChainAccess<'a>) -> EscrowContract<'a> {
        EscrowContract {
            address: self.escrow,
            access,
        }
    }

    #[must_use]
    pub fn token<'a>(&self, access: ChainAccess<'a>) -> TokenContract<'a> {
        TokenContract {
            address: self.token,
            access,
        }
    }
}

/// Borrowed handles needed to read from and write to the chain.
#[derive(Clone, Copy)]
pub struct ChainAccess<'a> {
    pub reader: &'a dyn ChainReader,
    pub signer: &'a Signer,
    pub gas: &'a GasPolicy,
}

impl ChainAccess<'_> {
    /// Price-check, estimate, sign, send and wait for one contract call.
    ///
    /// A revert surfaced at any stage, including gas estimation, becomes
    /// [`Web3Error::TransactionReverted`]; a user rejection becomes
    /// [`Web3Error::UserRejected`].
    async fn transact<C: SolCall + Send>(
        &self,
        context: &'static str,
        to: Address,
        call: C,
    ) -> Result<TransactionReceipt> {
        let gas_price = self
            .reader
            .gas_price()
            .await
            .map_err(|e| Web3Error::from_read(context, e))?;
        self.gas.check_price(gas_price)?;

        let mut tx = TransactionRequest::call(to, call.abi_encode());
        let estimate = self
            .reader
            .estimate_gas(self.signer.address(), &tx)
            .await
            .map_err(|e| Web3Error::from_wallet(context, e))?;
        tx.gas_limit = Some(self.gas.buffered_limit(estimate));
        tx.gas_price = Some(gas_price);

        let hash = self
            .signer
            .send(&tx)
            .await
            .map_err(|e| Web3Error::from_wallet(context, e))?;
        debug!(context, tx_hash = %hash, gas_limit = ?tx.gas_limit, "Transaction submitted");

        let receipt = self
            .signer
            .wait(hash)
            .await
            .map_err(|e| Web3Error::from_wallet(context, e))?;
        if !receipt.status {
            return Err(Web3Error::TransactionReverted { reason: None }.into());
        }

        debug!(context, tx_hash = %hash, gas_used = receipt.gas_used, "Transaction mined");
        Ok(receipt)
    }
}

/// View over the wagering token.
pub struct TokenContract<'a> {
    address: Address,
    access: ChainAccess<'a>,
}

impl TokenContract<'_> {
    pub async fn balance_of(&self, account: Address) -> Result<U256> {
        read(
            self.access.reader,
            "balanceOf",
            self.address,
            IWagerToken::balanceOfCall { account },
        )
        .await
    }

    pub async fn allowance(&self, owner: Address, spender: Address) -> Result<U256> {
        read(
            self.access.reader,
            "allowance",
            self.address,
            IWagerToken::allowanceCall { owner, spender },
        )
        .await
    }

    pub async fn approve(&self, spender: Address, amount: U256) -> Result<TransactionReceipt> {
        self.access
            .transact(
                "approve",
                self.address,
                IWagerToken::approveCall { spender, amount },
            )
            .await
    }

    /// Only test-network tokens expose this.
    pub async fn mint(&self, to: Address, amount: U256) -> Result<TransactionReceipt> {
        self.access
            .transact("mint", self.address, IWagerToken::mintCall { to, amount })
            .await
    }
}

/// View over the betting escrow.
pub struct EscrowContract<'a> {
    address: Address,
    access: ChainAccess<'a>,
}

impl EscrowContract<'_> {
    pub async fn place_bet(&self, market_id: MarketId, amount: U256) -> Result<TransactionReceipt> {
        self.access
            .transact(
                "placeBet",
                self.address,
                IBettingEscrow::placeBetCall {
                    marketId: market_id.as_u256(),
                    amount,
                },
            )
            .await
    }

    pub async fn market_escrow(&self, market_id: MarketId) -> Result<U256> {
        read(
            self.access.reader,
            "marketEscrow",
            self.address,
            IBettingEscrow::marketEscrowCall {
                marketId: market_id.as_u256(),
            },
        )
        .await
    }

    pub async fn contains_participant(&self, market_id: MarketId, participant: Address) -> Result<bool> {
        read(
            self.access.reader,
            "containsParticipant",
            self.address,
            IBettingEscrow::containsParticipantCall {
                marketId: market_id.as_u256(),
                participant,
            },
        )
        .await
    }

    pub async fn volume(&self) -> Result<U256> {
        read(self.access.reader, "volume", self.address, IBettingEscrow::volumeCall {}).await
    }

    pub async fn active_bet_count(&self) -> Result<U256> {
        read(
            self.access.reader,
            "activeBetCount",
            self.address,
            IBettingEscrow::activeBetCountCall {},
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_caps_at_1000_gwei() {
        let policy = GasPolicy::default();
        assert_eq!(policy.max_gas_price, Some(1000 * GWEI));
        assert!(policy.check_price(1000 * GWEI).is_ok());
        assert_eq!(
            policy.check_price(1001 * GWEI),
            Err(Web3Error::GasPriceTooHigh {
                current_gwei: 1001,
                max_gwei: 1000
            })
        );
    }

    #[test]
    fn zero_gwei_disables_cap() {
        let policy = GasPolicy::from_gwei(0, 20);
        assert_eq!(policy.max_gas_price, None);
        assert!(policy.check_price(u128::MAX).is_ok());
    }

    #[test]
    fn gas_limit_gets_buffer() {
        let policy = GasPolicy::default();
        assert_eq!(policy.buffered_limit(100_000), 120_000);
        assert_eq!(GasPolicy::from_gwei(1, 0).buffered_limit(21_000), 21_000);
    }

    #[test]
    fn buffered_limit_saturates() {
        assert_eq!(GasPolicy::default().buffered_limit(u64::MAX), u64::MAX);
    }

    #[test]
    fn escrow_selectors_match_abi() {
        // keccak256("placeBet(uint256,uint256)")[..4] and friends.
        assert_eq!(IBettingEscrow::placeBetCall::SIGNATURE, "placeBet(uint256,uint256)");
        assert_eq!(IBettingEscrow::usdtTokenCall::SIGNATURE, "usdtToken()");
        assert_eq!(IWagerToken::approveCall::SIGNATURE, "approve(address,uint256)");
        assert_eq!(IWagerToken::approveCall::SELECTOR, [0x09, 0x5e, 0xa7, 0xb3]);
        assert_eq!(IWagerToken::balanceOfCall::SELECTOR, [0x70, 0xa0, 0x82, 0x31]);
    }
}
