//! Wager requests, results, and the read models around them.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{Address, TxHash, U256};
use serde::{Deserialize, Serialize};

use super::amount::TokenAmount;

/// Escrow market identifier (`uint256` on chain).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarketId(U256);

impl MarketId {
    #[must_use]
    pub const fn new(id: U256) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn as_u256(&self) -> U256 {
        self.0
    }
}

impl fmt::Display for MarketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for MarketId {
    fn from(id: u64) -> Self {
        Self(U256::from(id))
    }
}

/// A wager as supplied by the caller, before any validation.
///
/// Both fields are raw user input; the orchestrator sanitizes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WagerRequest {
    pub market_id: String,
    pub amount: String,
}

impl WagerRequest {
    pub fn new(market_id: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            market_id: market_id.into(),
            amount: amount.into(),
        }
    }
}

/// A successfully mined wager.
///
/// Settlement is not tracked here; that belongs to the bookkeeping backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WagerResult {
    pub transaction_hash: TxHash,
    pub market_id: MarketId,
    pub amount: TokenAmount,
    pub gas_used: u64,
    pub block_number: Option<u64>,
    /// Approval issued on the way, if the allowance had to be raised.
    pub approval_hash: Option<TxHash>,
}

/// Outcome of an explicit approval request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalOutcome {
    /// An approval transaction was mined.
    Approved { tx_hash: TxHash, amount: TokenAmount },

    /// The existing allowance already covered the amount.
    AlreadyApproved { current_allowance: TokenAmount },
}

/// Which side of the market a wager backs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetSide {
    #[default]
    Back,
    Lay,
}

impl fmt::Display for BetSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Back => write!(f, "back"),
            Self::Lay => write!(f, "lay"),
        }
    }
}

impl FromStr for BetSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "back" => Ok(Self::Back),
            "lay" => Ok(Self::Lay),
            other => Err(format!("unknown side '{other}', expected back or lay")),
        }
    }
}

/// Payload the caller hands to the off-chain bookkeeping service once a
/// wager is mined. This crate only builds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BetRecord {
    pub market_id: String,
    pub amount: String,
    pub side: BetSide,
    pub wallet_address: Address,
    pub transaction_hash: TxHash,
}

impl BetRecord {
    #[must_use]
    pub fn new(result: &WagerResult, side: BetSide, wallet_address: Address) -> Self {
        Self {
            market_id: result.market_id.to_string(),
            amount: result.amount.to_string(),
            side,
            wallet_address,
            transaction_hash: result.transaction_hash,
        }
    }
}

/// Escrow state for one market as seen by the connected account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketInfo {
    pub market_id: MarketId,
    pub total_escrow: TokenAmount,
    pub participated: bool,
}
