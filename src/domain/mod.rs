//! Chain-agnostic domain logic: networks, amounts, wagers.

mod amount;
mod network;
mod sanitize;
mod wager;

pub use amount::{format_units, parse_units, scale_amount, TokenAmount};
pub use network::{ChainId, NetworkConfig, NetworkRegistry};
pub use sanitize::{parse_address, sanitize_address, sanitize_amount, sanitize_market_id};
pub use wager::{
    ApprovalOutcome, BetRecord, BetSide, MarketId, MarketInfo, WagerRequest, WagerResult,
};
