//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports are the process boundary: everything behind them is a wallet or a
//! chain node that can fail independently of this crate.
//!
//! # Available Ports
//!
//! - [`WalletProvider`] - Account discovery, chain switching, signing
//! - [`ChainReader`] - Bytecode and read-only contract calls

mod wallet;

pub use wallet::{
    ChainReader, TransactionReceipt, TransactionRequest, WalletError, WalletProvider,
    WalletResult, EXECUTION_REVERTED_CODE, UNRECOGNIZED_CHAIN_CODE, USER_REJECTED_CODE,
};
