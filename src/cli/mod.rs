//! Command-line interface definitions.
//!
//! Defines the `betline` CLI using `clap`. Every subcommand loads the config
//! file, optionally retargets another chain, and talks to the chain through
//! the RPC wallet.

pub mod context;
pub mod output;

#[cfg(feature = "rpc")]
pub mod approve;
#[cfg(feature = "rpc")]
pub mod balance;
#[cfg(feature = "rpc")]
pub mod connect;
#[cfg(feature = "rpc")]
pub mod market;
pub mod networks;
#[cfg(feature = "rpc")]
pub mod stats;
#[cfg(feature = "rpc")]
pub mod wager;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::BetSide;

/// Wallet and escrow client for on-chain wagers.
#[derive(Parser, Debug)]
#[command(name = "betline")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List configured networks
    Networks(ConfigArgs),

    /// Connect the wallet and validate the contracts
    Connect(ConfigArgs),

    /// Show token balance and escrow allowance
    Balance(ConfigArgs),

    /// Approve the escrow to spend tokens
    Approve(ApproveArgs),

    /// Place a wager on a market
    Wager(WagerArgs),

    /// Show a market's escrowed total
    Market(MarketArgs),

    /// Show escrow-wide statistics
    Stats(ConfigArgs),
}

/// Arguments shared by every subcommand.
#[derive(Parser, Debug, Clone)]
pub struct ConfigArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = context::DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Override the target chain ID
    #[arg(long)]
    pub chain_id: Option<u64>,
}

/// Arguments for the `approve` subcommand.
#[derive(Parser, Debug)]
pub struct ApproveArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Amount to approve, in whole tokens (e.g. 25.5)
    pub amount: String,

    /// Skip confirmation prompt
    #[arg(long)]
    pub yes: bool,
}

/// Arguments for the `wager` subcommand.
#[derive(Parser, Debug)]
pub struct WagerArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Market identifier
    pub market_id: String,

    /// Amount to wager, in whole tokens (e.g. 25.5)
    pub amount: String,

    /// Side recorded with the bet
    #[arg(long, default_value_t = BetSide::Back)]
    pub side: BetSide,

    /// Skip confirmation prompt
    #[arg(long)]
    pub yes: bool,
}

/// Arguments for the `market` subcommand.
#[derive(Parser, Debug)]
pub struct MarketArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Market identifier
    pub market_id: String,
}
