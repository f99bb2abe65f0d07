//! Betline - wallet and contract orchestration for on-chain wagers.
//!
//! Connects an external wallet, pins it to one supported network, validates
//! the escrow and token deployments, and places wagers through an
//! allowance-checked, approve-if-needed, submit-and-confirm workflow.
//!
//! # Architecture
//!
//! - **`domain`** - Pure types and checks: networks, amounts, wagers, input sanitizing
//! - **`port`** - Traits for the wallet and for chain reads
//! - **`application`** - Wallet session, contract bindings, wager orchestration
//! - **`adapter`** - JSON-RPC wallet over a local key (requires `rpc` feature)
//! - **`infrastructure`** - Configuration and logging
//! - **`cli`** - The `betline` command-line front end
//!
//! # Features
//!
//! - `rpc` (default) - alloy-backed wallet adapter and the network-facing CLI commands
//! - `testkit` - [`testkit`] helpers for integration tests
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use betline::application::{BettingOrchestrator, OrchestratorConfig, WalletSession};
//! use betline::domain::{NetworkConfig, WagerRequest};
//! use betline::port::{ChainReader, WalletProvider};
//!
//! async fn wager(
//!     wallet: Arc<dyn WalletProvider>,
//!     reader: Arc<dyn ChainReader>,
//! ) -> betline::error::Result<()> {
//!     let session = Arc::new(WalletSession::new(
//!         wallet,
//!         reader,
//!         Arc::new(NetworkConfig::sepolia()),
//!     ));
//!     session.connect().await?;
//!
//!     let orchestrator = BettingOrchestrator::new(session, OrchestratorConfig::default());
//!     let result = orchestrator.place_wager(&WagerRequest::new("7", "25.5")).await?;
//!     println!("mined in {}", result.transaction_hash);
//!     Ok(())
//! }
//! ```

#[cfg(feature = "rpc")]
pub mod adapter;
pub mod application;
pub mod cli;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
