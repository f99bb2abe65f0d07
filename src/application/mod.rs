//! Application services (use cases).
//!
//! These services drive the ports to implement wallet connection, contract
//! validation, and wager placement.

pub mod contracts;
pub mod orchestrator;
pub mod session;

pub use contracts::{ChainAccess, ContractBinding, EscrowContract, GasPolicy, TokenContract};
pub use orchestrator::{BettingOrchestrator, OrchestratorConfig};
pub use session::{ActiveSession, SessionState, Signer, WalletSession};
