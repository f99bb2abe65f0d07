//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`chain`]: [`SimulatedChain`](chain::SimulatedChain), an in-memory
//!   wallet and node with injectable faults and call counters.
//! - [`network`]: canonical network entries (a sandbox and a mainnet-like one).
//! - [`session`]: builders wiring a simulated chain into sessions and
//!   orchestrators.

pub mod chain;
pub mod network;
pub mod session;
