//! Implementations of ports (hexagonal adapters).

pub mod rpc;

pub use rpc::RpcWallet;
