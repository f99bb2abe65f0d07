//! Wallet configuration for signing transactions.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

/// `[wallet]` section.
///
/// The private key is loaded from `WALLET_PRIVATE_KEY` at runtime, never
/// from the config file.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Receipt polling interval.
    pub poll_interval_ms: u64,
    #[serde(skip)]
    pub private_key: Option<String>,
}

impl WalletConfig {
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            private_key: None,
        }
    }
}

impl fmt::Debug for WalletConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletConfig")
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
