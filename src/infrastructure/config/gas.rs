//! Gas limits applied to every transaction.

use serde::Deserialize;

use crate::application::GasPolicy;

/// `[gas]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GasConfig {
    /// Refuse to send above this price. `0` disables the cap.
    pub max_gas_price_gwei: u64,
    /// Headroom added on top of the node's gas estimate.
    pub limit_buffer_percent: u64,
}

impl GasConfig {
    #[must_use]
    pub fn policy(&self) -> GasPolicy {
        GasPolicy::from_gwei(self.max_gas_price_gwei, self.limit_buffer_percent)
    }
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            max_gas_price_gwei: 1000,
            limit_buffer_percent: 20,
        }
    }
}
