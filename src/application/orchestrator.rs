//! Wager placement state machine.
//!
//! Each wager walks the same steps: require a ready session, sanitize and
//! scale the input, check balance and allowance, approve once if needed,
//! submit, and wait for the receipt. Validation failures propagate as-is;
//! wallet and node failures leave here as [`Web3Error`]s.
//!
//! Approvals are never rolled back. A wager that fails after its approval
//! was mined can be retried without approving again.

use std::sync::Arc;

use alloy_primitives::{TxHash, U256};
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use super::contracts::GasPolicy;
use super::session::{ActiveSession, WalletSession};
use crate::domain::{
    format_units, sanitize_amount, sanitize_market_id, scale_amount, ApprovalOutcome, MarketInfo,
    TokenAmount, WagerRequest, WagerResult,
};
use crate::error::{Result, ValidationError, Web3Error};

/// Result of a balance and allowance check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FundsCheck {
    Sufficient,
    RequiresApproval { allowance: U256 },
}

/// Tunables for the orchestrator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrchestratorConfig {
    pub gas: GasPolicy,
    /// Mint test tokens to cover a shortfall. Only honoured on networks
    /// marked as sandboxes.
    pub sandbox_mint: bool,
}

/// Composes the wallet session and contract bindings into wager operations.
pub struct BettingOrchestrator {
    session: Arc<WalletSession>,
    config: OrchestratorConfig,
    /// Serializes state-changing calls so concurrent wagers cannot race on
    /// a stale allowance and approve twice.
    submit_lock: Mutex<()>,
}

impl BettingOrchestrator {
    pub fn new(session: Arc<WalletSession>, config: OrchestratorConfig) -> Self {
        Self {
            session,
            config,
            submit_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn session(&self) -> &Arc<WalletSession> {
        &self.session
    }

    /// Guard shared by every operation: the session must be `Ready`.
    fn require_ready(&self) -> Result<Arc<ActiveSession>> {
        self.session
            .active()
            .ok_or_else(|| ValidationError::NotInitialised.into())
    }

    /// Re-check before every write that `active` is still the session's
    /// binding. A disconnect or reconnect since the snapshot was taken
    /// invalidates its signer.
    fn ensure_current(&self, active: &Arc<ActiveSession>) -> Result<()> {
        match self.session.active() {
            Some(current) if Arc::ptr_eq(&current, active) => Ok(()),
            _ => {
                warn!("Session changed mid-operation, refusing to sign");
                Err(ValidationError::NotInitialised.into())
            }
        }
    }

    /// Place a wager and wait for it to be mined.
    ///
    /// # Errors
    ///
    /// - [`ValidationError`] for a disconnected session, malformed input, a
    ///   zero or oversized amount, or an insufficient balance
    /// - [`Web3Error::ApprovalIneffective`] if the allowance is still short
    ///   after one approval
    /// - [`Web3Error::UserRejected`], [`Web3Error::TransactionReverted`] or
    ///   [`Web3Error::TransactionFailed`] from approval or submission
    #[instrument(skip(self, request), fields(market = %request.market_id, amount = %request.amount))]
    pub async fn place_wager(&self, request: &WagerRequest) -> Result<WagerResult> {
        let _guard = self.submit_lock.lock().await;
        let active = self.require_ready()?;

        let amount = sanitize_amount(&request.amount)?;
        let market_id = sanitize_market_id(&request.market_id)?;
        let decimals = active.contracts().decimals();
        let scaled = scale_amount(&amount, decimals)?;

        let approval_hash = self.ensure_funds(&active, scaled).await?;

        self.ensure_current(&active)?;
        let receipt = active
            .escrow(&self.config.gas)
            .place_bet(market_id, scaled)
            .await
            .inspect_err(|e| {
                if let Some(hash) = approval_hash {
                    warn!(
                        error = %e,
                        approval = %hash,
                        "Wager failed after approval was mined; allowance remains in place"
                    );
                }
            })?;

        info!(
            tx_hash = %receipt.transaction_hash,
            gas_used = receipt.gas_used,
            explorer = %active.network().transaction_url(&receipt.transaction_hash),
            "Wager placed"
        );

        Ok(WagerResult {
            transaction_hash: receipt.transaction_hash,
            market_id,
            amount: TokenAmount::new(scaled, decimals),
            gas_used: receipt.gas_used,
            block_number: receipt.block_number,
            approval_hash,
        })
    }

    /// Check funds, approving exactly `amount` once if the allowance is short.
    ///
    /// Returns the approval hash when one was mined.
    async fn ensure_funds(
        &self,
        active: &Arc<ActiveSession>,
        amount: U256,
    ) -> Result<Option<TxHash>> {
        let allowance = match self.check_funds(active, amount).await? {
            FundsCheck::Sufficient => return Ok(None),
            FundsCheck::RequiresApproval { allowance } => allowance,
        };

        let decimals = active.contracts().decimals();
        info!(
            allowance = %format_units(allowance, decimals),
            required = %format_units(amount, decimals),
            "Allowance too low, approving escrow"
        );
        self.ensure_current(active)?;
        let receipt = active
            .token(&self.config.gas)
            .approve(active.contracts().escrow_address(), amount)
            .await?;

        match self.check_funds(active, amount).await? {
            FundsCheck::Sufficient => Ok(Some(receipt.transaction_hash)),
            FundsCheck::RequiresApproval { allowance } => {
                warn!(
                    approval = %receipt.transaction_hash,
                    allowance = %format_units(allowance, decimals),
                    "Allowance unchanged after approval"
                );
                Err(Web3Error::ApprovalIneffective.into())
            }
        }
    }

    async fn check_funds(&self, active: &Arc<ActiveSession>, amount: U256) -> Result<FundsCheck> {
        let owner = active.account();
        let token = active.token(&self.config.gas);
        let decimals = active.contracts().decimals();

        let balance = token.balance_of(owner).await?;
        if balance < amount {
            if self.config.sandbox_mint && active.network().sandbox {
                warn!(
                    network = %active.network().name,
                    balance = %format_units(balance, decimals),
                    minting = %format_units(amount, decimals),
                    "Balance short on sandbox network, minting test tokens"
                );
                self.ensure_current(active)?;
                token.mint(owner, amount).await?;
            } else {
                return Err(ValidationError::InsufficientBalance {
                    required: format_units(amount, decimals),
                    available: format_units(balance, decimals),
                }
                .into());
            }
        }

        let allowance = token
            .allowance(owner, active.contracts().escrow_address())
            .await?;
        if allowance < amount {
            return Ok(FundsCheck::RequiresApproval { allowance });
        }
        Ok(FundsCheck::Sufficient)
    }

    /// Approve the escrow to spend `amount`, unless it already can.
    ///
    /// # Errors
    ///
    /// Validation errors for bad input or a disconnected session;
    /// [`Web3Error`]s from the approval transaction.
    #[instrument(skip(self))]
    pub async fn approve(&self, amount: &str) -> Result<ApprovalOutcome> {
        let _guard = self.submit_lock.lock().await;
        let active = self.require_ready()?;

        let amount = sanitize_amount(amount)?;
        let decimals = active.contracts().decimals();
        let scaled = scale_amount(&amount, decimals)?;

        let token = active.token(&self.config.gas);
        let escrow = active.contracts().escrow_address();
        let current = token.allowance(active.account(), escrow).await?;
        if current >= scaled {
            return Ok(ApprovalOutcome::AlreadyApproved {
                current_allowance: TokenAmount::new(current, decimals),
            });
        }

        self.ensure_current(&active)?;
        let receipt = token.approve(escrow, scaled).await?;
        info!(tx_hash = %receipt.transaction_hash, amount = %amount, "Approval confirmed");

        Ok(ApprovalOutcome::Approved {
            tx_hash: receipt.transaction_hash,
            amount: TokenAmount::new(scaled, decimals),
        })
    }

    /// Token balance of the connected account.
    pub async fn balance(&self) -> Result<TokenAmount> {
        let active = self.require_ready()?;
        let raw = active
            .token(&self.config.gas)
            .balance_of(active.account())
            .await?;
        Ok(TokenAmount::new(raw, active.contracts().decimals()))
    }

    /// Allowance the connected account has granted the escrow.
    pub async fn allowance(&self) -> Result<TokenAmount> {
        let active = self.require_ready()?;
        let raw = active
            .token(&self.config.gas)
            .allowance(active.account(), active.contracts().escrow_address())
            .await?;
        Ok(TokenAmount::new(raw, active.contracts().decimals()))
    }

    /// Escrowed total for a market and whether the connected account is in it.
    pub async fn market_info(&self, market_id: &str) -> Result<MarketInfo> {
        let active = self.require_ready()?;
        let market_id = sanitize_market_id(market_id)?;
        let escrow = active.escrow(&self.config.gas);

        let (total, participated) = tokio::try_join!(
            escrow.market_escrow(market_id),
            escrow.contains_participant(market_id, active.account()),
        )?;

        Ok(MarketInfo {
            market_id,
            total_escrow: TokenAmount::new(total, active.contracts().decimals()),
            participated,
        })
    }

    /// Total amount ever wagered through the escrow.
    pub async fn volume(&self) -> Result<TokenAmount> {
        let active = self.require_ready()?;
        let raw = active.escrow(&self.config.gas).volume().await?;
        Ok(TokenAmount::new(raw, active.contracts().decimals()))
    }

    pub async fn active_bet_count(&self) -> Result<U256> {
        let active = self.require_ready()?;
        active.escrow(&self.config.gas).active_bet_count().await
    }
}
