//! In-memory chain that plays both the wallet and the node.
//!
//! [`SimulatedChain`] implements [`WalletProvider`] and [`ChainReader`] over
//! one shared state: an ERC20-style token, the betting escrow, and a single
//! wallet account. Contract calls are dispatched on their 4-byte selector
//! and decoded with the same `sol!` bindings the application uses, so a
//! test exercises the real ABI encoding end to end.
//!
//! Faults are injected per selector (user rejection, revert at estimation,
//! revert on chain) or per concern (chain switching, account access,
//! approvals that do not stick). Every sent transaction is counted.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use alloy_primitives::{address, keccak256, Address, Bytes, TxHash, U256};
use alloy_sol_types::{SolCall, SolValue};
use async_trait::async_trait;
use parking_lot::Mutex;

use crate::application::contracts::{IBettingEscrow, IWagerToken};
use crate::domain::{ChainId, NetworkConfig};
use crate::port::{
    ChainReader, TransactionReceipt, TransactionRequest, WalletError, WalletProvider,
    WalletResult, UNRECOGNIZED_CHAIN_CODE,
};

/// Default account, the first well-known development key.
pub const ACCOUNT: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

/// Token precision used unless overridden.
pub const DECIMALS: u8 = 6;

const GAS_ESTIMATE: u64 = 50_000;
const GAS_USED: u64 = 46_000;
const GWEI: u128 = 1_000_000_000;

/// One whole token at [`DECIMALS`] precision, times `n`.
#[must_use]
pub fn units(n: u64) -> U256 {
    U256::from(n) * U256::from(10u64).pow(U256::from(DECIMALS))
}

/// How the wallet answers a chain switch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchBehaviour {
    /// Move to the requested chain.
    Comply,
    /// Answer with EIP-1193 4902.
    Refuse,
    /// Report success but stay where it is.
    Ignore,
}

#[derive(Debug, Default)]
struct Market {
    total: U256,
    participants: HashSet<Address>,
}

#[derive(Debug)]
struct State {
    accounts: Vec<Address>,
    accounts_error: Option<WalletError>,
    chain_id: u64,
    switch: SwitchBehaviour,
    code: HashMap<Address, Bytes>,
    escrow: Address,
    token: Address,
    escrow_token: Address,
    decimals: u8,
    balances: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
    markets: HashMap<U256, Market>,
    volume: U256,
    active_bets: U256,
    gas_price: u128,
    read_failure: Option<String>,
    rejected: HashSet<[u8; 4]>,
    reverted: HashMap<[u8; 4], String>,
    failing_on_chain: HashSet<[u8; 4]>,
    ineffective_approvals: bool,
    receipts: HashMap<TxHash, TransactionReceipt>,
    sent: HashMap<[u8; 4], u32>,
    account_requests: u32,
    reads: u32,
    nonce: u64,
    block: u64,
}

impl State {
    /// Count a node read, failing it if reads are broken.
    fn begin_read(&mut self) -> WalletResult<()> {
        self.reads += 1;
        match &self.read_failure {
            Some(message) => Err(WalletError::Transport(message.clone())),
            None => Ok(()),
        }
    }

    fn balance(&self, account: Address) -> U256 {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default()
    }

    /// Answer a read-only call.
    fn read(&self, to: Address, data: &[u8]) -> WalletResult<Bytes> {
        if !self.code.contains_key(&to) {
            return Ok(Bytes::new());
        }
        let (selector, args) = split(data)?;

        let output = if to == self.escrow {
            match selector {
                s if s == IBettingEscrow::usdtTokenCall::SELECTOR => {
                    SolValue::abi_encode(&self.escrow_token)
                }
                s if s == IBettingEscrow::marketEscrowCall::SELECTOR => {
                    let call = decode::<IBettingEscrow::marketEscrowCall>(args)?;
                    let total = self
                        .markets
                        .get(&call.marketId)
                        .map(|m| m.total)
                        .unwrap_or_default();
                    SolValue::abi_encode(&total)
                }
                s if s == IBettingEscrow::containsParticipantCall::SELECTOR => {
                    let call = decode::<IBettingEscrow::containsParticipantCall>(args)?;
                    let found = self
                        .markets
                        .get(&call.marketId)
                        .is_some_and(|m| m.participants.contains(&call.participant));
                    SolValue::abi_encode(&found)
                }
                s if s == IBettingEscrow::volumeCall::SELECTOR => SolValue::abi_encode(&self.volume),
                s if s == IBettingEscrow::activeBetCountCall::SELECTOR => {
                    SolValue::abi_encode(&self.active_bets)
                }
                _ => return Err(WalletError::Reverted { reason: None }),
            }
        } else if to == self.token {
            match selector {
                s if s == IWagerToken::decimalsCall::SELECTOR => {
                    SolValue::abi_encode(&U256::from(self.decimals))
                }
                s if s == IWagerToken::balanceOfCall::SELECTOR => {
                    let call = decode::<IWagerToken::balanceOfCall>(args)?;
                    SolValue::abi_encode(&self.balance(call.account))
                }
                s if s == IWagerToken::allowanceCall::SELECTOR => {
                    let call = decode::<IWagerToken::allowanceCall>(args)?;
                    SolValue::abi_encode(&self.allowance(call.owner, call.spender))
                }
                _ => return Err(WalletError::Reverted { reason: None }),
            }
        } else {
            return Err(WalletError::Reverted { reason: None });
        };

        Ok(output.into())
    }

    /// Apply a state-changing call, or return the revert reason.
    fn execute(&mut self, from: Address, to: Address, data: &[u8], commit: bool) -> Result<(), String> {
        let (selector, args) = split(data).map_err(|e| e.to_string())?;

        if to == self.token && selector == IWagerToken::approveCall::SELECTOR {
            let call = decode::<IWagerToken::approveCall>(args).map_err(|e| e.to_string())?;
            if commit && !self.ineffective_approvals {
                self.allowances.insert((from, call.spender), call.amount);
            }
            return Ok(());
        }

        if to == self.token && selector == IWagerToken::mintCall::SELECTOR {
            let call = decode::<IWagerToken::mintCall>(args).map_err(|e| e.to_string())?;
            if commit {
                let balance = self.balance(call.to).saturating_add(call.amount);
                self.balances.insert(call.to, balance);
            }
            return Ok(());
        }

        if to == self.escrow && selector == IBettingEscrow::placeBetCall::SELECTOR {
            let call = decode::<IBettingEscrow::placeBetCall>(args).map_err(|e| e.to_string())?;
            let balance = self.balance(from);
            let allowance = self.allowance(from, self.escrow);
            if balance < call.amount {
                return Err("ERC20: transfer amount exceeds balance".into());
            }
            if allowance < call.amount {
                return Err("ERC20: insufficient allowance".into());
            }
            if commit {
                self.balances.insert(from, balance - call.amount);
                self.allowances.insert((from, self.escrow), allowance - call.amount);
                let market = self.markets.entry(call.marketId).or_default();
                market.total += call.amount;
                market.participants.insert(from);
                self.volume += call.amount;
                self.active_bets += U256::from(1u8);
            }
            return Ok(());
        }

        Err("function selector was not recognized".into())
    }
}

fn split(data: &[u8]) -> WalletResult<([u8; 4], &[u8])> {
    match data {
        [a, b, c, d, rest @ ..] => Ok(([*a, *b, *c, *d], rest)),
        _ => Err(WalletError::Reverted { reason: None }),
    }
}

fn decode<C: SolCall>(args: &[u8]) -> WalletResult<C> {
    C::abi_decode_raw(args).map_err(|e| WalletError::Rpc {
        code: -32602,
        message: format!("invalid params: {e}"),
    })
}

/// Callback run when a transaction with a given selector is sent.
pub type SendHook = Arc<dyn Fn() + Send + Sync>;

/// A scripted wallet plus node for one network's escrow and token.
pub struct SimulatedChain {
    state: Mutex<State>,
    send_hooks: Mutex<HashMap<[u8; 4], SendHook>>,
}

impl fmt::Debug for SimulatedChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulatedChain")
            .field("state", &*self.state.lock())
            .field("send_hooks", &self.send_hooks.lock().len())
            .finish()
    }
}

impl SimulatedChain {
    /// A chain with both contracts deployed, the wallet already on
    /// `network`, and [`ACCOUNT`] holding no tokens.
    #[must_use]
    pub fn new(network: &NetworkConfig) -> Self {
        let code = Bytes::from_static(&[0x60, 0x80, 0x60, 0x40, 0x52]);
        let state = State {
            accounts: vec![ACCOUNT],
            accounts_error: None,
            chain_id: network.chain_id.get(),
            switch: SwitchBehaviour::Comply,
            code: HashMap::from([
                (network.escrow_address, code.clone()),
                (network.token_address, code),
            ]),
            escrow: network.escrow_address,
            token: network.token_address,
            escrow_token: network.token_address,
            decimals: DECIMALS,
            balances: HashMap::new(),
            allowances: HashMap::new(),
            markets: HashMap::new(),
            volume: U256::ZERO,
            active_bets: U256::ZERO,
            gas_price: GWEI,
            read_failure: None,
            rejected: HashSet::new(),
            reverted: HashMap::new(),
            failing_on_chain: HashSet::new(),
            ineffective_approvals: false,
            receipts: HashMap::new(),
            sent: HashMap::new(),
            account_requests: 0,
            reads: 0,
            nonce: 0,
            block: 1,
        };
        Self {
            state: Mutex::new(state),
            send_hooks: Mutex::new(HashMap::new()),
        }
    }

    // ---- Setup ----

    /// Credit `amount` raw token units to `account`.
    pub fn fund(&self, account: Address, amount: U256) {
        let mut state = self.state.lock();
        let balance = state.balance(account).saturating_add(amount);
        state.balances.insert(account, balance);
    }

    pub fn set_allowance(&self, owner: Address, spender: Address, amount: U256) {
        self.state.lock().allowances.insert((owner, spender), amount);
    }

    pub fn set_accounts(&self, accounts: Vec<Address>) {
        self.state.lock().accounts = accounts;
    }

    /// Put the wallet on another chain.
    pub fn set_chain_id(&self, chain_id: ChainId) {
        self.state.lock().chain_id = chain_id.get();
    }

    pub fn set_switch_behaviour(&self, behaviour: SwitchBehaviour) {
        self.state.lock().switch = behaviour;
    }

    pub fn set_gas_price(&self, wei: u128) {
        self.state.lock().gas_price = wei;
    }

    pub fn set_decimals(&self, decimals: u8) {
        self.state.lock().decimals = decimals;
    }

    /// Make the escrow report a different token.
    pub fn set_escrow_token(&self, token: Address) {
        self.state.lock().escrow_token = token;
    }

    /// Remove the bytecode at `address`.
    pub fn remove_code(&self, address: Address) {
        self.state.lock().code.remove(&address);
    }

    // ---- Faults ----

    /// Make the wallet decline account access.
    pub fn reject_accounts(&self) {
        self.state.lock().accounts_error = Some(WalletError::UserRejected);
    }

    /// Fail every read with a transport error.
    pub fn fail_reads(&self, message: impl Into<String>) {
        self.state.lock().read_failure = Some(message.into());
    }

    /// The user declines to sign calls with this selector.
    pub fn reject_method(&self, selector: [u8; 4]) {
        self.state.lock().rejected.insert(selector);
    }

    /// Calls with this selector revert during gas estimation.
    pub fn revert_method(&self, selector: [u8; 4], reason: impl Into<String>) {
        self.state.lock().reverted.insert(selector, reason.into());
    }

    /// Calls with this selector are mined with a failed status.
    pub fn fail_on_chain(&self, selector: [u8; 4]) {
        self.state.lock().failing_on_chain.insert(selector);
    }

    /// Run `hook` each time a transaction with `selector` is sent, after
    /// it has been mined.
    pub fn on_send(&self, selector: [u8; 4], hook: impl Fn() + Send + Sync + 'static) {
        self.send_hooks.lock().insert(selector, Arc::new(hook));
    }

    /// Approvals are mined but leave the allowance unchanged.
    pub fn make_approvals_ineffective(&self) {
        self.state.lock().ineffective_approvals = true;
    }

    /// Drop every injected fault; balances and allowances are kept.
    pub fn clear_faults(&self) {
        let mut state = self.state.lock();
        state.accounts_error = None;
        state.read_failure = None;
        state.rejected.clear();
        state.reverted.clear();
        state.failing_on_chain.clear();
        state.ineffective_approvals = false;
        state.switch = SwitchBehaviour::Comply;
        drop(state);
        self.send_hooks.lock().clear();
    }

    // ---- Inspection ----

    #[must_use]
    pub fn balance(&self, account: Address) -> U256 {
        self.state.lock().balance(account)
    }

    #[must_use]
    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.state.lock().allowance(owner, spender)
    }

    #[must_use]
    pub fn market_total(&self, market_id: U256) -> U256 {
        self.state
            .lock()
            .markets
            .get(&market_id)
            .map(|m| m.total)
            .unwrap_or_default()
    }

    /// Chain the wallet is on right now.
    #[must_use]
    pub fn current_chain(&self) -> u64 {
        self.state.lock().chain_id
    }

    #[must_use]
    pub fn account_requests(&self) -> u32 {
        self.state.lock().account_requests
    }

    /// Node reads of any kind, including gas estimation.
    #[must_use]
    pub fn reads(&self) -> u32 {
        self.state.lock().reads
    }

    /// Transactions sent with `selector`, mined or not.
    #[must_use]
    pub fn sent(&self, selector: [u8; 4]) -> u32 {
        self.state.lock().sent.get(&selector).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total_sent(&self) -> u32 {
        self.state.lock().sent.values().sum()
    }

    #[must_use]
    pub fn approvals(&self) -> u32 {
        self.sent(IWagerToken::approveCall::SELECTOR)
    }

    #[must_use]
    pub fn mints(&self) -> u32 {
        self.sent(IWagerToken::mintCall::SELECTOR)
    }

    #[must_use]
    pub fn wagers(&self) -> u32 {
        self.sent(IBettingEscrow::placeBetCall::SELECTOR)
    }
}

#[async_trait]
impl WalletProvider for SimulatedChain {
    async fn request_accounts(&self) -> WalletResult<Vec<Address>> {
        let mut state = self.state.lock();
        state.account_requests += 1;
        match &state.accounts_error {
            Some(err) => Err(err.clone()),
            None => Ok(state.accounts.clone()),
        }
    }

    async fn chain_id(&self) -> WalletResult<u64> {
        Ok(self.state.lock().chain_id)
    }

    async fn switch_chain(&self, hex_chain_id: &str) -> WalletResult<()> {
        let mut state = self.state.lock();
        match state.switch {
            SwitchBehaviour::Comply => {
                let target = ChainId::from_hex(hex_chain_id).ok_or_else(|| WalletError::Rpc {
                    code: -32602,
                    message: format!("invalid chain id {hex_chain_id}"),
                })?;
                state.chain_id = target.get();
                Ok(())
            }
            SwitchBehaviour::Refuse => Err(WalletError::Rpc {
                code: UNRECOGNIZED_CHAIN_CODE,
                message: format!("Unrecognized chain ID \"{hex_chain_id}\""),
            }),
            SwitchBehaviour::Ignore => Ok(()),
        }
    }

    async fn send_transaction(&self, from: Address, tx: &TransactionRequest) -> WalletResult<TxHash> {
        let mut state = self.state.lock();
        let (selector, _) = split(&tx.data)?;

        if state.rejected.contains(&selector) {
            return Err(WalletError::UserRejected);
        }
        if !state.accounts.contains(&from) {
            return Err(WalletError::Rpc {
                code: 4100,
                message: format!("account {from} is not authorized"),
            });
        }

        *state.sent.entry(selector).or_insert(0) += 1;
        state.nonce += 1;
        state.block += 1;
        let hash = keccak256(state.nonce.to_be_bytes());

        let status = !state.failing_on_chain.contains(&selector)
            && state.execute(from, tx.to, &tx.data, true).is_ok();

        let receipt = TransactionReceipt {
            transaction_hash: hash,
            status,
            gas_used: GAS_USED,
            block_number: Some(state.block),
        };
        state.receipts.insert(hash, receipt);
        drop(state);

        let hook = self.send_hooks.lock().get(&selector).cloned();
        if let Some(hook) = hook {
            hook();
        }
        Ok(hash)
    }

    async fn wait_for_receipt(&self, hash: TxHash) -> WalletResult<TransactionReceipt> {
        self.state
            .lock()
            .receipts
            .get(&hash)
            .cloned()
            .ok_or_else(|| WalletError::Rpc {
                code: -32000,
                message: format!("transaction {hash} not found"),
            })
    }
}

#[async_trait]
impl ChainReader for SimulatedChain {
    async fn get_code(&self, address: Address) -> WalletResult<Bytes> {
        let mut state = self.state.lock();
        state.begin_read()?;
        Ok(state.code.get(&address).cloned().unwrap_or_default())
    }

    async fn call(&self, to: Address, data: Bytes) -> WalletResult<Bytes> {
        let mut state = self.state.lock();
        state.begin_read()?;
        state.read(to, &data)
    }

    async fn gas_price(&self) -> WalletResult<u128> {
        let mut state = self.state.lock();
        state.begin_read()?;
        Ok(state.gas_price)
    }

    async fn estimate_gas(&self, from: Address, tx: &TransactionRequest) -> WalletResult<u64> {
        let mut state = self.state.lock();
        state.begin_read()?;
        let (selector, _) = split(&tx.data)?;
        if let Some(reason) = state.reverted.get(&selector) {
            return Err(WalletError::Reverted {
                reason: Some(reason.clone()),
            });
        }
        state
            .execute(from, tx.to, &tx.data, false)
            .map_err(|reason| WalletError::Reverted {
                reason: Some(reason),
            })?;
        Ok(GAS_ESTIMATE)
    }
}
