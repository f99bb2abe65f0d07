use std::sync::Arc;

use betline::application::{SessionState, WalletSession};
use betline::domain::{ChainId, NetworkRegistry};
use betline::error::{ConfigError, Error, ErrorKind, Web3Error};
use betline::port::{ChainReader, WalletProvider};
use betline::testkit::chain::{SimulatedChain, SwitchBehaviour, ACCOUNT};
use betline::testkit::{network, session};

fn sandbox_session() -> (Arc<SimulatedChain>, Arc<WalletSession>) {
    let net = network::sandbox();
    let chain = session::chain(&net);
    let session = session::session(&chain, net);
    (chain, session)
}

/// Nothing of a half-built session may survive a failed connect.
fn assert_fully_cleared(session: &WalletSession) {
    assert_eq!(session.state(), SessionState::Disconnected);
    assert!(!session.is_connected());
    assert!(session.active().is_none());
    assert!(session.account().is_none());
    assert!(session.network().is_none());
}

// ---- Connect Tests ----

#[tokio::test]
async fn connect_returns_account_and_becomes_ready() {
    let (_chain, session) = sandbox_session();
    assert_eq!(session.state(), SessionState::Disconnected);

    let account = session.connect().await.unwrap();

    assert_eq!(account, ACCOUNT);
    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!(session.account(), Some(ACCOUNT));
    let network = session.network().unwrap();
    assert_eq!(network.chain_id, ChainId::SEPOLIA);
    let active = session.active().unwrap();
    assert_eq!(active.contracts().decimals(), 6);
    assert_eq!(active.contracts().token_address(), network.token_address);
}

#[tokio::test]
async fn connect_twice_runs_handshake_once() {
    let (chain, session) = sandbox_session();

    let first = session.connect().await.unwrap();
    let reads_after_first = chain.reads();
    let second = session.connect().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(chain.account_requests(), 1);
    assert_eq!(chain.reads(), reads_after_first);
}

#[tokio::test]
async fn concurrent_connects_share_one_handshake() {
    let (chain, session) = sandbox_session();

    let (a, b) = tokio::join!(session.connect(), session.connect());

    assert_eq!(a.unwrap(), b.unwrap());
    assert_eq!(chain.account_requests(), 1);
}

#[tokio::test]
async fn empty_account_list_is_no_accounts() {
    let (chain, session) = sandbox_session();
    chain.set_accounts(Vec::new());

    let err = session.connect().await.unwrap_err();

    assert!(matches!(err, Error::Web3(Web3Error::NoAccounts)));
    assert_fully_cleared(&session);
}

#[tokio::test]
async fn declined_account_access_is_user_rejection() {
    let (chain, session) = sandbox_session();
    chain.reject_accounts();

    let err = session.connect().await.unwrap_err();

    assert!(matches!(err, Error::Web3(Web3Error::UserRejected)));
    assert_eq!(err.kind(), ErrorKind::Web3);
    assert_fully_cleared(&session);
}

#[tokio::test]
async fn connect_succeeds_after_earlier_failure() {
    let (chain, session) = sandbox_session();
    chain.set_accounts(Vec::new());
    assert!(session.connect().await.is_err());

    chain.set_accounts(vec![ACCOUNT]);
    assert_eq!(session.connect().await.unwrap(), ACCOUNT);
    assert_eq!(chain.account_requests(), 2);
}

// ---- Network Validation Tests ----

#[tokio::test]
async fn wrong_chain_is_switched_to_target() {
    let (chain, session) = sandbox_session();
    chain.set_chain_id(ChainId::MAINNET);

    session.connect().await.unwrap();

    assert_eq!(chain.current_chain(), ChainId::SEPOLIA.get());
    assert_eq!(session.state(), SessionState::Ready);
}

#[tokio::test]
async fn refused_switch_fails_and_clears() {
    let (chain, session) = sandbox_session();
    chain.set_chain_id(ChainId::MAINNET);
    chain.set_switch_behaviour(SwitchBehaviour::Refuse);

    let err = session.connect().await.unwrap_err();

    match err {
        Error::Web3(Web3Error::NetworkSwitchFailed { target, reason }) => {
            assert_eq!(target, "Sepolia Testnet");
            assert!(reason.contains("4902"), "reason: {reason}");
        }
        other => panic!("expected NetworkSwitchFailed, got {other}"),
    }
    assert_fully_cleared(&session);
}

#[tokio::test]
async fn silently_ignored_switch_is_detected() {
    let (chain, session) = sandbox_session();
    chain.set_chain_id(ChainId::MAINNET);
    chain.set_switch_behaviour(SwitchBehaviour::Ignore);

    let err = session.connect().await.unwrap_err();

    assert!(matches!(
        err,
        Error::Web3(Web3Error::NetworkSwitchFailed { .. })
    ));
    assert_fully_cleared(&session);
}

// ---- Contract Validation Tests ----

#[tokio::test]
async fn missing_escrow_code_is_contract_not_found() {
    let net = network::sandbox();
    let chain = session::chain(&net);
    chain.remove_code(net.escrow_address);
    let session = session::session(&chain, net.clone());

    let err = session.connect().await.unwrap_err();

    match &err {
        Error::Web3(Web3Error::ContractNotFound { address }) => {
            assert_eq!(address, &net.escrow_address.to_string());
        }
        other => panic!("expected ContractNotFound, got {other}"),
    }
    assert!(!err.is_retryable());
    assert_fully_cleared(&session);
}

#[tokio::test]
async fn missing_token_code_is_contract_not_found() {
    let net = network::sandbox();
    let chain = session::chain(&net);
    chain.remove_code(net.token_address);
    let session = session::session(&chain, net);

    let err = session.connect().await.unwrap_err();

    assert!(matches!(
        err,
        Error::Web3(Web3Error::ContractNotFound { .. })
    ));
    assert_fully_cleared(&session);
}

#[tokio::test]
async fn escrow_holding_other_token_is_mismatch() {
    let net = network::sandbox();
    let chain = session::chain(&net);
    chain.set_escrow_token(alloy_primitives::Address::repeat_byte(0x42));
    let session = session::session(&chain, net);

    let err = session.connect().await.unwrap_err();

    assert!(matches!(
        err,
        Error::Web3(Web3Error::ContractMismatch { .. })
    ));
    assert_fully_cleared(&session);
}

#[tokio::test]
async fn unreachable_node_is_retryable_provider_error() {
    let (chain, session) = sandbox_session();
    chain.fail_reads("connection refused");

    let err = session.connect().await.unwrap_err();

    assert!(matches!(err, Error::Web3(Web3Error::Provider { .. })));
    assert!(err.is_retryable());
    assert_fully_cleared(&session);
}

#[tokio::test]
async fn token_decimals_are_cached_from_chain() {
    let (chain, session) = sandbox_session();
    chain.set_decimals(18);

    session.connect().await.unwrap();

    assert_eq!(session.active().unwrap().contracts().decimals(), 18);
}

// ---- Lifecycle Tests ----

#[tokio::test]
async fn disconnect_clears_and_reconnect_handshakes_again() {
    let (chain, session) = sandbox_session();
    session.connect().await.unwrap();

    session.disconnect();
    assert_fully_cleared(&session);

    session.connect().await.unwrap();
    assert_eq!(chain.account_requests(), 2);
}

#[test]
fn disconnect_on_fresh_session_is_harmless() {
    let (_chain, session) = sandbox_session();
    session.disconnect();
    assert_fully_cleared(&session);
}

#[test]
fn for_chain_rejects_unknown_chain() {
    let chain = session::chain(&network::sandbox());
    let wallet: Arc<dyn WalletProvider> = chain.clone();
    let reader: Arc<dyn ChainReader> = chain;

    let result = WalletSession::for_chain(
        wallet,
        reader,
        &NetworkRegistry::builtin(),
        ChainId::new(424_242),
    );

    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::UnknownChain { chain_id: 424_242 }))
    ));
}

#[test]
fn for_chain_targets_registry_entry() {
    let chain = session::chain(&network::sandbox());
    let wallet: Arc<dyn WalletProvider> = chain.clone();
    let reader: Arc<dyn ChainReader> = chain;
    let registry = NetworkRegistry::builtin();

    let session = WalletSession::for_chain(wallet, reader, &registry, ChainId::SEPOLIA).unwrap();

    assert!(Arc::ptr_eq(
        session.target(),
        &registry.lookup(ChainId::SEPOLIA).unwrap()
    ));
}
