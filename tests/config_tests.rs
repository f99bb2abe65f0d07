// These tests hold a MutexGuard across the whole test to serialize access
// to environment variables shared between parallel tests.

use std::io::Write;
use std::sync::Mutex;

use betline::application::GasPolicy;
use betline::domain::ChainId;
use betline::error::{ConfigError, Error};
use betline::infrastructure::config::logging::LogFormat;
use betline::infrastructure::config::settings::{Config, SANDBOX_MINT_ENV};
use tempfile::NamedTempFile;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn write_temp_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}

fn clear_env() {
    std::env::remove_var(SANDBOX_MINT_ENV);
    std::env::remove_var("WALLET_PRIVATE_KEY");
}

const ANVIL_NETWORK: &str = r#"
[[networks]]
name = "Anvil"
chain_id = 31337
escrow_address = "0x5FbDB2315678afecb367f032d93F642f64180aa3"
token_address = "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512"
explorer_url = "http://localhost:8545"
sandbox = true
rpc_url = "http://localhost:8545"
"#;

#[test]
fn empty_config_targets_sepolia_with_defaults() {
    let _guard = ENV_LOCK.lock().expect("env lock poisoned");
    clear_env();

    let config = Config::parse_toml("").expect("empty config parses");

    assert_eq!(config.target_chain_id(), ChainId::SEPOLIA);
    assert!(!config.sandbox_mint);
    assert_eq!(config.logging.format, LogFormat::Pretty);
    assert_eq!(config.gas.policy(), GasPolicy::default());
    assert_eq!(config.wallet.poll_interval_ms, 1000);
    assert!(config.wallet.private_key.is_none());
    assert_eq!(config.registry().len(), 1);
    assert!(config.target_network().unwrap().sandbox);
}

#[test]
fn full_config_loads_from_file() {
    let _guard = ENV_LOCK.lock().expect("env lock poisoned");
    clear_env();

    let toml = format!(
        r#"
target_chain = 31337
sandbox_mint = true

[logging]
level = "debug"
format = "json"

[gas]
max_gas_price_gwei = 0
limit_buffer_percent = 50

[wallet]
poll_interval_ms = 250
{ANVIL_NETWORK}"#
    );
    let file = write_temp_config(&toml);

    let config = Config::load(file.path()).expect("config loads");

    assert_eq!(config.target_chain_id(), ChainId::new(31337));
    assert_eq!(config.registry().len(), 2);
    assert_eq!(config.logging.format, LogFormat::Json);
    let orchestrator = config.orchestrator_config();
    assert!(orchestrator.sandbox_mint);
    assert_eq!(orchestrator.gas.max_gas_price, None);
    assert_eq!(orchestrator.gas.limit_buffer_percent, 50);
    assert_eq!(
        config.wallet.poll_interval(),
        std::time::Duration::from_millis(250)
    );

    let anvil = config.target_network().unwrap();
    assert_eq!(anvil.hex_chain_id, "0x7a69");
    assert_eq!(anvil.rpc_url.as_deref(), Some("http://localhost:8545"));
}

#[test]
fn unknown_target_chain_rejected() {
    let _guard = ENV_LOCK.lock().expect("env lock poisoned");
    clear_env();

    match Config::parse_toml("target_chain = 424242") {
        Err(Error::Config(ConfigError::UnknownChain { chain_id: 424_242 })) => {}
        Err(err) => panic!("Expected unknown chain error, got {err}"),
        Ok(_) => panic!("Expected unknown chain error, got Ok"),
    }
}

#[test]
fn sandbox_mint_rejected_on_production_network() {
    let _guard = ENV_LOCK.lock().expect("env lock poisoned");
    clear_env();

    let toml = r#"
target_chain = 1
sandbox_mint = true

[[networks]]
name = "Ethereum Mainnet"
chain_id = 1
escrow_address = "0xe5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5"
token_address = "0x7070707070707070707070707070707070707070"
explorer_url = "https://etherscan.io"
"#;

    match Config::parse_toml(toml) {
        Err(Error::Config(ConfigError::InvalidValue {
            field: "sandbox_mint",
            ..
        })) => {}
        Err(err) => panic!("Expected sandbox_mint error, got {err}"),
        Ok(_) => panic!("Expected sandbox_mint error, got Ok"),
    }
}

#[test]
fn sandbox_mint_env_overrides_file() {
    let _guard = ENV_LOCK.lock().expect("env lock poisoned");
    clear_env();

    std::env::set_var(SANDBOX_MINT_ENV, "yes");
    let enabled = Config::parse_toml("sandbox_mint = false").map(|c| c.sandbox_mint);
    std::env::set_var(SANDBOX_MINT_ENV, "0");
    let disabled = Config::parse_toml("sandbox_mint = true").map(|c| c.sandbox_mint);
    clear_env();

    assert!(enabled.expect("config parses"));
    assert!(!disabled.expect("config parses"));
}

#[test]
fn private_key_comes_from_env_only() {
    let _guard = ENV_LOCK.lock().expect("env lock poisoned");
    clear_env();

    std::env::set_var("WALLET_PRIVATE_KEY", "0xabc");
    let config = Config::parse_toml("[wallet]\nprivate_key = \"0xfile\"\n");
    clear_env();

    let config = config.expect("config parses");
    assert_eq!(config.wallet.private_key.as_deref(), Some("0xabc"));
    assert!(!format!("{:?}", config.wallet).contains("0xabc"));
}

#[test]
fn network_entry_with_bad_checksum_rejected() {
    let _guard = ENV_LOCK.lock().expect("env lock poisoned");
    clear_env();

    let toml = ANVIL_NETWORK.replace("0x5FbDB", "0x5fbDB");
    match Config::parse_toml(&toml) {
        Err(Error::Config(ConfigError::InvalidValue {
            field: "networks.escrow_address",
            ..
        })) => {}
        Err(err) => panic!("Expected address error, got {err}"),
        Ok(_) => panic!("Expected address error, got Ok"),
    }
}

#[test]
fn network_entry_hex_must_match_chain_id() {
    let _guard = ENV_LOCK.lock().expect("env lock poisoned");
    clear_env();

    let toml = ANVIL_NETWORK.replace(
        "chain_id = 31337",
        "chain_id = 31337\nhex_chain_id = \"0x7a6a\"",
    );
    assert!(matches!(
        Config::parse_toml(&toml),
        Err(Error::Config(ConfigError::InvalidValue {
            field: "networks.hex_chain_id",
            ..
        }))
    ));
}

#[test]
fn network_entry_overrides_builtin() {
    let _guard = ENV_LOCK.lock().expect("env lock poisoned");
    clear_env();

    let toml = r#"
[[networks]]
name = "Sepolia (private RPC)"
chain_id = 11155111
escrow_address = "0x1839611f77279106ac4b2b522ad90b1903651f55"
token_address = "0x92a1c620751ba38e885461c3e356d41a226962f3"
explorer_url = "https://sepolia.etherscan.io"
sandbox = true
rpc_url = "https://rpc.example.org"
"#;

    let config = Config::parse_toml(toml).expect("config parses");
    let sepolia = config.target_network().unwrap();

    assert_eq!(config.registry().len(), 1);
    assert_eq!(sepolia.name, "Sepolia (private RPC)");
    assert_eq!(sepolia.rpc_url.as_deref(), Some("https://rpc.example.org"));
}

#[test]
fn zero_poll_interval_rejected() {
    let _guard = ENV_LOCK.lock().expect("env lock poisoned");
    clear_env();

    assert!(matches!(
        Config::parse_toml("[wallet]\npoll_interval_ms = 0\n"),
        Err(Error::Config(ConfigError::InvalidValue {
            field: "poll_interval_ms",
            ..
        }))
    ));
}

#[test]
fn set_target_chain_validates_and_rolls_back() {
    let _guard = ENV_LOCK.lock().expect("env lock poisoned");
    clear_env();

    let mut config = Config::parse_toml(ANVIL_NETWORK).expect("config parses");

    config.set_target_chain(31337).expect("anvil is registered");
    assert_eq!(config.target_chain_id(), ChainId::new(31337));

    assert!(config.set_target_chain(5).is_err());
    assert_eq!(config.target_chain_id(), ChainId::new(31337));
}

#[test]
fn malformed_toml_is_parse_error() {
    let _guard = ENV_LOCK.lock().expect("env lock poisoned");
    clear_env();

    assert!(matches!(
        Config::parse_toml("target_chain = \"sepolia\""),
        Err(Error::Config(ConfigError::Parse(_)))
    ));
}

#[test]
fn missing_file_is_read_error() {
    let result = Config::load("/nonexistent/betline/config.toml");
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::ReadFile(_)))
    ));
}
