use thiserror::Error;

use crate::port::WalletError;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("no network configured for chain id {chain_id}")]
    UnknownChain { chain_id: u64 },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Caller-fixable, pre-flight problems.
///
/// These never indicate a wallet or chain malfunction and are safe to show
/// to the end user as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid market id: {0}")]
    InvalidMarket(String),

    #[error("insufficient balance: need {required}, have {available}")]
    InsufficientBalance { required: String, available: String },

    #[error("amount exceeds the maximum uint256 value")]
    AmountTooLarge,

    #[error("wallet session is not connected")]
    NotInitialised,
}

/// Failures originating from the wallet, the chain node, or the contracts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Web3Error {
    #[error("wallet returned no accounts")]
    NoAccounts,

    #[error("request rejected by user")]
    UserRejected,

    #[error("failed to switch wallet to {target}: {reason}")]
    NetworkSwitchFailed { target: String, reason: String },

    #[error("no contract code at {address}")]
    ContractNotFound { address: String },

    #[error("escrow token {actual} does not match configured token {expected}")]
    ContractMismatch { expected: String, actual: String },

    #[error("transaction reverted: {}", reason.as_deref().unwrap_or("no reason given"))]
    TransactionReverted { reason: Option<String> },

    #[error("{context} failed: {message}")]
    TransactionFailed {
        context: &'static str,
        message: String,
    },

    #[error("allowance still insufficient after approval was mined")]
    ApprovalIneffective,

    #[error("gas price too high: {current_gwei} gwei > {max_gwei} gwei")]
    GasPriceTooHigh { current_gwei: u128, max_gwei: u128 },

    #[error("wallet provider error during {context}: {message}")]
    Provider {
        context: &'static str,
        message: String,
    },
}

impl Web3Error {
    /// Translate a raw wallet error raised while submitting or mining a
    /// transaction.
    pub fn from_wallet(context: &'static str, err: WalletError) -> Self {
        match err {
            WalletError::UserRejected => Self::UserRejected,
            WalletError::Reverted { reason } => Self::TransactionReverted { reason },
            other => Self::TransactionFailed {
                context,
                message: other.to_string(),
            },
        }
    }

    /// Translate a raw wallet error raised by a read or a handshake request.
    ///
    /// User rejections keep their category; everything else is a provider
    /// failure rather than a transaction failure.
    pub fn from_read(context: &'static str, err: WalletError) -> Self {
        match err {
            WalletError::UserRejected => Self::UserRejected,
            other => Self::Provider {
                context,
                message: other.to_string(),
            },
        }
    }
}

/// Coarse category of an [`Error`], for callers deciding how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Validation,
    Web3,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Web3(#[from] Web3Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) | Self::Json(_) | Self::Io(_) => ErrorKind::Config,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Web3(_) => ErrorKind::Web3,
        }
    }

    /// Whether offering the user a retry makes sense.
    ///
    /// Misconfigured contracts and validation failures won't fix themselves.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Web3(err) => !matches!(
                err,
                Web3Error::ContractNotFound { .. }
                    | Web3Error::ContractMismatch { .. }
                    | Web3Error::ApprovalIneffective
            ),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_rejection_survives_translation() {
        let err = Web3Error::from_wallet("wager", WalletError::UserRejected);
        assert_eq!(err, Web3Error::UserRejected);

        let err = Web3Error::from_read("request accounts", WalletError::UserRejected);
        assert_eq!(err, Web3Error::UserRejected);
    }

    #[test]
    fn revert_keeps_reason() {
        let err = Web3Error::from_wallet(
            "wager",
            WalletError::Reverted {
                reason: Some("Market closed".into()),
            },
        );
        assert_eq!(
            err,
            Web3Error::TransactionReverted {
                reason: Some("Market closed".into())
            }
        );
        assert_eq!(err.to_string(), "transaction reverted: Market closed");
    }

    #[test]
    fn unknown_failure_wraps_message() {
        let err = Web3Error::from_wallet(
            "approve",
            WalletError::Rpc {
                code: -32000,
                message: "nonce too low".into(),
            },
        );
        match err {
            Web3Error::TransactionFailed { context, message } => {
                assert_eq!(context, "approve");
                assert!(message.contains("nonce too low"));
            }
            other => panic!("expected TransactionFailed, got {other:?}"),
        }
    }

    #[test]
    fn reads_become_provider_errors() {
        let err = Web3Error::from_read("balanceOf", WalletError::Transport("refused".into()));
        assert!(matches!(err, Web3Error::Provider { context: "balanceOf", .. }));
    }

    #[test]
    fn validation_errors_are_never_retryable() {
        let err: Error = ValidationError::NotInitialised.into();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(!err.is_retryable());
    }

    #[test]
    fn rejected_transactions_are_retryable() {
        let err: Error = Web3Error::UserRejected.into();
        assert_eq!(err.kind(), ErrorKind::Web3);
        assert!(err.is_retryable());

        let err: Error = Web3Error::ContractMismatch {
            expected: "a".into(),
            actual: "b".into(),
        }
        .into();
        assert!(!err.is_retryable());
    }
}
