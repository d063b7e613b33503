//! Ledger error types

use thiserror::Error;

use crate::types::{Amount, Asset, TokenKey};

/// Failures reported by an asset transfer backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("Insufficient {asset} funds: requested {requested}, available {available}")]
    InsufficientFunds {
        asset: Asset,
        requested: Amount,
        available: Amount,
    },

    #[error("Transfer rejected: {0}")]
    Rejected(String),
}

/// Ledger errors.
///
/// Every error aborts the whole call; no partial state is ever committed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Initializable: contract is already initialized")]
    AlreadyInitialized,

    #[error("Ledger has not been initialized")]
    NotInitialized,

    #[error("Ownable: caller is not the owner")]
    NotOwner,

    #[error("Pausable: paused")]
    Paused,

    #[error("Pausable: not paused")]
    NotPaused,

    #[error("401: Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: Amount, available: Amount },

    #[error("403: User has not deposited before the previous calibration cycle")]
    NotEligibleYet,

    #[error("402: User has allocated {asset} before in this calibration cycle")]
    AlreadyClaimed { asset: String },

    #[error("404: User has not deposited any {asset}")]
    NoDeposit { asset: String },

    #[error("Calibration window is closed")]
    WindowClosed,

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Unknown token: {0}")]
    UnknownToken(TokenKey),

    #[error("Arithmetic overflow")]
    MathOverflow,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Transfer failed: {0}")]
    Transfer(#[from] TransferError),
}

impl LedgerError {
    /// Numeric reason code carried by eligibility and balance failures
    pub fn code(&self) -> Option<u16> {
        match self {
            LedgerError::InsufficientBalance { .. } => Some(401),
            LedgerError::AlreadyClaimed { .. } => Some(402),
            LedgerError::NotEligibleYet => Some(403),
            LedgerError::NoDeposit { .. } => Some(404),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
