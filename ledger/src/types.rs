//! Identity and amount types shared across the ledger

use serde::{Deserialize, Serialize};
use std::fmt;

/// Base-asset and reward amounts, in the asset's smallest unit
pub type Amount = u128;

/// Seconds since the epoch the cycle schedule is anchored to
pub type Timestamp = u64;

/// One whole unit of an 18-decimal asset
pub const UNIT: Amount = 1_000_000_000_000_000_000;

/// Identity of a depositor, submitter or owner
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Address of an external reward token
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenKey(String);

impl TokenKey {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TokenKey {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

/// An asset the ledger moves in or out.
///
/// Deposits, withdrawals and mynt submissions all move the native asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Asset {
    Native,
    Token(TokenKey),
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asset::Native => f.write_str("native"),
            Asset::Token(key) => write!(f, "token {}", key),
        }
    }
}

/// Selects which reward pool an operation targets
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoolKey {
    Mynt,
    Token(TokenKey),
}

impl PoolKey {
    /// The asset paid out by this pool
    pub fn asset(&self) -> Asset {
        match self {
            PoolKey::Mynt => Asset::Native,
            PoolKey::Token(key) => Asset::Token(key.clone()),
        }
    }
}

impl fmt::Display for PoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolKey::Mynt => f.write_str("mynt"),
            PoolKey::Token(key) => write!(f, "token {}", key),
        }
    }
}
