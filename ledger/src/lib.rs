//! Network ETF Ledger
//!
//! Pooled-fund ledger that:
//! - accepts base-asset deposits
//! - accepts reward submissions, per external token and in native mynt
//! - pays each seasoned depositor a pro-rata share once per cycle
//!
//! Claims are only accepted during the calibration window that opens
//! every cycle.

pub mod access;
pub mod clock;
pub mod config;
pub mod cycle;
pub mod deposits;
pub mod distribution;
pub mod error;
pub mod ledger;
pub mod pool;
pub mod service;
pub mod transfer;
pub mod types;

pub use access::Lifecycle;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{LedgerConfig, DEFAULT_BOND_AMOUNT, DEFAULT_CYCLE_LENGTH, DEFAULT_CYCLE_PERIOD};
pub use cycle::CycleClock;
pub use deposits::{DepositLedger, UserRecord};
pub use distribution::{CalibrationPreview, DistributionEngine, Ineligibility, ELIGIBLE_REASON};
pub use error::{LedgerError, Result, TransferError};
pub use ledger::{Ledger, LedgerSnapshot, PoolSummary};
pub use pool::{RewardPool, RewardPools};
pub use service::SharedLedger;
pub use transfer::{AssetTransfer, InMemoryBank};
pub use types::{AccountId, Amount, Asset, PoolKey, Timestamp, TokenKey, UNIT};

/// Ledger module version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
