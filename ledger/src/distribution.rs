//! Calibration eligibility and pro-rata payout sizing
//!
//! A depositor may calibrate against a pool when all of these hold:
//! - their balance is positive (404)
//! - their last deposit is no later than the start of the previous cycle (403)
//! - they have not claimed from the pool in the current cycle (402)
//!
//! Mutating calibrations additionally require the window to be open.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::cycle::CycleClock;
use crate::deposits::DepositLedger;
use crate::error::{LedgerError, Result};
use crate::pool::RewardPools;
use crate::types::{AccountId, Amount, PoolKey, Timestamp};

/// Reason returned by previews when calibration would succeed
pub const ELIGIBLE_REASON: &str = "200: User can calibrate";

/// Why a depositor cannot calibrate right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ineligibility {
    NoDeposit,
    NotSeasoned,
    AlreadyClaimed,
}

impl Ineligibility {
    pub fn into_error(self, base_label: &str, pool_label: &str) -> LedgerError {
        match self {
            Ineligibility::NoDeposit => LedgerError::NoDeposit {
                asset: base_label.to_string(),
            },
            Ineligibility::NotSeasoned => LedgerError::NotEligibleYet,
            Ineligibility::AlreadyClaimed => LedgerError::AlreadyClaimed {
                asset: pool_label.to_string(),
            },
        }
    }
}

/// Read-only answer to "what would calibrating pay, and would it succeed"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationPreview {
    pub amount: Amount,
    pub can_withdraw: bool,
    pub reason: String,
}

/// Eligibility and payout rules over borrowed ledger state
pub struct DistributionEngine<'a> {
    cycle: &'a CycleClock,
    deposits: &'a DepositLedger,
    pools: &'a RewardPools,
}

impl<'a> DistributionEngine<'a> {
    pub fn new(cycle: &'a CycleClock, deposits: &'a DepositLedger, pools: &'a RewardPools) -> Self {
        Self {
            cycle,
            deposits,
            pools,
        }
    }

    /// First failing eligibility rule, ignoring the calibration window
    pub fn check_eligibility(&self, user: &AccountId, key: &PoolKey, now: Timestamp) -> Option<Ineligibility> {
        let record = self.deposits.user(user);
        if record.balance == 0 {
            return Some(Ineligibility::NoDeposit);
        }

        let seasoned = self
            .cycle
            .previous_cycle_start(now)
            .map_or(false, |start| record.last_deposit_time <= start);
        if !seasoned {
            return Some(Ineligibility::NotSeasoned);
        }

        let cycle = self.cycle.cycle_index(now);
        let claimable = self
            .pools
            .get(key)
            .map_or(true, |pool| pool.can_claim_in(user, cycle));
        if !claimable {
            return Some(Ineligibility::AlreadyClaimed);
        }

        None
    }

    /// `basis * balance / total_deposits`, truncated.
    ///
    /// The product is taken at arbitrary width; since `balance <= total`
    /// the quotient never exceeds `basis` and fits back into an `Amount`.
    pub fn payout(&self, user: &AccountId, key: &PoolKey) -> Result<Amount> {
        let total = self.deposits.total_deposits();
        if total == 0 {
            return Ok(0);
        }
        let basis = self.pools.get(key).map_or(0, |pool| pool.payout_basis());
        let balance = self.deposits.user(user).balance;
        let scaled = BigUint::from(basis) * BigUint::from(balance) / BigUint::from(total);
        Amount::try_from(scaled).map_err(|_| LedgerError::MathOverflow)
    }

    pub fn preview(
        &self,
        user: &AccountId,
        key: &PoolKey,
        now: Timestamp,
        base_label: &str,
        pool_label: &str,
    ) -> Result<CalibrationPreview> {
        let amount = self.payout(user, key)?;
        let preview = match self.check_eligibility(user, key, now) {
            None => CalibrationPreview {
                amount,
                can_withdraw: true,
                reason: ELIGIBLE_REASON.to_string(),
            },
            Some(ineligible) => CalibrationPreview {
                amount,
                can_withdraw: false,
                reason: ineligible.into_error(base_label, pool_label).to_string(),
            },
        };
        Ok(preview)
    }

    /// Validate a mutating calibration and size its payout
    pub fn authorize(
        &self,
        user: &AccountId,
        key: &PoolKey,
        now: Timestamp,
        base_label: &str,
        pool_label: &str,
    ) -> Result<Amount> {
        if !self.cycle.is_open(now) {
            return Err(LedgerError::WindowClosed);
        }
        if let Some(ineligible) = self.check_eligibility(user, key, now) {
            return Err(ineligible.into_error(base_label, pool_label));
        }
        self.payout(user, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TokenKey;

    struct Fixture {
        cycle: CycleClock,
        deposits: DepositLedger,
        pools: RewardPools,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                cycle: CycleClock::new(10, 5).unwrap(),
                deposits: DepositLedger::new(),
                pools: RewardPools::new(),
            }
        }

        fn deposit(&mut self, user: &str, amount: Amount, now: Timestamp) {
            let update = self.deposits.plan_deposit(&user.into(), amount, now).unwrap();
            self.deposits.apply(update);
        }

        fn submit(&mut self, key: &PoolKey, amount: Amount) {
            let update = self.pools.plan_submit(key, amount).unwrap();
            self.pools.apply(update);
        }

        fn engine(&self) -> DistributionEngine<'_> {
            DistributionEngine::new(&self.cycle, &self.deposits, &self.pools)
        }
    }

    fn token() -> PoolKey {
        PoolKey::Token(TokenKey::new("0xaaa"))
    }

    #[test]
    fn test_no_deposit() {
        let fx = Fixture::new();
        assert_eq!(
            fx.engine().check_eligibility(&"alice".into(), &token(), 40),
            Some(Ineligibility::NoDeposit)
        );
    }

    #[test]
    fn test_seasoning_boundary() {
        let mut fx = Fixture::new();
        fx.deposit("alice", 10, 20);
        fx.deposit("bob", 10, 21);

        // At t=30 the previous cycle started at 20
        let engine = fx.engine();
        assert_eq!(engine.check_eligibility(&"alice".into(), &token(), 30), None);
        assert_eq!(
            engine.check_eligibility(&"bob".into(), &token(), 30),
            Some(Ineligibility::NotSeasoned)
        );
        assert_eq!(engine.check_eligibility(&"bob".into(), &token(), 40), None);
    }

    #[test]
    fn test_nobody_is_seasoned_in_cycle_zero() {
        let mut fx = Fixture::new();
        fx.deposit("alice", 10, 0);
        assert_eq!(
            fx.engine().check_eligibility(&"alice".into(), &token(), 3),
            Some(Ineligibility::NotSeasoned)
        );
    }

    #[test]
    fn test_payout_truncates() {
        let mut fx = Fixture::new();
        fx.deposit("alice", 1, 0);
        fx.deposit("bob", 2, 0);
        fx.submit(&token(), 10);

        let engine = fx.engine();
        assert_eq!(engine.payout(&"alice".into(), &token()).unwrap(), 3);
        assert_eq!(engine.payout(&"bob".into(), &token()).unwrap(), 6);
    }

    #[test]
    fn test_payout_of_unknown_pool_is_zero() {
        let mut fx = Fixture::new();
        fx.deposit("alice", 1, 0);
        assert_eq!(fx.engine().payout(&"alice".into(), &token()).unwrap(), 0);
    }

    #[test]
    fn test_preview_reports_amount_while_ineligible() {
        let mut fx = Fixture::new();
        fx.deposit("alice", 5, 0);
        fx.deposit("bob", 5, 0);
        fx.submit(&token(), 100);

        let preview = fx
            .engine()
            .preview(&"alice".into(), &token(), 3, "MYNT", "tokens")
            .unwrap();
        assert_eq!(preview.amount, 50);
        assert!(!preview.can_withdraw);
        assert!(preview.reason.starts_with("403"));
    }

    #[test]
    fn test_preview_ignores_window() {
        let mut fx = Fixture::new();
        fx.deposit("alice", 5, 0);
        fx.submit(&token(), 100);

        // t=17 is outside the window of cycle 1
        let preview = fx
            .engine()
            .preview(&"alice".into(), &token(), 17, "MYNT", "tokens")
            .unwrap();
        assert!(preview.can_withdraw);
        assert_eq!(preview.reason, ELIGIBLE_REASON);
        assert_eq!(preview.amount, 100);
    }

    #[test]
    fn test_authorize_requires_open_window() {
        let mut fx = Fixture::new();
        fx.deposit("alice", 5, 0);
        fx.submit(&token(), 100);

        let engine = fx.engine();
        assert_eq!(
            engine.authorize(&"alice".into(), &token(), 17, "MYNT", "tokens"),
            Err(LedgerError::WindowClosed)
        );
        assert_eq!(
            engine.authorize(&"alice".into(), &token(), 20, "MYNT", "tokens"),
            Ok(100)
        );
    }

    #[test]
    fn test_payout_with_wide_product() {
        let mut fx = Fixture::new();
        fx.deposit("alice", Amount::MAX / 2, 0);
        fx.deposit("bob", Amount::MAX / 2, 0);
        fx.submit(&token(), 4);
        assert_eq!(fx.engine().payout(&"alice".into(), &token()), Ok(2));

        fx.submit(&token(), Amount::MAX - 4);
        assert_eq!(
            fx.engine().payout(&"alice".into(), &token()),
            Ok(Amount::MAX / 2)
        );
    }
}
