//! Depositor balances
//!
//! Balance changes are planned first and applied afterwards, so the caller
//! can run the external transfer between the two steps and drop the plan
//! if the transfer fails.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{LedgerError, Result};
use crate::types::{AccountId, Amount, Timestamp};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub balance: Amount,
    pub last_deposit_time: Timestamp,
}

/// A validated balance change waiting to be applied
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct BalanceUpdate {
    user: AccountId,
    balance: Amount,
    total_deposits: Amount,
    deposit_time: Option<Timestamp>,
}

impl BalanceUpdate {
    pub fn user(&self) -> &AccountId {
        &self.user
    }

    pub fn new_balance(&self) -> Amount {
        self.balance
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DepositLedger {
    users: HashMap<AccountId, UserRecord>,
    total_deposits: Amount,
}

impl DepositLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(&self, user: &AccountId) -> UserRecord {
        self.users.get(user).copied().unwrap_or_default()
    }

    pub fn total_deposits(&self) -> Amount {
        self.total_deposits
    }

    pub fn depositor_count(&self) -> usize {
        self.users.len()
    }

    pub fn users(&self) -> impl Iterator<Item = (&AccountId, &UserRecord)> {
        self.users.iter()
    }

    pub fn plan_deposit(&self, user: &AccountId, amount: Amount, now: Timestamp) -> Result<BalanceUpdate> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount(
                "deposit must be positive".to_string(),
            ));
        }
        let record = self.user(user);
        Ok(BalanceUpdate {
            user: user.clone(),
            balance: record
                .balance
                .checked_add(amount)
                .ok_or(LedgerError::MathOverflow)?,
            total_deposits: self
                .total_deposits
                .checked_add(amount)
                .ok_or(LedgerError::MathOverflow)?,
            deposit_time: Some(now),
        })
    }

    /// Withdrawals leave `last_deposit_time` untouched
    pub fn plan_withdraw(&self, user: &AccountId, amount: Amount) -> Result<BalanceUpdate> {
        let record = self.user(user);
        if amount > record.balance {
            return Err(LedgerError::InsufficientBalance {
                requested: amount,
                available: record.balance,
            });
        }
        Ok(BalanceUpdate {
            user: user.clone(),
            balance: record.balance - amount,
            total_deposits: self.total_deposits - amount,
            deposit_time: None,
        })
    }

    pub fn apply(&mut self, update: BalanceUpdate) {
        let record = self.users.entry(update.user).or_default();
        record.balance = update.balance;
        if let Some(time) = update.deposit_time {
            record.last_deposit_time = time;
        }
        self.total_deposits = update.total_deposits;
    }

    /// Recompute the deposit total from the user records
    pub fn recomputed_total(&self) -> Amount {
        self.users.values().map(|record| record.balance).sum()
    }
}
