//! Reward pool management
//!
//! One pool per external token, in first-submission order, plus the
//! always-present mynt pool. Pools record what was submitted, what was paid
//! out, and the last cycle each user claimed in.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{LedgerError, Result};
use crate::types::{AccountId, Amount, PoolKey, TokenKey};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardPool {
    total_submitted: Amount,
    total_distributed: Amount,
    claimed_cycle: HashMap<AccountId, u64>,
}

impl RewardPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_submitted(&self) -> Amount {
        self.total_submitted
    }

    pub fn total_distributed(&self) -> Amount {
        self.total_distributed
    }

    /// Amount the pro-rata share is taken from.
    ///
    /// Claims never shrink it: every cycle shares out the full submitted
    /// total again, bounded only by what the ledger actually holds.
    pub fn payout_basis(&self) -> Amount {
        self.total_submitted
    }

    /// Submitted but not yet paid out
    pub fn undistributed(&self) -> Amount {
        self.total_submitted.saturating_sub(self.total_distributed)
    }

    pub fn claimed_cycle(&self, user: &AccountId) -> Option<u64> {
        self.claimed_cycle.get(user).copied()
    }

    /// Whether `user` may still claim during `cycle`
    pub fn can_claim_in(&self, user: &AccountId, cycle: u64) -> bool {
        self.claimed_cycle(user).map_or(true, |claimed| claimed < cycle)
    }
}

/// A validated pool change waiting to be applied
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum PoolUpdate {
    Submit {
        key: PoolKey,
        total_submitted: Amount,
    },
    Claim {
        key: PoolKey,
        user: AccountId,
        cycle: u64,
        total_distributed: Amount,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardPools {
    tokens: HashMap<TokenKey, RewardPool>,
    registry: Vec<TokenKey>,
    mynt: RewardPool,
}

impl Default for RewardPools {
    fn default() -> Self {
        Self::new()
    }
}

impl RewardPools {
    pub fn new() -> Self {
        Self {
            tokens: HashMap::new(),
            registry: Vec::new(),
            mynt: RewardPool::new(),
        }
    }

    pub fn get(&self, key: &PoolKey) -> Option<&RewardPool> {
        match key {
            PoolKey::Mynt => Some(&self.mynt),
            PoolKey::Token(token) => self.tokens.get(token),
        }
    }

    pub fn mynt(&self) -> &RewardPool {
        &self.mynt
    }

    pub fn total_tokens(&self) -> usize {
        self.registry.len()
    }

    /// Token address by registry position (first-submission order)
    pub fn token_at(&self, index: usize) -> Option<&TokenKey> {
        self.registry.get(index)
    }

    pub fn tokens(&self) -> &[TokenKey] {
        &self.registry
    }

    /// Nominal submitted total; zero for tokens never submitted
    pub fn balance(&self, key: &PoolKey) -> Amount {
        self.get(key).map_or(0, RewardPool::total_submitted)
    }

    pub fn plan_submit(&self, key: &PoolKey, amount: Amount) -> Result<PoolUpdate> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount(
                "submission must be positive".to_string(),
            ));
        }
        let total_submitted = self
            .balance(key)
            .checked_add(amount)
            .ok_or(LedgerError::MathOverflow)?;
        Ok(PoolUpdate::Submit {
            key: key.clone(),
            total_submitted,
        })
    }

    /// Plan recording a claim of `share` by `user` during `cycle`.
    ///
    /// Fails if the user already claimed from this pool in `cycle` or later.
    pub fn plan_claim(
        &self,
        key: &PoolKey,
        user: &AccountId,
        share: Amount,
        cycle: u64,
        asset_label: &str,
    ) -> Result<PoolUpdate> {
        let pool = self.pool_for_claim(key)?;
        if !pool.can_claim_in(user, cycle) {
            return Err(LedgerError::AlreadyClaimed {
                asset: asset_label.to_string(),
            });
        }
        let total_distributed = pool
            .total_distributed
            .checked_add(share)
            .ok_or(LedgerError::MathOverflow)?;
        Ok(PoolUpdate::Claim {
            key: key.clone(),
            user: user.clone(),
            cycle,
            total_distributed,
        })
    }

    pub fn apply(&mut self, update: PoolUpdate) {
        match update {
            PoolUpdate::Submit {
                key,
                total_submitted,
            } => {
                let pool = match key {
                    PoolKey::Mynt => &mut self.mynt,
                    PoolKey::Token(token) => {
                        if !self.tokens.contains_key(&token) {
                            self.registry.push(token.clone());
                        }
                        self.tokens
                            .entry(token)
                            .or_insert_with(RewardPool::new)
                    }
                };
                pool.total_submitted = total_submitted;
            }
            PoolUpdate::Claim {
                key,
                user,
                cycle,
                total_distributed,
            } => {
                let pool = match key {
                    PoolKey::Mynt => &mut self.mynt,
                    PoolKey::Token(token) => {
                        let pool = self.tokens.get_mut(&token);
                        debug_assert!(
                            pool.is_some(),
                            "claim planned against unregistered token {}",
                            token
                        );
                        match pool {
                            Some(pool) => pool,
                            None => {
                                log::error!("❌ Dropping claim against unregistered token {}", token);
                                return;
                            }
                        }
                    }
                };
                pool.claimed_cycle.insert(user, cycle);
                pool.total_distributed = total_distributed;
            }
        }
    }

    fn pool_for_claim(&self, key: &PoolKey) -> Result<&RewardPool> {
        match key {
            PoolKey::Mynt => Ok(&self.mynt),
            PoolKey::Token(token) => self
                .tokens
                .get(token)
                .ok_or_else(|| LedgerError::UnknownToken(token.clone())),
        }
    }
}
