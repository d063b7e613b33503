//! Cycle-gated pro-rata distribution ledger
//!
//! Every mutating operation runs in three steps: validate and plan against
//! the current state, move assets through the transfer backend, then apply
//! the plan. A failure in either of the first two steps returns before any
//! ledger state is touched.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::access::Lifecycle;
use crate::config::LedgerConfig;
use crate::cycle::CycleClock;
use crate::deposits::{DepositLedger, UserRecord};
use crate::distribution::{CalibrationPreview, DistributionEngine};
use crate::error::{LedgerError, Result};
use crate::pool::RewardPools;
use crate::transfer::AssetTransfer;
use crate::types::{AccountId, Amount, Asset, PoolKey, Timestamp, TokenKey};

#[derive(Debug, Clone)]
pub struct Ledger {
    lifecycle: Lifecycle,
    cycle: Option<CycleClock>,
    deposits: DepositLedger,
    pools: RewardPools,
    base_asset_label: String,
    token_asset_label: String,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// Create an uninitialized ledger with the default asset labels
    pub fn new() -> Self {
        let defaults = LedgerConfig::default();
        Self::with_labels(defaults.base_asset_label, defaults.token_asset_label)
    }

    pub fn with_labels(base_asset_label: impl Into<String>, token_asset_label: impl Into<String>) -> Self {
        Self {
            lifecycle: Lifecycle::new(),
            cycle: None,
            deposits: DepositLedger::new(),
            pools: RewardPools::new(),
            base_asset_label: base_asset_label.into(),
            token_asset_label: token_asset_label.into(),
        }
    }

    // ---- lifecycle ----

    /// One-time setup. `caller` becomes owner and its bond is booked as an
    /// ordinary deposit made at `now`.
    pub fn initialize<T: AssetTransfer + ?Sized>(
        &mut self,
        bank: &mut T,
        caller: &AccountId,
        cycle_period: Timestamp,
        cycle_length: Timestamp,
        bond_amount: Amount,
        now: Timestamp,
    ) -> Result<()> {
        self.lifecycle.ensure_uninitialized()?;
        let cycle = CycleClock::new(cycle_period, cycle_length)?;

        let bond = if bond_amount > 0 {
            let update = self.deposits.plan_deposit(caller, bond_amount, now)?;
            bank.transfer_in(&Asset::Native, caller, bond_amount)?;
            Some(update)
        } else {
            None
        };

        self.lifecycle.initialize(caller)?;
        self.cycle = Some(cycle);
        if let Some(update) = bond {
            self.deposits.apply(update);
        }

        log::info!(
            "✅ Ledger initialized by {} (cycle period {}s, window {}s, bond {})",
            caller,
            cycle_period,
            cycle_length,
            bond_amount
        );
        Ok(())
    }

    /// Initialize from a loaded configuration, adopting its asset labels
    pub fn initialize_with_config<T: AssetTransfer + ?Sized>(
        &mut self,
        bank: &mut T,
        caller: &AccountId,
        config: &LedgerConfig,
        now: Timestamp,
    ) -> Result<()> {
        self.lifecycle.ensure_uninitialized()?;
        config.validate()?;
        self.initialize(
            bank,
            caller,
            config.cycle_period,
            config.cycle_length,
            config.bond_amount,
            now,
        )?;
        self.base_asset_label = config.base_asset_label.clone();
        self.token_asset_label = config.token_asset_label.clone();
        Ok(())
    }

    pub fn pause(&mut self, caller: &AccountId) -> Result<()> {
        self.lifecycle.pause(caller)?;
        log::warn!("Ledger paused by {}", caller);
        Ok(())
    }

    pub fn unpause(&mut self, caller: &AccountId) -> Result<()> {
        self.lifecycle.unpause(caller)?;
        log::info!("Ledger unpaused by {}", caller);
        Ok(())
    }

    pub fn transfer_ownership(&mut self, caller: &AccountId, new_owner: AccountId) -> Result<()> {
        self.lifecycle.transfer_ownership(caller, new_owner.clone())?;
        log::info!("Ownership transferred from {} to {}", caller, new_owner);
        Ok(())
    }

    // ---- deposits ----

    pub fn deposit<T: AssetTransfer + ?Sized>(
        &mut self,
        bank: &mut T,
        caller: &AccountId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<()> {
        self.lifecycle.ensure_not_paused()?;
        let update = self.deposits.plan_deposit(caller, amount, now)?;
        bank.transfer_in(&Asset::Native, caller, amount)?;
        self.deposits.apply(update);

        log::info!("💰 {} deposited {} at {}", caller, amount, now);
        Ok(())
    }

    pub fn withdraw<T: AssetTransfer + ?Sized>(
        &mut self,
        bank: &mut T,
        caller: &AccountId,
        amount: Amount,
    ) -> Result<()> {
        self.lifecycle.ensure_not_paused()?;
        let update = self.deposits.plan_withdraw(caller, amount)?;
        bank.transfer_out(&Asset::Native, caller, amount)?;
        self.deposits.apply(update);

        log::info!("{} withdrew {}", caller, amount);
        Ok(())
    }

    // ---- submissions ----

    pub fn submit_token<T: AssetTransfer + ?Sized>(
        &mut self,
        bank: &mut T,
        caller: &AccountId,
        token: &TokenKey,
        amount: Amount,
    ) -> Result<()> {
        self.submit(bank, caller, PoolKey::Token(token.clone()), amount)
    }

    pub fn submit_mynt<T: AssetTransfer + ?Sized>(
        &mut self,
        bank: &mut T,
        caller: &AccountId,
        amount: Amount,
    ) -> Result<()> {
        self.submit(bank, caller, PoolKey::Mynt, amount)
    }

    fn submit<T: AssetTransfer + ?Sized>(
        &mut self,
        bank: &mut T,
        caller: &AccountId,
        key: PoolKey,
        amount: Amount,
    ) -> Result<()> {
        self.lifecycle.ensure_initialized()?;
        let update = self.pools.plan_submit(&key, amount)?;
        bank.transfer_in(&key.asset(), caller, amount)?;
        self.pools.apply(update);

        log::info!("📥 {} submitted {} to the {} pool", caller, amount, key);
        Ok(())
    }

    // ---- calibration ----

    /// Pay `user` their share of a token pool; returns the amount paid
    pub fn calibrate_token<T: AssetTransfer + ?Sized>(
        &mut self,
        bank: &mut T,
        user: &AccountId,
        token: &TokenKey,
        now: Timestamp,
    ) -> Result<Amount> {
        self.calibrate(bank, user, PoolKey::Token(token.clone()), now)
    }

    /// Pay `user` their share of the mynt pool; returns the amount paid
    pub fn calibrate_mynt<T: AssetTransfer + ?Sized>(
        &mut self,
        bank: &mut T,
        user: &AccountId,
        now: Timestamp,
    ) -> Result<Amount> {
        self.calibrate(bank, user, PoolKey::Mynt, now)
    }

    fn calibrate<T: AssetTransfer + ?Sized>(
        &mut self,
        bank: &mut T,
        user: &AccountId,
        key: PoolKey,
        now: Timestamp,
    ) -> Result<Amount> {
        let cycle = *self.cycle_clock()?;
        let pool_label = self.pool_label(&key).to_string();

        let amount = DistributionEngine::new(&cycle, &self.deposits, &self.pools)
            .authorize(user, &key, now, &self.base_asset_label, &pool_label)
            .map_err(|err| {
                log::debug!("Calibration of {} for {} rejected: {}", key, user, err);
                err
            })?;
        let update = self
            .pools
            .plan_claim(&key, user, amount, cycle.cycle_index(now), &pool_label)?;
        bank.transfer_out(&key.asset(), user, amount)?;
        self.pools.apply(update);

        log::info!(
            "✅ {} calibrated {} from the {} pool in cycle {}",
            user,
            amount,
            key,
            cycle.cycle_index(now)
        );
        Ok(amount)
    }

    pub fn expected_token_calibration(
        &self,
        user: &AccountId,
        token: &TokenKey,
        now: Timestamp,
    ) -> Result<CalibrationPreview> {
        self.preview(user, &PoolKey::Token(token.clone()), now)
    }

    pub fn expected_mynt_calibration(&self, user: &AccountId, now: Timestamp) -> Result<CalibrationPreview> {
        self.preview(user, &PoolKey::Mynt, now)
    }

    fn preview(&self, user: &AccountId, key: &PoolKey, now: Timestamp) -> Result<CalibrationPreview> {
        let cycle = self.cycle_clock()?;
        DistributionEngine::new(cycle, &self.deposits, &self.pools).preview(
            user,
            key,
            now,
            &self.base_asset_label,
            self.pool_label(key),
        )
    }

    // ---- queries ----

    pub fn user_data(&self, user: &AccountId) -> UserRecord {
        self.deposits.user(user)
    }

    /// False until the ledger is initialized
    pub fn is_calibration_open(&self, now: Timestamp) -> bool {
        self.cycle.map_or(false, |cycle| cycle.is_open(now))
    }

    pub fn cycle_index(&self, now: Timestamp) -> Option<u64> {
        self.cycle.map(|cycle| cycle.cycle_index(now))
    }

    pub fn total_tokens(&self) -> usize {
        self.pools.total_tokens()
    }

    pub fn token_address(&self, index: usize) -> Option<&TokenKey> {
        self.pools.token_at(index)
    }

    /// Nominal amount ever submitted for `token`
    pub fn token_balance(&self, token: &TokenKey) -> Amount {
        self.pools.balance(&PoolKey::Token(token.clone()))
    }

    pub fn mynt_balance(&self) -> Amount {
        self.pools.mynt().total_submitted()
    }

    /// Mynt submitted but not yet paid out
    pub fn mynt_available(&self) -> Amount {
        self.pools.mynt().undistributed()
    }

    pub fn total_deposits(&self) -> Amount {
        self.deposits.total_deposits()
    }

    pub fn owner(&self) -> Option<&AccountId> {
        self.lifecycle.owner()
    }

    pub fn paused(&self) -> bool {
        self.lifecycle.is_paused()
    }

    pub fn is_initialized(&self) -> bool {
        self.lifecycle.is_initialized()
    }

    pub fn deposits(&self) -> &DepositLedger {
        &self.deposits
    }

    pub fn pools(&self) -> &RewardPools {
        &self.pools
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        let tokens = self
            .pools
            .tokens()
            .iter()
            .filter_map(|token| {
                self.pools
                    .get(&PoolKey::Token(token.clone()))
                    .map(|pool| PoolSummary {
                        token: Some(token.clone()),
                        total_submitted: pool.total_submitted(),
                        total_distributed: pool.total_distributed(),
                    })
            })
            .collect();
        let mynt = self.pools.mynt();

        LedgerSnapshot {
            initialized: self.lifecycle.is_initialized(),
            owner: self.lifecycle.owner().cloned(),
            paused: self.lifecycle.is_paused(),
            cycle_period: self.cycle.map(|cycle| cycle.cycle_period()),
            cycle_length: self.cycle.map(|cycle| cycle.cycle_length()),
            total_deposits: self.deposits.total_deposits(),
            users: self
                .deposits
                .users()
                .map(|(user, record)| (user.clone(), *record))
                .collect(),
            tokens,
            mynt: PoolSummary {
                token: None,
                total_submitted: mynt.total_submitted(),
                total_distributed: mynt.total_distributed(),
            },
        }
    }

    fn cycle_clock(&self) -> Result<&CycleClock> {
        self.cycle.as_ref().ok_or(LedgerError::NotInitialized)
    }

    fn pool_label(&self, key: &PoolKey) -> &str {
        match key {
            PoolKey::Mynt => &self.base_asset_label,
            PoolKey::Token(_) => &self.token_asset_label,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSummary {
    /// `None` for the mynt pool
    pub token: Option<TokenKey>,
    pub total_submitted: Amount,
    pub total_distributed: Amount,
}

/// Point-in-time copy of the whole ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub initialized: bool,
    pub owner: Option<AccountId>,
    pub paused: bool,
    pub cycle_period: Option<Timestamp>,
    pub cycle_length: Option<Timestamp>,
    pub total_deposits: Amount,
    pub users: BTreeMap<AccountId, UserRecord>,
    pub tokens: Vec<PoolSummary>,
    pub mynt: PoolSummary,
}

impl LedgerSnapshot {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| LedgerError::SerializationError(e.to_string()))
    }
}
