//! Shared, serialized access to a ledger and its transfer backend
//!
//! The ledger and the backend sit behind one lock. Mutations hold the write
//! guard across validation, transfer and commit; queries share the read
//! guard and always see a fully applied state. The clock is read only once
//! the guard is held, so timestamps follow lock order.

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::clock::Clock;
use crate::config::LedgerConfig;
use crate::deposits::UserRecord;
use crate::distribution::CalibrationPreview;
use crate::error::Result;
use crate::ledger::{Ledger, LedgerSnapshot};
use crate::transfer::AssetTransfer;
use crate::types::{AccountId, Amount, Timestamp, TokenKey};

struct LedgerState<T> {
    ledger: Ledger,
    bank: T,
}

pub struct SharedLedger<T, C> {
    state: Arc<RwLock<LedgerState<T>>>,
    clock: C,
}

impl<T, C: Clone> Clone for SharedLedger<T, C> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            clock: self.clock.clone(),
        }
    }
}

impl<T: AssetTransfer, C: Clock> SharedLedger<T, C> {
    pub fn new(ledger: Ledger, bank: T, clock: C) -> Self {
        Self {
            state: Arc::new(RwLock::new(LedgerState { ledger, bank })),
            clock,
        }
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub async fn initialize(
        &self,
        caller: &AccountId,
        cycle_period: Timestamp,
        cycle_length: Timestamp,
        bond_amount: Amount,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        let now = self.clock.now();
        let LedgerState { ledger, bank } = &mut *state;
        ledger.initialize(bank, caller, cycle_period, cycle_length, bond_amount, now)
    }

    pub async fn initialize_with_config(&self, caller: &AccountId, config: &LedgerConfig) -> Result<()> {
        let mut state = self.state.write().await;
        let now = self.clock.now();
        let LedgerState { ledger, bank } = &mut *state;
        ledger.initialize_with_config(bank, caller, config, now)
    }

    pub async fn deposit(&self, caller: &AccountId, amount: Amount) -> Result<()> {
        let mut state = self.state.write().await;
        let now = self.clock.now();
        let LedgerState { ledger, bank } = &mut *state;
        ledger.deposit(bank, caller, amount, now)
    }

    pub async fn withdraw(&self, caller: &AccountId, amount: Amount) -> Result<()> {
        let mut state = self.state.write().await;
        let LedgerState { ledger, bank } = &mut *state;
        ledger.withdraw(bank, caller, amount)
    }

    pub async fn submit_token(&self, caller: &AccountId, token: &TokenKey, amount: Amount) -> Result<()> {
        let mut state = self.state.write().await;
        let LedgerState { ledger, bank } = &mut *state;
        ledger.submit_token(bank, caller, token, amount)
    }

    pub async fn submit_mynt(&self, caller: &AccountId, amount: Amount) -> Result<()> {
        let mut state = self.state.write().await;
        let LedgerState { ledger, bank } = &mut *state;
        ledger.submit_mynt(bank, caller, amount)
    }

    pub async fn calibrate_token(&self, user: &AccountId, token: &TokenKey) -> Result<Amount> {
        let mut state = self.state.write().await;
        let now = self.clock.now();
        let LedgerState { ledger, bank } = &mut *state;
        ledger.calibrate_token(bank, user, token, now)
    }

    pub async fn calibrate_mynt(&self, user: &AccountId) -> Result<Amount> {
        let mut state = self.state.write().await;
        let now = self.clock.now();
        let LedgerState { ledger, bank } = &mut *state;
        ledger.calibrate_mynt(bank, user, now)
    }

    pub async fn pause(&self, caller: &AccountId) -> Result<()> {
        self.state.write().await.ledger.pause(caller)
    }

    pub async fn unpause(&self, caller: &AccountId) -> Result<()> {
        self.state.write().await.ledger.unpause(caller)
    }

    pub async fn transfer_ownership(&self, caller: &AccountId, new_owner: AccountId) -> Result<()> {
        self.state
            .write()
            .await
            .ledger
            .transfer_ownership(caller, new_owner)
    }

    pub async fn get_user_data(&self, user: &AccountId) -> UserRecord {
        self.state.read().await.ledger.user_data(user)
    }

    pub async fn expected_token_calibration(
        &self,
        user: &AccountId,
        token: &TokenKey,
    ) -> Result<CalibrationPreview> {
        let state = self.state.read().await;
        state
            .ledger
            .expected_token_calibration(user, token, self.clock.now())
    }

    pub async fn expected_mynt_calibration(&self, user: &AccountId) -> Result<CalibrationPreview> {
        let state = self.state.read().await;
        state.ledger.expected_mynt_calibration(user, self.clock.now())
    }

    pub async fn is_calibration_open(&self) -> bool {
        let state = self.state.read().await;
        state.ledger.is_calibration_open(self.clock.now())
    }

    pub async fn total_tokens(&self) -> usize {
        self.state.read().await.ledger.total_tokens()
    }

    pub async fn token_address(&self, index: usize) -> Option<TokenKey> {
        self.state.read().await.ledger.token_address(index).cloned()
    }

    pub async fn token_balance(&self, token: &TokenKey) -> Amount {
        self.state.read().await.ledger.token_balance(token)
    }

    pub async fn paused(&self) -> bool {
        self.state.read().await.ledger.paused()
    }

    pub async fn owner(&self) -> Option<AccountId> {
        self.state.read().await.ledger.owner().cloned()
    }

    pub async fn snapshot(&self) -> LedgerSnapshot {
        self.state.read().await.ledger.snapshot()
    }

    /// Run `f` against a consistent view of the ledger and its backend
    pub async fn inspect<R>(&self, f: impl FnOnce(&Ledger, &T) -> R) -> R {
        let state = self.state.read().await;
        f(&state.ledger, &state.bank)
    }

    /// Run `f` with exclusive access to the backend, e.g. to fund accounts
    pub async fn with_bank<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut state = self.state.write().await;
        f(&mut state.bank)
    }
}
