//! Asset movement between callers and the ledger's holdings

use std::collections::HashMap;

use crate::error::TransferError;
use crate::types::{AccountId, Amount, Asset};

/// Moves assets in and out of the ledger's holdings.
///
/// Implementations must either move the full amount or fail without effect.
pub trait AssetTransfer: Send + Sync {
    /// Pull `amount` of `asset` from `from` into the ledger
    fn transfer_in(&mut self, asset: &Asset, from: &AccountId, amount: Amount) -> Result<(), TransferError>;

    /// Push `amount` of `asset` from the ledger to `to`
    fn transfer_out(&mut self, asset: &Asset, to: &AccountId, amount: Amount) -> Result<(), TransferError>;
}

/// In-memory balances keyed by asset and account, with one escrow account
/// standing for the ledger itself
#[derive(Debug, Clone)]
pub struct InMemoryBank {
    escrow: AccountId,
    balances: HashMap<Asset, HashMap<AccountId, Amount>>,
}

impl InMemoryBank {
    pub fn new(escrow: AccountId) -> Self {
        Self {
            escrow,
            balances: HashMap::new(),
        }
    }

    pub fn escrow(&self) -> &AccountId {
        &self.escrow
    }

    /// Create `amount` of `asset` out of thin air for `to`
    pub fn mint(&mut self, asset: &Asset, to: &AccountId, amount: Amount) {
        let balance = self
            .balances
            .entry(asset.clone())
            .or_default()
            .entry(to.clone())
            .or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    pub fn balance_of(&self, asset: &Asset, account: &AccountId) -> Amount {
        self.balances
            .get(asset)
            .and_then(|accounts| accounts.get(account))
            .copied()
            .unwrap_or(0)
    }

    /// What the ledger currently holds of `asset`
    pub fn holdings(&self, asset: &Asset) -> Amount {
        self.balance_of(asset, &self.escrow)
    }

    fn move_funds(
        &mut self,
        asset: &Asset,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), TransferError> {
        let available = self.balance_of(asset, from);
        if available < amount {
            return Err(TransferError::InsufficientFunds {
                asset: asset.clone(),
                requested: amount,
                available,
            });
        }
        if from == to {
            return Ok(());
        }
        let received = self
            .balance_of(asset, to)
            .checked_add(amount)
            .ok_or_else(|| TransferError::Rejected(format!("{} balance overflow for {}", asset, to)))?;

        let accounts = self.balances.entry(asset.clone()).or_default();
        accounts.insert(from.clone(), available - amount);
        accounts.insert(to.clone(), received);
        Ok(())
    }
}

impl AssetTransfer for InMemoryBank {
    fn transfer_in(&mut self, asset: &Asset, from: &AccountId, amount: Amount) -> Result<(), TransferError> {
        let escrow = self.escrow.clone();
        self.move_funds(asset, from, &escrow, amount)
    }

    fn transfer_out(&mut self, asset: &Asset, to: &AccountId, amount: Amount) -> Result<(), TransferError> {
        let escrow = self.escrow.clone();
        self.move_funds(asset, &escrow, to, amount)
    }
}
