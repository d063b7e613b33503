//! Ownership, pause gate and one-time initialization

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};
use crate::types::AccountId;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lifecycle {
    initialized: bool,
    owner: Option<AccountId>,
    paused: bool,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn owner(&self) -> Option<&AccountId> {
        self.owner.as_ref()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn ensure_uninitialized(&self) -> Result<()> {
        if self.initialized {
            return Err(LedgerError::AlreadyInitialized);
        }
        Ok(())
    }

    pub fn ensure_initialized(&self) -> Result<()> {
        if !self.initialized {
            return Err(LedgerError::NotInitialized);
        }
        Ok(())
    }

    pub fn ensure_not_paused(&self) -> Result<()> {
        self.ensure_initialized()?;
        if self.paused {
            return Err(LedgerError::Paused);
        }
        Ok(())
    }

    pub fn ensure_owner(&self, caller: &AccountId) -> Result<()> {
        self.ensure_initialized()?;
        if self.owner.as_ref() != Some(caller) {
            return Err(LedgerError::NotOwner);
        }
        Ok(())
    }

    /// Flip to initialized with `caller` as owner; callable once ever
    pub fn initialize(&mut self, caller: &AccountId) -> Result<()> {
        self.ensure_uninitialized()?;
        self.initialized = true;
        self.owner = Some(caller.clone());
        Ok(())
    }

    pub fn pause(&mut self, caller: &AccountId) -> Result<()> {
        self.ensure_owner(caller)?;
        if self.paused {
            return Err(LedgerError::Paused);
        }
        self.paused = true;
        Ok(())
    }

    pub fn unpause(&mut self, caller: &AccountId) -> Result<()> {
        self.ensure_owner(caller)?;
        if !self.paused {
            return Err(LedgerError::NotPaused);
        }
        self.paused = false;
        Ok(())
    }

    pub fn transfer_ownership(&mut self, caller: &AccountId, new_owner: AccountId) -> Result<()> {
        self.ensure_owner(caller)?;
        self.owner = Some(new_owner);
        Ok(())
    }
}
