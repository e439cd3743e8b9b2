use anchor_lang::prelude::*;

use crate::{constants::MAX_STRATEGIES, errors::VaultError};

/// Principal a single user has committed to each strategy
///
/// Kept apart from the share ledger on purpose: unallocated value is always
/// derived as `share value - total`, never stored.
#[account]
#[derive(InitSpace, Default, Debug, PartialEq)]
pub struct UserAllocation {
    pub router: Pubkey,

    pub user: Pubkey,

    /// Principal recorded at allocation time, not re-priced for yield
    pub per_strategy: [u64; MAX_STRATEGIES],

    /// Cached sum of `per_strategy`
    pub total: u64,

    pub bump: u8,
}

impl UserAllocation {
    pub fn new(router: Pubkey, user: Pubkey) -> Self {
        Self {
            router,
            user,
            ..Default::default()
        }
    }

    /// Stamp a record freshly created by `init_if_needed`
    pub fn open(&mut self, router: Pubkey, user: Pubkey, bump: u8) {
        if self.user == Pubkey::default() {
            self.router = router;
            self.user = user;
            self.bump = bump;
        }
    }

    pub fn strategy_allocation(&self, id: u8) -> u64 {
        self.per_strategy.get(id as usize).copied().unwrap_or(0)
    }

    /// Add principal under `id`. Nothing is written on overflow.
    pub fn record(&mut self, id: u8, amount: u64) -> Result<()> {
        let slot = self
            .per_strategy
            .get(id as usize)
            .copied()
            .ok_or(VaultError::InvalidStrategyId)?;
        let per_strategy = slot.checked_add(amount).ok_or(VaultError::MathOverflow)?;
        let total = self
            .total
            .checked_add(amount)
            .ok_or(VaultError::MathOverflow)?;

        self.per_strategy[id as usize] = per_strategy;
        self.total = total;
        Ok(())
    }

    /// Remove up to `amount` of principal under `id`, never going below zero.
    /// Returns what was actually released.
    pub fn release(&mut self, id: u8, amount: u64) -> u64 {
        let Some(recorded) = self.per_strategy.get_mut(id as usize) else {
            return 0;
        };
        let released = amount.min(*recorded);
        *recorded -= released;
        self.total = self.total.saturating_sub(released);
        released
    }
}
