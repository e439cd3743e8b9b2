use anchor_lang::prelude::*;

use crate::{
    constants::MAX_STRATEGIES,
    errors::VaultError,
    math::{mul_div_down, to_u64},
};

/// Capital a supplier placed in strategies directly through the router
///
/// Outside the vault share ledger. `units` are the supplier's claim on each
/// strategy slot, so yield on the supplied capital stays with the supplier.
#[account]
#[derive(InitSpace, Default, Debug, PartialEq)]
pub struct DirectPosition {
    pub router: Pubkey,

    pub user: Pubkey,

    /// Claim units held in each strategy slot
    pub units: [u64; MAX_STRATEGIES],

    /// Principal supplied per strategy, released in step with `units`
    pub principal: [u64; MAX_STRATEGIES],

    pub bump: u8,
}

impl DirectPosition {
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

    pub fn strategy_units(&self, id: u8) -> u64 {
        self.units.get(id as usize).copied().unwrap_or(0)
    }

    pub fn strategy_principal(&self, id: u8) -> u64 {
        self.principal.get(id as usize).copied().unwrap_or(0)
    }

    /// Credit `units` bought with `amount` under `id`. Nothing is written on
    /// overflow.
    pub fn record(&mut self, id: u8, units: u64, amount: u64) -> Result<()> {
        let index = id as usize;
        require!(index < MAX_STRATEGIES, VaultError::InvalidStrategyId);
        let held = self.units[index]
            .checked_add(units)
            .ok_or(VaultError::MathOverflow)?;
        let principal = self.principal[index]
            .checked_add(amount)
            .ok_or(VaultError::MathOverflow)?;

        self.units[index] = held;
        self.principal[index] = principal;
        Ok(())
    }

    /// Burn `units` under `id` and release the matching share of principal.
    /// Returns the principal released.
    pub fn release(&mut self, id: u8, units: u64) -> Result<u64> {
        let index = id as usize;
        require!(index < MAX_STRATEGIES, VaultError::InvalidStrategyId);
        let held = self.units[index];
        require!(units <= held, VaultError::AllocationExceeded);

        let principal = self.principal[index];
        let released = if units == held {
            principal
        } else {
            to_u64(mul_div_down(
                principal as u128,
                units as u128,
                held as u128,
            )?)?
        };

        self.units[index] = held - units;
        self.principal[index] = principal - released;
        Ok(released)
    }
}
