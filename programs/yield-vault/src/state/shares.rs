use anchor_lang::prelude::*;

use crate::errors::VaultError;

/// Share balance of one holder
///
/// Shares live in program accounts rather than an SPL mint so every
/// movement passes the allocation-backed transfer check.
#[account]
#[derive(InitSpace, Default, Debug, PartialEq)]
pub struct ShareAccount {
    pub vault: Pubkey,

    pub holder: Pubkey,

    pub shares: u64,

    pub bump: u8,
}

impl ShareAccount {
    /// Stamp a record freshly created by `init_if_needed`
    pub fn open(&mut self, vault: Pubkey, holder: Pubkey, bump: u8) {
        if self.holder == Pubkey::default() {
            self.vault = vault;
            self.holder = holder;
            self.bump = bump;
        }
    }

    pub fn credit(&mut self, shares: u64) -> Result<()> {
        self.shares = self
            .shares
            .checked_add(shares)
            .ok_or(VaultError::MathOverflow)?;
        Ok(())
    }

    pub fn debit(&mut self, shares: u64) -> Result<()> {
        self.shares = self
            .shares
            .checked_sub(shares)
            .ok_or(VaultError::InsufficientShares)?;
        Ok(())
    }
}

/// Shares `spender` may move out of `owner`'s balance
#[account]
#[derive(InitSpace, Default, Debug, PartialEq)]
pub struct ShareAllowance {
    pub vault: Pubkey,

    pub owner: Pubkey,

    pub spender: Pubkey,

    pub amount: u64,

    pub bump: u8,
}

impl ShareAllowance {
    pub fn open(&mut self, vault: Pubkey, owner: Pubkey, spender: Pubkey, bump: u8) {
        if self.owner == Pubkey::default() {
            self.vault = vault;
            self.owner = owner;
            self.spender = spender;
            self.bump = bump;
        }
    }

    pub fn require_covers(&self, owner: &Pubkey, spender: &Pubkey, shares: u64) -> Result<()> {
        require_keys_eq!(self.owner, *owner, VaultError::InsufficientAllowance);
        require_keys_eq!(self.spender, *spender, VaultError::InsufficientAllowance);
        require!(self.amount >= shares, VaultError::InsufficientAllowance);
        Ok(())
    }

    pub fn spend(&mut self, shares: u64) -> Result<()> {
        self.amount = self
            .amount
            .checked_sub(shares)
            .ok_or(VaultError::InsufficientAllowance)?;
        Ok(())
    }
}
