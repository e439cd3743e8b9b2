use anchor_lang::prelude::*;

use crate::{
    constants::{BPS_DENOMINATOR, SCALE, YEAR_SECONDS},
    errors::VaultError,
    math::{mul_div_down, to_u64},
};

/// Capital sink the router can route base assets into
///
/// `total_assets` is a side-effect-free projection; `deposit` and
/// `withdraw` checkpoint accrued yield before moving principal.
pub trait YieldStrategy: Clone {
    fn total_assets(&self, now: i64) -> Result<u64>;

    fn is_paused(&self) -> bool;

    /// Returns the principal after the deposit
    fn deposit(&mut self, amount: u64, now: i64) -> Result<u64>;

    fn withdraw(&mut self, amount: u64, now: i64) -> Result<StrategyWithdrawal>;
}

/// What a strategy handed back for a withdrawal request
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StrategyWithdrawal {
    /// Base units actually released
    pub received: u64,
    /// Principal-equivalent reduction booked by the strategy
    pub principal_reduction: u64,
}

/// Reference strategy: simple (non-compounding) interest at a fixed APR
///
/// Yield is a pure function of elapsed time since `last_accrual_ts`; there is
/// no scheduler. Reads project it, mutations checkpoint it into `principal`.
#[account]
#[derive(InitSpace, Default, Debug, PartialEq)]
pub struct StrategyState {
    /// May report, pause and change parameters
    pub owner: Pubkey,

    /// Router allowed to move capital in and out
    pub router: Pubkey,

    pub asset_mint: Pubkey,

    /// Token account holding the deployed capital
    pub token_account: Pubkey,

    pub id: u8,

    /// Base units invested, excluding unrealized yield
    pub principal: u64,

    /// Yield index, `SCALE` at rest
    pub accumulator: u128,

    pub last_accrual_ts: i64,

    pub apr_bps: u16,

    pub cap: u64,

    pub paused: bool,

    /// Bump seed for the state PDA, which also signs for `token_account`
    pub bump: u8,
}

impl StrategyState {
    /// Accumulator value at `now` without touching storage
    pub fn current_accumulator(&self, now: i64) -> Result<u128> {
        let elapsed = now.saturating_sub(self.last_accrual_ts).max(0) as u128;
        if self.apr_bps == 0 || elapsed == 0 {
            return Ok(self.accumulator);
        }
        let growth = mul_div_down(
            SCALE,
            (self.apr_bps as u128)
                .checked_mul(elapsed)
                .ok_or(VaultError::MathOverflow)?,
            BPS_DENOMINATOR as u128 * YEAR_SECONDS as u128,
        )?;
        self.accumulator
            .checked_add(growth)
            .ok_or_else(|| error!(VaultError::MathOverflow))
    }

    /// Checkpoint accrued yield into principal. Returns the yield realized.
    pub fn accrue(&mut self, now: i64) -> Result<u64> {
        let total = YieldStrategy::total_assets(self, now)?;
        let accrued = total.saturating_sub(self.principal);
        self.principal = total;
        self.accumulator = SCALE;
        self.last_accrual_ts = now;
        Ok(accrued)
    }

    /// Owner-only: realize accrued yield into principal
    pub fn report(&mut self, now: i64) -> Result<u64> {
        require!(self.principal > 0, VaultError::InsufficientBalance);
        require!(self.apr_bps > 0, VaultError::InsufficientBalance);
        require!(
            self.current_accumulator(now)? != SCALE,
            VaultError::InsufficientBalance
        );
        self.accrue(now)
    }

    /// Owner-only: new rate and cap apply from `now` on. History accrues at
    /// the old rate first.
    pub fn set_params(&mut self, apr_bps: u16, cap: u64, now: i64) -> Result<()> {
        self.accrue(now)?;
        self.apr_bps = apr_bps;
        self.cap = cap;
        Ok(())
    }

    /// Owner-only pause switch. Accrual keeps running while paused.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }
}

impl YieldStrategy for StrategyState {
    fn total_assets(&self, now: i64) -> Result<u64> {
        let accumulator = self.current_accumulator(now)?;
        if accumulator == SCALE {
            return Ok(self.principal);
        }
        to_u64(mul_div_down(self.principal as u128, accumulator, SCALE)?)
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn deposit(&mut self, amount: u64, now: i64) -> Result<u64> {
        require!(!self.paused, VaultError::StrategyPaused);
        require!(amount > 0, VaultError::InvalidAmount);

        let accrued_principal = YieldStrategy::total_assets(self, now)?;
        let new_principal = accrued_principal
            .checked_add(amount)
            .ok_or(VaultError::MathOverflow)?;
        require!(new_principal <= self.cap, VaultError::StrategyCapExceeded);

        self.accrue(now)?;
        self.principal = new_principal;
        Ok(new_principal)
    }

    fn withdraw(&mut self, amount: u64, now: i64) -> Result<StrategyWithdrawal> {
        require!(amount > 0, VaultError::InvalidAmount);
        require!(
            amount <= YieldStrategy::total_assets(self, now)?,
            VaultError::InsufficientBalance
        );

        self.accrue(now)?;
        let principal_reduction =
            to_u64(mul_div_down(amount as u128, SCALE, self.accumulator)?)?;
        self.principal = self
            .principal
            .checked_sub(principal_reduction)
            .ok_or(VaultError::InsufficientBalance)?;

        Ok(StrategyWithdrawal {
            received: amount,
            principal_reduction,
        })
    }
}
