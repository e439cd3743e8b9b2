use anchor_lang::prelude::*;

use crate::{
    config::{ConfigChange, ConfigKey, ConfigUpdate, VaultParams},
    constants::{BPS_DENOMINATOR, SCALE},
    errors::VaultError,
    math::{mul_div_down, mul_div_up, to_u64},
};

/// Global vault state: share supply, liquid buffer and configuration
///
/// Security considerations:
/// - Authority stored in state (not instruction args)
/// - Total assets are never stored; they are `buffer` plus router assets
/// - Bumps stored for efficient PDA signing
#[account]
#[derive(InitSpace, Default, Debug, PartialEq)]
pub struct VaultState {
    /// Owner: configures the vault, manages strategies, rebalances
    pub authority: Pubkey,

    /// Mint of the underlying asset token
    pub asset_mint: Pubkey,

    /// Strategy router serving this vault
    pub router: Pubkey,

    /// Base units held directly by the vault
    pub buffer: u64,

    /// Total shares issued to holders
    pub total_shares: u64,

    pub buffer_target_bps: u16,

    pub per_tx_cap: u64,

    pub tvl_cap: u64,

    pub performance_fee_bps: u16,

    pub fee_recipient: Pubkey,

    pub epoch_duration: i64,

    /// Highest price-per-share seen at a crystallization, `SCALE`-based
    pub high_water_mark: u128,

    pub last_epoch_ts: i64,

    /// Halts deposit/withdraw/allocate; fee crystallization still runs
    pub paused: bool,

    /// Bump seed for vault state PDA
    pub bump: u8,

    /// Bump seed for vault authority PDA
    pub authority_bump: u8,
}

impl VaultState {
    /// Copy validated parameters into a fresh vault
    pub fn configure(&mut self, params: &VaultParams, now: i64) -> Result<()> {
        params.validate()?;
        self.buffer_target_bps = params.buffer_target_bps;
        self.per_tx_cap = params.per_tx_cap;
        self.tvl_cap = params.tvl_cap;
        self.performance_fee_bps = params.performance_fee_bps;
        self.epoch_duration = params.epoch_duration;
        self.fee_recipient = params.fee_recipient;
        self.high_water_mark = SCALE;
        self.last_epoch_ts = now;
        self.paused = false;
        Ok(())
    }

    pub fn require_operational(&self) -> Result<()> {
        require!(!self.paused, VaultError::Paused);
        Ok(())
    }

    pub fn total_assets(&self, router_assets: u64) -> Result<u64> {
        self.buffer
            .checked_add(router_assets)
            .ok_or_else(|| error!(VaultError::MathOverflow))
    }

    /// ERC-4626 `convertToShares`, rounding down
    ///
    /// - Empty vault: shares = assets
    /// - Otherwise: shares = assets * totalShares / totalAssets
    pub fn convert_to_shares(&self, assets: u64, total_assets: u64) -> Result<u64> {
        if self.total_shares == 0 {
            return Ok(assets);
        }
        to_u64(mul_div_down(
            assets as u128,
            self.total_shares as u128,
            total_assets as u128,
        )?)
    }

    /// `convertToShares`, rounding up. Shares burned for a withdrawal.
    pub fn convert_to_shares_up(&self, assets: u64, total_assets: u64) -> Result<u64> {
        if self.total_shares == 0 {
            return Ok(assets);
        }
        to_u64(mul_div_up(
            assets as u128,
            self.total_shares as u128,
            total_assets as u128,
        )?)
    }

    /// ERC-4626 `convertToAssets`, rounding down
    pub fn convert_to_assets(&self, shares: u64, total_assets: u64) -> Result<u64> {
        if self.total_shares == 0 {
            return Ok(0);
        }
        to_u64(mul_div_down(
            shares as u128,
            total_assets as u128,
            self.total_shares as u128,
        )?)
    }

    /// `convertToAssets`, rounding up. Assets owed for a mint.
    pub fn convert_to_assets_up(&self, shares: u64, total_assets: u64) -> Result<u64> {
        if self.total_shares == 0 {
            return Ok(shares);
        }
        to_u64(mul_div_up(
            shares as u128,
            total_assets as u128,
            self.total_shares as u128,
        )?)
    }

    pub fn price_per_share(&self, total_assets: u64) -> Result<u128> {
        if self.total_shares == 0 {
            return Ok(SCALE);
        }
        mul_div_down(total_assets as u128, SCALE, self.total_shares as u128)
    }

    pub fn max_deposit(&self, total_assets: u64) -> u64 {
        self.tvl_cap.saturating_sub(total_assets).min(self.per_tx_cap)
    }

    pub fn max_mint(&self, total_assets: u64) -> Result<u64> {
        self.convert_to_shares(self.max_deposit(total_assets), total_assets)
    }

    /// Share value not committed to any strategy allocation
    pub fn unallocated(&self, shares: u64, allocated: u64, total_assets: u64) -> Result<u64> {
        Ok(self
            .convert_to_assets(shares, total_assets)?
            .saturating_sub(allocated))
    }

    /// `min(share value, unallocated, buffer, perTxCap)`
    pub fn max_withdraw(&self, shares: u64, allocated: u64, total_assets: u64) -> Result<u64> {
        let unallocated = self.unallocated(shares, allocated, total_assets)?;
        Ok(unallocated.min(self.buffer).min(self.per_tx_cap))
    }

    pub fn max_redeem(&self, shares: u64, allocated: u64, total_assets: u64) -> Result<u64> {
        let unallocated = self.unallocated(shares, allocated, total_assets)?;
        let limit = unallocated.min(self.per_tx_cap);
        Ok(self.convert_to_shares(limit, total_assets)?.min(shares))
    }

    pub fn target_buffer(&self, total_assets: u64) -> Result<u64> {
        to_u64(mul_div_down(
            total_assets as u128,
            self.buffer_target_bps as u128,
            BPS_DENOMINATOR as u128,
        )?)
    }

    /// Buffer above target, left in place until an explicit `allocate`
    pub fn buffer_surplus(&self, total_assets: u64) -> Result<u64> {
        Ok(self.buffer.saturating_sub(self.target_buffer(total_assets)?))
    }

    /// Apply an owner-only configuration change
    pub fn apply_config(&mut self, update: ConfigUpdate) -> Result<ConfigChange> {
        update.validate()?;
        let value = |key, old: i128, new: i128| ConfigChange::Value {
            key,
            old_value: old,
            new_value: new,
        };
        let change = match update {
            ConfigUpdate::BufferTargetBps(bps) => {
                let old = std::mem::replace(&mut self.buffer_target_bps, bps);
                value(ConfigKey::BufferTargetBps, old as i128, bps as i128)
            }
            ConfigUpdate::PerformanceFeeBps(bps) => {
                let old = std::mem::replace(&mut self.performance_fee_bps, bps);
                value(ConfigKey::PerformanceFeeBps, old as i128, bps as i128)
            }
            ConfigUpdate::FeeRecipient(recipient) => ConfigChange::FeeRecipient {
                old: std::mem::replace(&mut self.fee_recipient, recipient),
                new: recipient,
            },
            ConfigUpdate::TvlCap(cap) => {
                let old = std::mem::replace(&mut self.tvl_cap, cap);
                value(ConfigKey::TvlCap, old as i128, cap as i128)
            }
            ConfigUpdate::PerTxCap(cap) => {
                let old = std::mem::replace(&mut self.per_tx_cap, cap);
                value(ConfigKey::PerTxCap, old as i128, cap as i128)
            }
            ConfigUpdate::EpochDuration(duration) => {
                let old = std::mem::replace(&mut self.epoch_duration, duration);
                value(ConfigKey::EpochDuration, old as i128, duration as i128)
            }
            ConfigUpdate::Paused(paused) => {
                let old = std::mem::replace(&mut self.paused, paused);
                value(ConfigKey::Paused, old as i128, paused as i128)
            }
        };
        Ok(change)
    }
}
