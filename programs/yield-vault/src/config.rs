use anchor_lang::prelude::*;

use crate::{errors::VaultError, math::require_bps};

/// Parameters read once by `initialize_vault`
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq)]
pub struct VaultParams {
    /// Share of total assets the vault aims to keep liquid
    pub buffer_target_bps: u16,
    /// Largest single deposit or withdrawal, in base units
    pub per_tx_cap: u64,
    /// Ceiling on total assets under management
    pub tvl_cap: u64,
    /// Fee taken on gains above the high-water mark
    pub performance_fee_bps: u16,
    /// Minimum seconds between fee crystallizations
    pub epoch_duration: i64,
    /// Holder credited with fee shares
    pub fee_recipient: Pubkey,
}

impl VaultParams {
    pub fn validate(&self) -> Result<()> {
        require_bps(self.buffer_target_bps)?;
        require_bps(self.performance_fee_bps)?;
        require!(self.epoch_duration > 0, VaultError::InvalidEpochDuration);
        require!(
            self.fee_recipient != Pubkey::default(),
            VaultError::ZeroAddress
        );
        Ok(())
    }
}

/// Owner-only runtime configuration change, one variant per setter
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq)]
pub enum ConfigUpdate {
    BufferTargetBps(u16),
    PerformanceFeeBps(u16),
    FeeRecipient(Pubkey),
    TvlCap(u64),
    PerTxCap(u64),
    EpochDuration(i64),
    Paused(bool),
}

/// Identifies which parameter a `ConfigChanged` event refers to
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigKey {
    BufferTargetBps,
    PerformanceFeeBps,
    FeeRecipient,
    TvlCap,
    PerTxCap,
    EpochDuration,
    Paused,
}

/// Old and new value of an applied update
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConfigChange {
    Value { key: ConfigKey, old_value: i128, new_value: i128 },
    FeeRecipient { old: Pubkey, new: Pubkey },
}

impl ConfigUpdate {
    pub fn validate(&self) -> Result<()> {
        match *self {
            ConfigUpdate::BufferTargetBps(bps) | ConfigUpdate::PerformanceFeeBps(bps) => {
                require_bps(bps)
            }
            ConfigUpdate::FeeRecipient(recipient) => {
                require!(recipient != Pubkey::default(), VaultError::ZeroAddress);
                Ok(())
            }
            ConfigUpdate::EpochDuration(duration) => {
                require!(duration > 0, VaultError::InvalidEpochDuration);
                Ok(())
            }
            ConfigUpdate::TvlCap(_) | ConfigUpdate::PerTxCap(_) | ConfigUpdate::Paused(_) => Ok(()),
        }
    }
}
