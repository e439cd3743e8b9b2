use anchor_lang::prelude::*;

use crate::{
    constants::MAX_STRATEGIES,
    errors::VaultError,
    math::{exceeds_slippage, mul_div_down, mul_div_up, require_bps, to_u64},
    state::{DirectPosition, StrategyWithdrawal, UserAllocation, YieldStrategy},
};

/// Registry entry for one strategy id
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, InitSpace)]
pub struct StrategySlot {
    /// Presence flag; an unregistered slot is all zeroes
    pub registered: bool,

    /// Strategy state account
    pub address: Pubkey,

    pub active: bool,

    /// Router-level ceiling on `allocated`
    pub cap: u64,

    /// Principal routed into the strategy: vault-level, vault holders and
    /// direct suppliers combined
    pub allocated: u64,

    /// Portion of `allocated` placed by the vault's own rebalancing
    pub vault_allocated: u64,

    /// Portion of `allocated` supplied directly through the router
    pub direct_allocated: u64,

    /// Claim units outstanding against the strategy's assets
    pub units: u64,

    /// Portion of `units` held by direct suppliers
    pub direct_units: u64,
}

impl StrategySlot {
    /// Principal attributed to individual vault holders
    pub fn user_allocated(&self) -> u64 {
        self.allocated
            .saturating_sub(self.vault_allocated)
            .saturating_sub(self.direct_allocated)
    }

    pub fn vault_units(&self) -> u64 {
        self.units.saturating_sub(self.direct_units)
    }

    /// Assets owed to direct suppliers out of `assets`, rounded up
    pub fn direct_value(&self, assets: u64) -> Result<u64> {
        if self.units == 0 {
            return Ok(0);
        }
        to_u64(mul_div_up(
            assets as u128,
            self.direct_units as u128,
            self.units as u128,
        )?)
        .map(|value| value.min(assets))
    }

    /// Assets belonging to the vault out of `assets`
    pub fn vault_value(&self, assets: u64) -> Result<u64> {
        Ok(assets - self.direct_value(assets)?)
    }

    /// Value of `units` held by one direct supplier, rounded down
    pub fn units_value(&self, units: u64, assets: u64) -> Result<u64> {
        if self.units == 0 {
            return Ok(0);
        }
        to_u64(mul_div_down(
            units as u128,
            assets as u128,
            self.units as u128,
        )?)
    }

    fn units_for_deposit(&self, amount: u64, assets: u64) -> Result<u64> {
        if self.units == 0 || assets == 0 {
            return Ok(amount);
        }
        to_u64(mul_div_down(
            amount as u128,
            self.units as u128,
            assets as u128,
        )?)
    }

    fn units_for_withdrawal(&self, amount: u64, assets: u64) -> Result<u64> {
        if amount >= assets {
            return Ok(self.units);
        }
        to_u64(mul_div_up(
            amount as u128,
            self.units as u128,
            assets as u128,
        )?)
    }
}

/// Whose capital a router movement belongs to
pub enum Beneficiary<'r> {
    /// The vault's own rebalancing position
    Vault,
    /// A vault holder committing part of their share value
    Holder(&'r mut UserAllocation),
    /// A supplier outside the vault share ledger
    Direct(&'r mut DirectPosition),
}

/// Strategy registry and capital router for one vault
///
/// Architecture: dense arena indexed by strategy id
/// - Each slot carries its own presence flag instead of a null-address sentinel
/// - Registered strategies are always handled in ascending id order
/// - Slot claim units split each strategy between the vault and direct suppliers
#[account]
#[derive(InitSpace, Default, Debug, PartialEq)]
pub struct StrategyRouter {
    /// Vault this router serves
    pub vault: Pubkey,

    /// Same authority as the vault
    pub authority: Pubkey,

    pub slots: [StrategySlot; MAX_STRATEGIES],

    pub bump: u8,
}

impl StrategyRouter {
    pub fn slot(&self, id: u8) -> Result<&StrategySlot> {
        let slot = self
            .slots
            .get(id as usize)
            .ok_or(VaultError::InvalidStrategyId)?;
        require!(slot.registered, VaultError::StrategyNotFound);
        Ok(slot)
    }

    fn slot_mut(&mut self, id: u8) -> Result<&mut StrategySlot> {
        let slot = self
            .slots
            .get_mut(id as usize)
            .ok_or(VaultError::InvalidStrategyId)?;
        require!(slot.registered, VaultError::StrategyNotFound);
        Ok(slot)
    }

    /// Registered slots in ascending id order
    pub fn registered(&self) -> impl Iterator<Item = (u8, &StrategySlot)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.registered)
            .map(|(id, slot)| (id as u8, slot))
    }

    pub fn registered_count(&self) -> usize {
        self.registered().count()
    }

    /// Position of `id` within the registered-order strategy list
    pub fn index_of(&self, id: u8) -> Result<usize> {
        self.slot(id)?;
        Ok(self.registered().take_while(|(other, _)| *other < id).count())
    }

    pub fn register_strategy(&mut self, id: u8, address: Pubkey, cap: u64) -> Result<()> {
        require!(address != Pubkey::default(), VaultError::ZeroAddress);
        let slot = self
            .slots
            .get(id as usize)
            .ok_or(VaultError::InvalidStrategyId)?;
        require!(!slot.registered, VaultError::StrategyAlreadyRegistered);
        require!(
            !self.registered().any(|(_, s)| s.address == address),
            VaultError::StrategyAddressInUse
        );

        self.slots[id as usize] = StrategySlot {
            registered: true,
            address,
            active: true,
            cap,
            ..Default::default()
        };
        Ok(())
    }

    pub fn set_strategy_active(&mut self, id: u8, active: bool) -> Result<()> {
        self.slot_mut(id)?.active = active;
        Ok(())
    }

    pub fn set_strategy_cap(&mut self, id: u8, cap: u64) -> Result<()> {
        let slot = self.slot_mut(id)?;
        require!(cap >= slot.allocated, VaultError::CapBelowAllocated);
        slot.cap = cap;
        Ok(())
    }

    /// Sum of strategy assets over slots that are active and not paused.
    /// `strategies` must line up with `registered()`.
    pub fn total_assets<S: YieldStrategy>(&self, strategies: &[S], now: i64) -> Result<u64> {
        self.sum_assets(strategies, now, |_, assets| Ok(assets))
    }

    /// Like `total_assets`, without the share owed to direct suppliers
    pub fn vault_assets<S: YieldStrategy>(&self, strategies: &[S], now: i64) -> Result<u64> {
        self.sum_assets(strategies, now, |slot, assets| slot.vault_value(assets))
    }

    fn sum_assets<S: YieldStrategy>(
        &self,
        strategies: &[S],
        now: i64,
        portion: impl Fn(&StrategySlot, u64) -> Result<u64>,
    ) -> Result<u64> {
        require!(
            strategies.len() == self.registered_count(),
            VaultError::StrategyAccountsMismatch
        );
        let mut total: u64 = 0;
        for ((_, slot), strategy) in self.registered().zip(strategies) {
            if !slot.active || strategy.is_paused() {
                continue;
            }
            total = total
                .checked_add(portion(slot, strategy.total_assets(now)?)?)
                .ok_or(VaultError::MathOverflow)?;
        }
        Ok(total)
    }

    /// Vault assets in strategy `id` not backing any holder allocation
    pub fn vault_withdrawable<S: YieldStrategy>(
        &self,
        id: u8,
        strategy: &S,
        now: i64,
    ) -> Result<u64> {
        let slot = self.slot(id)?;
        if !slot.active || strategy.is_paused() {
            return Ok(0);
        }
        Ok(slot
            .vault_value(strategy.total_assets(now)?)?
            .saturating_sub(slot.user_allocated()))
    }

    /// Current value of a direct supplier's claim on strategy `id`
    pub fn direct_withdrawable<S: YieldStrategy>(
        &self,
        id: u8,
        strategy: &S,
        position: &DirectPosition,
        now: i64,
    ) -> Result<u64> {
        let slot = self.slot(id)?;
        slot.units_value(position.strategy_units(id), strategy.total_assets(now)?)
    }

    fn require_routable<S: YieldStrategy>(&self, id: u8, strategy: &S) -> Result<()> {
        let slot = self.slot(id)?;
        require!(slot.active, VaultError::StrategyInactive);
        require!(!strategy.is_paused(), VaultError::StrategyPaused);
        Ok(())
    }

    /// Route `amount` into strategy `id` on behalf of `beneficiary`
    ///
    /// Mints slot claim units at the strategy's current value, so earlier
    /// claims keep the yield they already earned.
    pub fn deposit_to_strategy<S: YieldStrategy>(
        &mut self,
        strategy: &mut S,
        id: u8,
        amount: u64,
        beneficiary: Beneficiary<'_>,
        now: i64,
    ) -> Result<u64> {
        // CHECKS
        self.require_routable(id, strategy)?;
        require!(amount > 0, VaultError::InvalidAmount);

        let mut slot = *self.slot(id)?;
        slot.allocated = slot
            .allocated
            .checked_add(amount)
            .ok_or(VaultError::MathOverflow)?;
        require!(slot.allocated <= slot.cap, VaultError::StrategyCapExceeded);
        let minted = slot.units_for_deposit(amount, strategy.total_assets(now)?)?;
        slot.units = slot
            .units
            .checked_add(minted)
            .ok_or(VaultError::MathOverflow)?;

        // EFFECTS: the strategy checks its own cap and pause flag first,
        // then the beneficiary record; both leave state untouched on failure
        let mut staged = strategy.clone();
        let new_principal = staged.deposit(amount, now)?;
        match beneficiary {
            Beneficiary::Vault => {
                slot.vault_allocated = slot
                    .vault_allocated
                    .checked_add(amount)
                    .ok_or(VaultError::MathOverflow)?;
            }
            Beneficiary::Holder(allocation) => allocation.record(id, amount)?,
            Beneficiary::Direct(position) => {
                require!(minted > 0, VaultError::InvalidAmount);
                slot.direct_allocated = slot
                    .direct_allocated
                    .checked_add(amount)
                    .ok_or(VaultError::MathOverflow)?;
                slot.direct_units = slot
                    .direct_units
                    .checked_add(minted)
                    .ok_or(VaultError::MathOverflow)?;
                position.record(id, minted, amount)?;
            }
        }
        *strategy = staged;
        *self.slot_mut(id)? = slot;
        Ok(new_principal)
    }

    /// Pull `amount` out of strategy `id` on behalf of `beneficiary`
    ///
    /// Fails if the strategy returns less than `amount` by more than
    /// `max_slippage_bps`. Burns the matching claim units from the
    /// beneficiary's side of the slot and releases recorded principal,
    /// capped at what was recorded.
    pub fn withdraw_from_strategy<S: YieldStrategy>(
        &mut self,
        strategy: &mut S,
        id: u8,
        amount: u64,
        max_slippage_bps: u16,
        beneficiary: Beneficiary<'_>,
        now: i64,
    ) -> Result<StrategyWithdrawal> {
        // CHECKS
        self.require_routable(id, strategy)?;
        require!(amount > 0, VaultError::InvalidAmount);
        require_bps(max_slippage_bps)?;
        let assets = strategy.total_assets(now)?;
        require!(amount <= assets, VaultError::InsufficientBalance);

        let mut slot = *self.slot(id)?;
        let burned = slot.units_for_withdrawal(amount, assets)?;
        match &beneficiary {
            Beneficiary::Direct(position) => require!(
                burned <= position.strategy_units(id) && burned <= slot.direct_units,
                VaultError::AllocationExceeded
            ),
            _ => require!(burned <= slot.vault_units(), VaultError::InsufficientBalance),
        }

        let mut staged = strategy.clone();
        let withdrawal = staged.withdraw(amount, now)?;
        require!(
            !exceeds_slippage(amount, withdrawal.received, max_slippage_bps),
            VaultError::SlippageExceeded
        );

        // EFFECTS
        slot.units -= burned;
        let released = match beneficiary {
            Beneficiary::Vault => {
                let released = withdrawal.principal_reduction.min(slot.vault_allocated);
                slot.vault_allocated -= released;
                released
            }
            Beneficiary::Holder(allocation) => {
                allocation.release(id, withdrawal.principal_reduction)
            }
            Beneficiary::Direct(position) => {
                let released = position.release(id, burned)?.min(slot.direct_allocated);
                slot.direct_units -= burned;
                slot.direct_allocated -= released;
                released
            }
        };
        slot.allocated = slot.allocated.saturating_sub(released);

        *strategy = staged;
        *self.slot_mut(id)? = slot;
        Ok(withdrawal)
    }
}
