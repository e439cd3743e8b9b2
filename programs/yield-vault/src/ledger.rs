//! Accounting core shared by the instruction handlers and the tests
//!
//! Every operation validates first and stages strategy and router changes on
//! clones, committing only once every step has succeeded. The Solana runtime
//! already reverts a failed transaction; staging keeps the same guarantee
//! when the ledger is driven directly.

use anchor_lang::prelude::*;

use crate::{
    constants::{REDEEM_MAX_SLIPPAGE_BPS, SCALE},
    errors::VaultError,
    math::{bps_of, mul_div_down, to_u64},
    state::{
        Beneficiary, ShareAccount, ShareAllowance, StrategyRouter, StrategyWithdrawal,
        UserAllocation, VaultState, YieldStrategy,
    },
};

/// Result of a deposit or mint
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DepositOutcome {
    pub assets: u64,
    pub shares: u64,
    pub buffer: u64,
    pub target_buffer: u64,
    pub total_assets: u64,
}

/// Capital pulled out of a strategy to top up the buffer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StrategyPull {
    /// Position in the registered-order strategy list
    pub index: usize,
    pub strategy_id: u8,
    pub amount: u64,
}

/// Result of a withdraw or redeem
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WithdrawOutcome {
    pub assets: u64,
    pub shares: u64,
    pub pulls: Vec<StrategyPull>,
    pub buffer: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeeOutcome {
    pub price_per_share: u128,
    pub fee_assets: u64,
    pub fee_shares: u64,
    pub high_water_mark: u128,
}

/// Vault, router and the registered strategies (in id order) at one instant
pub struct VaultLedger<'a, S: YieldStrategy> {
    pub vault: &'a mut VaultState,
    pub router: &'a mut StrategyRouter,
    pub strategies: &'a mut [S],
    pub now: i64,
}

impl<'a, S: YieldStrategy> VaultLedger<'a, S> {
    pub fn new(
        vault: &'a mut VaultState,
        router: &'a mut StrategyRouter,
        strategies: &'a mut [S],
        now: i64,
    ) -> Self {
        Self {
            vault,
            router,
            strategies,
            now,
        }
    }

    /// Router assets owned by the vault. Capital supplied directly through
    /// the router, and its yield, is excluded.
    pub fn router_assets(&self) -> Result<u64> {
        self.router.vault_assets(&*self.strategies, self.now)
    }

    /// `buffer + router_assets()`
    pub fn total_assets(&self) -> Result<u64> {
        self.vault.total_assets(self.router_assets()?)
    }

    pub fn price_per_share(&self) -> Result<u128> {
        self.vault.price_per_share(self.total_assets()?)
    }

    pub fn convert_to_shares(&self, assets: u64) -> Result<u64> {
        self.vault.convert_to_shares(assets, self.total_assets()?)
    }

    pub fn convert_to_assets(&self, shares: u64) -> Result<u64> {
        self.vault.convert_to_assets(shares, self.total_assets()?)
    }

    pub fn preview_deposit(&self, assets: u64) -> Result<u64> {
        self.convert_to_shares(assets)
    }

    pub fn preview_mint(&self, shares: u64) -> Result<u64> {
        self.vault.convert_to_assets_up(shares, self.total_assets()?)
    }

    pub fn preview_withdraw(&self, assets: u64) -> Result<u64> {
        self.vault.convert_to_shares_up(assets, self.total_assets()?)
    }

    pub fn preview_redeem(&self, shares: u64) -> Result<u64> {
        self.convert_to_assets(shares)
    }

    pub fn max_deposit(&self) -> Result<u64> {
        Ok(self.vault.max_deposit(self.total_assets()?))
    }

    pub fn max_mint(&self) -> Result<u64> {
        self.vault.max_mint(self.total_assets()?)
    }

    pub fn unallocated(&self, holder: &ShareAccount, allocation: &UserAllocation) -> Result<u64> {
        self.vault
            .unallocated(holder.shares, allocation.total, self.total_assets()?)
    }

    pub fn max_withdraw(&self, holder: &ShareAccount, allocation: &UserAllocation) -> Result<u64> {
        self.vault
            .max_withdraw(holder.shares, allocation.total, self.total_assets()?)
    }

    pub fn max_redeem(&self, holder: &ShareAccount, allocation: &UserAllocation) -> Result<u64> {
        self.vault
            .max_redeem(holder.shares, allocation.total, self.total_assets()?)
    }

    fn strategy_index(&self, id: u8) -> Result<usize> {
        require!(
            self.strategies.len() == self.router.registered_count(),
            VaultError::StrategyAccountsMismatch
        );
        self.router.index_of(id)
    }

    /// Deposit `assets` and mint the matching shares to `receiver`
    pub fn deposit(&mut self, assets: u64, receiver: &mut ShareAccount) -> Result<DepositOutcome> {
        self.vault.require_operational()?;
        require!(assets > 0, VaultError::InvalidAmount);

        let total_assets = self.total_assets()?;
        require!(
            assets <= self.vault.max_deposit(total_assets),
            VaultError::CapExceeded
        );
        let shares = self.vault.convert_to_shares(assets, total_assets)?;
        self.issue(assets, shares, receiver, total_assets)
    }

    /// Mint exactly `shares` to `receiver`, charging the rounded-up asset cost
    pub fn mint(&mut self, shares: u64, receiver: &mut ShareAccount) -> Result<DepositOutcome> {
        self.vault.require_operational()?;
        require!(shares > 0, VaultError::InvalidAmount);

        let total_assets = self.total_assets()?;
        let assets = self.vault.convert_to_assets_up(shares, total_assets)?;
        require!(assets > 0, VaultError::InvalidAmount);
        require!(
            assets <= self.vault.max_deposit(total_assets),
            VaultError::CapExceeded
        );
        self.issue(assets, shares, receiver, total_assets)
    }

    fn issue(
        &mut self,
        assets: u64,
        shares: u64,
        receiver: &mut ShareAccount,
        total_assets: u64,
    ) -> Result<DepositOutcome> {
        require!(
            receiver.holder != Pubkey::default(),
            VaultError::ZeroAddress
        );
        require!(shares > 0, VaultError::InvalidAmount);

        let buffer = self
            .vault
            .buffer
            .checked_add(assets)
            .ok_or(VaultError::MathOverflow)?;
        let total_shares = self
            .vault
            .total_shares
            .checked_add(shares)
            .ok_or(VaultError::MathOverflow)?;
        receiver.credit(shares)?;

        self.vault.buffer = buffer;
        self.vault.total_shares = total_shares;

        let total_assets = total_assets
            .checked_add(assets)
            .ok_or(VaultError::MathOverflow)?;
        Ok(DepositOutcome {
            assets,
            shares,
            buffer,
            target_buffer: self.vault.target_buffer(total_assets)?,
            total_assets,
        })
    }

    /// Withdraw exactly `assets` for `owner`, burning the rounded-up share cost
    ///
    /// The burn is `convert_to_shares` rounded up, not floored, and matches
    /// `preview_withdraw`.
    pub fn withdraw(
        &mut self,
        caller: &Pubkey,
        assets: u64,
        receiver: &Pubkey,
        owner: &mut ShareAccount,
        owner_allocation: &UserAllocation,
        allowance: Option<&mut ShareAllowance>,
    ) -> Result<WithdrawOutcome> {
        self.vault.require_operational()?;
        require!(assets > 0, VaultError::InvalidAmount);
        require!(*receiver != Pubkey::default(), VaultError::ZeroAddress);
        require_keys_eq!(owner_allocation.user, owner.holder, VaultError::InvalidOwner);

        let total_assets = self.total_assets()?;
        let max = self
            .vault
            .max_withdraw(owner.shares, owner_allocation.total, total_assets)?;
        require!(assets <= max, VaultError::CapExceeded);

        let shares = self.vault.convert_to_shares_up(assets, total_assets)?;
        self.settle_exit(caller, assets, shares, owner, allowance)
    }

    /// Redeem `shares` of `owner` for their floor-rounded asset value
    pub fn redeem(
        &mut self,
        caller: &Pubkey,
        shares: u64,
        receiver: &Pubkey,
        owner: &mut ShareAccount,
        owner_allocation: &UserAllocation,
        allowance: Option<&mut ShareAllowance>,
    ) -> Result<WithdrawOutcome> {
        self.vault.require_operational()?;
        require!(shares > 0, VaultError::InvalidAmount);
        require!(*receiver != Pubkey::default(), VaultError::ZeroAddress);
        require_keys_eq!(owner_allocation.user, owner.holder, VaultError::InvalidOwner);
        require!(shares <= owner.shares, VaultError::InsufficientShares);

        let total_assets = self.total_assets()?;
        let assets = self.vault.convert_to_assets(shares, total_assets)?;
        require!(assets > 0, VaultError::InvalidAmount);
        let unallocated =
            self.vault
                .unallocated(owner.shares, owner_allocation.total, total_assets)?;
        require!(assets <= unallocated, VaultError::InsufficientUnallocated);
        require!(assets <= self.vault.per_tx_cap, VaultError::CapExceeded);

        self.settle_exit(caller, assets, shares, owner, allowance)
    }

    /// Serve `assets` from the buffer, pulling any shortfall out of
    /// vault-level strategy positions in id order, then burn `shares`
    fn settle_exit(
        &mut self,
        caller: &Pubkey,
        assets: u64,
        shares: u64,
        owner: &mut ShareAccount,
        allowance: Option<&mut ShareAllowance>,
    ) -> Result<WithdrawOutcome> {
        // CHECKS
        require!(shares <= owner.shares, VaultError::InsufficientShares);
        let allowance = if *caller == owner.holder {
            None
        } else {
            let allowance = allowance.ok_or(VaultError::InsufficientAllowance)?;
            allowance.require_covers(&owner.holder, caller, shares)?;
            Some(allowance)
        };

        let mut pulls = Vec::new();
        let mut pulled: u64 = 0;
        let mut staged = None;
        let mut shortfall = assets.saturating_sub(self.vault.buffer);

        if shortfall > 0 {
            let mut router = self.router.clone();
            let mut strategies = self.strategies.to_vec();
            let ids: Vec<u8> = router.registered().map(|(id, _)| id).collect();
            for (index, id) in ids.into_iter().enumerate() {
                if shortfall == 0 {
                    break;
                }
                let available = router.vault_withdrawable(id, &strategies[index], self.now)?;
                let take = shortfall.min(available);
                if take == 0 {
                    continue;
                }
                let withdrawal = router.withdraw_from_strategy(
                    &mut strategies[index],
                    id,
                    take,
                    REDEEM_MAX_SLIPPAGE_BPS,
                    Beneficiary::Vault,
                    self.now,
                )?;
                shortfall = shortfall.saturating_sub(withdrawal.received);
                pulled = pulled
                    .checked_add(withdrawal.received)
                    .ok_or(VaultError::MathOverflow)?;
                pulls.push(StrategyPull {
                    index,
                    strategy_id: id,
                    amount: withdrawal.received,
                });
            }
            require!(shortfall == 0, VaultError::InsufficientLiquidity);
            staged = Some((router, strategies));
        }

        let buffer = self
            .vault
            .buffer
            .checked_add(pulled)
            .and_then(|b| b.checked_sub(assets))
            .ok_or(VaultError::InsufficientLiquidity)?;
        let total_shares = self
            .vault
            .total_shares
            .checked_sub(shares)
            .ok_or(VaultError::InsufficientShares)?;

        // EFFECTS
        if let Some(allowance) = allowance {
            allowance.spend(shares)?;
        }
        owner.debit(shares)?;
        if let Some((router, strategies)) = staged {
            *self.router = router;
            self.strategies.clone_from_slice(&strategies);
        }
        self.vault.buffer = buffer;
        self.vault.total_shares = total_shares;

        Ok(WithdrawOutcome {
            assets,
            shares,
            pulls,
            buffer,
        })
    }

    /// Owner-only: move buffer capital into strategy `id` as a vault-level
    /// position. Total assets and price-per-share are unchanged.
    pub fn allocate(&mut self, id: u8, amount: u64) -> Result<()> {
        self.vault.require_operational()?;
        require!(amount > 0, VaultError::InvalidAmount);
        require!(amount <= self.vault.buffer, VaultError::InsufficientLiquidity);
        let index = self.strategy_index(id)?;

        let mut router = self.router.clone();
        let mut strategy = self.strategies[index].clone();
        router.deposit_to_strategy(&mut strategy, id, amount, Beneficiary::Vault, self.now)?;

        *self.router = router;
        self.strategies[index] = strategy;
        self.vault.buffer -= amount;
        Ok(())
    }

    /// Owner-only: unwind a vault-level position back into the buffer
    pub fn deallocate(
        &mut self,
        id: u8,
        amount: u64,
        max_slippage_bps: u16,
    ) -> Result<StrategyWithdrawal> {
        self.vault.require_operational()?;
        require!(amount > 0, VaultError::InvalidAmount);
        let index = self.strategy_index(id)?;
        let available = self
            .router
            .vault_withdrawable(id, &self.strategies[index], self.now)?;
        require!(amount <= available, VaultError::AllocationExceeded);

        let mut router = self.router.clone();
        let mut strategy = self.strategies[index].clone();
        let withdrawal = router.withdraw_from_strategy(
            &mut strategy,
            id,
            amount,
            max_slippage_bps,
            Beneficiary::Vault,
            self.now,
        )?;
        let buffer = self
            .vault
            .buffer
            .checked_add(withdrawal.received)
            .ok_or(VaultError::MathOverflow)?;

        *self.router = router;
        self.strategies[index] = strategy;
        self.vault.buffer = buffer;
        Ok(withdrawal)
    }

    /// Commit part of the caller's unallocated share value to strategy `id`
    pub fn allocate_for_user(
        &mut self,
        id: u8,
        amount: u64,
        holder: &ShareAccount,
        allocation: &mut UserAllocation,
    ) -> Result<()> {
        self.vault.require_operational()?;
        require!(amount > 0, VaultError::InvalidAmount);
        require_keys_eq!(allocation.user, holder.holder, VaultError::InvalidOwner);
        require!(
            amount <= self.unallocated(holder, allocation)?,
            VaultError::InsufficientUnallocated
        );
        require!(amount <= self.vault.buffer, VaultError::InsufficientLiquidity);
        let index = self.strategy_index(id)?;

        let mut router = self.router.clone();
        let mut strategy = self.strategies[index].clone();
        let mut staged_allocation = allocation.clone();
        router.deposit_to_strategy(
            &mut strategy,
            id,
            amount,
            Beneficiary::Holder(&mut staged_allocation),
            self.now,
        )?;

        *self.router = router;
        self.strategies[index] = strategy;
        *allocation = staged_allocation;
        self.vault.buffer -= amount;
        Ok(())
    }

    /// Unwind up to the caller's recorded allocation in strategy `id` back
    /// into the buffer
    pub fn unallocate_for_user(
        &mut self,
        id: u8,
        amount: u64,
        max_slippage_bps: u16,
        allocation: &mut UserAllocation,
    ) -> Result<StrategyWithdrawal> {
        self.vault.require_operational()?;
        require!(amount > 0, VaultError::InvalidAmount);
        require!(
            amount <= allocation.strategy_allocation(id),
            VaultError::AllocationExceeded
        );
        let index = self.strategy_index(id)?;

        let mut router = self.router.clone();
        let mut strategy = self.strategies[index].clone();
        let mut staged_allocation = allocation.clone();
        let withdrawal = router.withdraw_from_strategy(
            &mut strategy,
            id,
            amount,
            max_slippage_bps,
            Beneficiary::Holder(&mut staged_allocation),
            self.now,
        )?;
        let buffer = self
            .vault
            .buffer
            .checked_add(withdrawal.received)
            .ok_or(VaultError::MathOverflow)?;

        *self.router = router;
        self.strategies[index] = strategy;
        *allocation = staged_allocation;
        self.vault.buffer = buffer;
        Ok(withdrawal)
    }

    /// Move shares between holders. The sender must keep enough share value
    /// to cover their active allocations.
    pub fn transfer_shares(
        &mut self,
        caller: &Pubkey,
        from: &mut ShareAccount,
        to: &mut ShareAccount,
        from_allocation: &UserAllocation,
        allowance: Option<&mut ShareAllowance>,
        shares: u64,
    ) -> Result<()> {
        require!(shares > 0, VaultError::InvalidAmount);
        require!(to.holder != Pubkey::default(), VaultError::ZeroAddress);
        require!(from.holder != to.holder, VaultError::SelfTransfer);
        require_keys_eq!(from_allocation.user, from.holder, VaultError::InvalidOwner);
        require!(shares <= from.shares, VaultError::InsufficientShares);

        let remaining = from.shares - shares;
        let remaining_value = self.convert_to_assets(remaining)?;
        require!(
            remaining_value >= from_allocation.total,
            VaultError::AllocationTransferRestriction
        );
        let to_shares = to
            .shares
            .checked_add(shares)
            .ok_or(VaultError::MathOverflow)?;

        let allowance = if *caller == from.holder {
            None
        } else {
            let allowance = allowance.ok_or(VaultError::InsufficientAllowance)?;
            allowance.require_covers(&from.holder, caller, shares)?;
            Some(allowance)
        };

        if let Some(allowance) = allowance {
            allowance.spend(shares)?;
        }
        from.shares = remaining;
        to.shares = to_shares;
        Ok(())
    }

    /// Take the performance fee on gains above the high-water mark
    ///
    /// Time-gated by `epoch_duration`; runs even while the vault is paused.
    pub fn crystallize_fees(&mut self, recipient: &mut ShareAccount) -> Result<FeeOutcome> {
        let epoch_end = self
            .vault
            .last_epoch_ts
            .checked_add(self.vault.epoch_duration)
            .ok_or(VaultError::MathOverflow)?;
        require!(self.now >= epoch_end, VaultError::EpochNotComplete);
        require_keys_eq!(
            recipient.holder,
            self.vault.fee_recipient,
            VaultError::InvalidOwner
        );

        let total_assets = self.total_assets()?;
        let supply = self.vault.total_shares;
        let price_per_share = self.vault.price_per_share(total_assets)?;
        let high_water_mark = self.vault.high_water_mark;

        let mut fee_assets = 0;
        let mut fee_shares = 0;
        if price_per_share > high_water_mark && supply > 0 {
            let gain = to_u64(mul_div_down(
                price_per_share - high_water_mark,
                supply as u128,
                SCALE,
            )?)?;
            fee_assets = bps_of(gain, self.vault.performance_fee_bps)?;
            if fee_assets > 0 && fee_assets < total_assets {
                // dilute holders so the new shares are worth `fee_assets`
                fee_shares = to_u64(mul_div_down(
                    fee_assets as u128,
                    supply as u128,
                    (total_assets - fee_assets) as u128,
                )?)?;
            }
        }

        let total_shares = supply
            .checked_add(fee_shares)
            .ok_or(VaultError::MathOverflow)?;
        recipient.credit(fee_shares)?;
        self.vault.total_shares = total_shares;
        self.vault.high_water_mark = high_water_mark.max(price_per_share);
        self.vault.last_epoch_ts = self.now;

        Ok(FeeOutcome {
            price_per_share,
            fee_assets,
            fee_shares,
            high_water_mark: self.vault.high_water_mark,
        })
    }
}
